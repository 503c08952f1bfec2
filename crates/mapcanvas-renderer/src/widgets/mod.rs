//! Screen-anchored UI overlays drawn after the map content.

pub mod hyperlink;

use mapcanvas_core::Hyperlink;

use crate::canvas::Canvas;
use crate::error::RenderError;

/// Draw every widget in order, later ones on top.
pub fn draw_widgets(
    canvas: &mut dyn Canvas,
    screen_width: f64,
    screen_height: f64,
    widgets: &mut [Hyperlink],
    layer_opacity: f32,
) -> Result<(), RenderError> {
    for widget in widgets.iter_mut() {
        hyperlink::draw(canvas, screen_width, screen_height, widget, layer_opacity)?;
    }
    Ok(())
}
