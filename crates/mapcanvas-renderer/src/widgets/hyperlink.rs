use mapcanvas_core::{BBox, HorizontalAlignment, Hyperlink, VerticalAlignment};

use crate::canvas::{Canvas, TextPaint};
use crate::error::RenderError;

/// Draw `hyperlink` anchored to a `screen_width` x `screen_height` screen.
///
/// Draws the rounded background first, then the label, and stores the
/// background rectangle in `hyperlink.envelope`. Empty text draws nothing
/// and leaves the envelope as it was.
pub fn draw(
    canvas: &mut dyn Canvas,
    screen_width: f64,
    screen_height: f64,
    hyperlink: &mut Hyperlink,
    layer_opacity: f32,
) -> Result<(), RenderError> {
    if hyperlink.text.is_empty() {
        return Ok(());
    }

    let text_paint = TextPaint::new(hyperlink.text_color.with_opacity(layer_opacity), hyperlink.text_size);
    let back_color = hyperlink.back_color.with_opacity(layer_opacity);

    // Measured bounds are relative to the baseline origin, so `min.y` is
    // negative and `min.x` may be non-zero.
    let text_rect = canvas.measure_text(&hyperlink.text, &text_paint);

    let padding_x = hyperlink.padding_x as f64;
    let padding_y = hyperlink.padding_y as f64;
    // Height uses the nominal text size so every label gets the same line height.
    let width = text_rect.width() + padding_x * 2.0;
    let height = hyperlink.text_size as f64 + padding_y * 2.0;

    let offset_x = offset_x(
        width,
        hyperlink.margin_x as f64,
        hyperlink.horizontal_alignment,
        hyperlink.position_x,
        screen_width,
    );
    let offset_y = offset_y(
        height,
        hyperlink.margin_y as f64,
        hyperlink.vertical_alignment,
        hyperlink.position_y,
        screen_height,
    );

    let back_rect = BBox::from_coords(0.0, 0.0, width, height).translate(offset_x, offset_y);
    canvas.draw_round_rect(&back_rect, hyperlink.corner_radius, hyperlink.corner_radius, back_color)?;
    hyperlink.envelope = Some(back_rect);

    canvas.draw_text(
        &hyperlink.text,
        offset_x - text_rect.min.x + padding_x,
        offset_y - text_rect.min.y + padding_y,
        &text_paint,
    )
}

/// Left edge of a box of `width` for the given alignment.
pub fn offset_x(
    width: f64,
    margin: f64,
    alignment: HorizontalAlignment,
    position: f64,
    screen_width: f64,
) -> f64 {
    match alignment {
        HorizontalAlignment::Left => margin,
        HorizontalAlignment::Right => screen_width - width - margin,
        HorizontalAlignment::Center => (screen_width - width) * 0.5,
        HorizontalAlignment::Position => position,
    }
}

/// Top edge of a box of `height` for the given alignment.
pub fn offset_y(
    height: f64,
    margin: f64,
    alignment: VerticalAlignment,
    position: f64,
    screen_height: f64,
) -> f64 {
    match alignment {
        VerticalAlignment::Top => margin,
        VerticalAlignment::Bottom => screen_height - height - margin,
        VerticalAlignment::Center => (screen_height - height) * 0.5,
        VerticalAlignment::Position => position,
    }
}
