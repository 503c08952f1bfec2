use mapcanvas_core::{iterate_layers, BBox, Feature, Geometry, Hyperlink, Layer, Point, Style, Viewport};

use crate::canvas::{Backend, Canvas, OffscreenSurface, TextPaint};
use crate::config::RendererConfig;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::widgets;

/// Transform a world-space box to screen space.
///
/// Both corners are transformed independently and the result re-normalised
/// per axis, since the transform flips Y and rotation can swap corners.
pub fn world_to_screen(viewport: &Viewport, bbox: &BBox) -> BBox {
    let first = viewport.world_to_screen(&bbox.min);
    let second = viewport.world_to_screen(&bbox.max);
    BBox {
        min: Point::new(first.x.min(second.x), first.y.min(second.y)),
        max: Point::new(first.x.max(second.x), first.y.max(second.y)),
    }
}

/// Snap a screen rectangle to whole pixels.
///
/// Each edge rounds to the nearest integer, halves rounding up. Top and
/// bottom are re-ordered in case a flipping transform swapped them.
pub fn round_to_pixel(dest: &BBox) -> BBox {
    let top = dest.min.y.min(dest.max.y);
    let bottom = dest.min.y.max(dest.max.y);
    BBox {
        min: Point::new(round_half_up(dest.min.x), round_half_up(top)),
        max: Point::new(round_half_up(dest.max.x), round_half_up(bottom)),
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Draws map layers and widgets onto a [`Canvas`], and exports off-screen
/// renders through a [`Backend`].
pub struct MapRenderer<B: Backend> {
    config: RendererConfig,
    backend: B,
}

impl<B: Backend> MapRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, RendererConfig::default())
    }

    pub fn with_config(backend: B, config: RendererConfig) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Draw every visible feature of `layers`, then the tile-count overlay.
    ///
    /// The first failure aborts the pass.
    pub fn render(
        &self,
        canvas: &mut dyn Canvas,
        viewport: &Viewport,
        layers: &mut [Box<dyn Layer>],
    ) -> Result<(), RenderError> {
        let mut drawn = 0usize;
        iterate_layers(viewport, layers, |viewport, style, feature| {
            if self.render_feature(canvas, viewport, style, feature)? {
                drawn += 1;
            }
            Ok::<(), RenderError>(())
        })?;
        log::debug!("Rendered {} raster features", drawn);

        if let Some(counter) = &self.config.tile_counter {
            let paint = TextPaint::new(counter.color, counter.text_size);
            for layer in layers.iter() {
                if let Some(count) = layer.tile_count() {
                    canvas.draw_text(&count.to_string(), counter.x, counter.y, &paint)?;
                }
            }
        }

        Ok(())
    }

    /// Draw the map and then `widgets` on top, with widget colors scaled by
    /// `widget_opacity`.
    pub fn render_with_widgets(
        &self,
        canvas: &mut dyn Canvas,
        viewport: &Viewport,
        layers: &mut [Box<dyn Layer>],
        widgets: &mut [Hyperlink],
        widget_opacity: f32,
    ) -> Result<(), RenderError> {
        self.render(canvas, viewport, layers)?;
        widgets::draw_widgets(canvas, viewport.width, viewport.height, widgets, widget_opacity)
    }

    /// Render `layers` off-screen at the viewport's size and return PNG bytes.
    ///
    /// Runs on a dedicated render-context thread; the caller blocks until
    /// it finishes.
    pub fn render_to_bitmap_stream(
        &self,
        viewport: &Viewport,
        layers: &mut [Box<dyn Layer>],
    ) -> Result<Vec<u8>, RenderError> {
        self.render_to_bitmap_stream_with_widgets(viewport, layers, &mut [], 1.0)
    }

    pub fn render_to_bitmap_stream_with_widgets(
        &self,
        viewport: &Viewport,
        layers: &mut [Box<dyn Layer>],
        widgets: &mut [Hyperlink],
        widget_opacity: f32,
    ) -> Result<Vec<u8>, RenderError> {
        let width = viewport.width as u32;
        let height = viewport.height as u32;
        log::info!("Exporting {}x{} render", width, height);

        let png = RenderContext::run(&self.config.export_thread_name, |ctx| {
            let mut surface = ctx.create_surface(&self.backend, width, height)?;
            self.render_with_widgets(&mut surface, viewport, layers, widgets, widget_opacity)?;
            surface.encode_png()
        })?;

        log::info!("Export finished, {} bytes", png.len());
        Ok(png)
    }

    /// Draw one feature for one style. Returns whether anything was drawn.
    fn render_feature(
        &self,
        canvas: &mut dyn Canvas,
        viewport: &Viewport,
        style: &Style,
        feature: &mut Feature,
    ) -> Result<bool, RenderError> {
        let (data, bbox) = match &feature.geometry {
            Geometry::Raster { data, bbox } => (data, bbox),
            Geometry::Vector(_) => {
                log::trace!("Skipping vector feature {}", feature.id);
                return Ok(false);
            }
        };

        let id = feature.id;
        let bitmap = feature.rendered.get_or_try_insert_with(style.id, || {
            log::trace!("Decoding raster for feature {} style {}", id, style.id);
            canvas.decode_bitmap(data)
        })?;

        let dest = world_to_screen(viewport, bbox).scale(self.config.output_multiplier as f64);
        let destination = round_to_pixel(&dest);
        canvas.draw_bitmap(bitmap, &destination, style.opacity)?;
        Ok(true)
    }
}
