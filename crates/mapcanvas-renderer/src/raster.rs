//! CPU back end: tiny-skia pixmaps, `image` decoding, fontdue text.

use std::sync::Arc;

use fontdue::layout::{CoordinateSystem, GlyphPosition, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use mapcanvas_core::{BBox, Bitmap, Color};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, PixmapRef, Rect,
    Transform,
};

use crate::canvas::{Backend, Canvas, OffscreenSurface, TextPaint};
use crate::error::RenderError;

/// Decode PNG/JPEG bytes into a premultiplied RGBA bitmap.
pub fn decode_bitmap(data: &[u8]) -> Result<Bitmap, RenderError> {
    let image = image::load_from_memory(data)?.to_rgba8();
    let (width, height) = image.dimensions();
    let mut pixels = image.into_raw();
    for px in pixels.chunks_exact_mut(4) {
        let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        px.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(Bitmap::new(width, height, pixels))
}

/// Creates [`RasterSurface`]s sharing one optional font.
#[derive(Clone, Default)]
pub struct RasterBackend {
    font: Option<Arc<Font>>,
}

impl RasterBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the TrueType/OpenType font in `bytes` for all text.
    pub fn with_font_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self {
            font: Some(Arc::new(font)),
        })
    }
}

impl Backend for RasterBackend {
    type Surface = RasterSurface;

    fn create_surface(&self, width: u32, height: u32) -> Result<RasterSurface, RenderError> {
        let mut surface = RasterSurface::new(width, height)?;
        surface.font = self.font.clone();
        Ok(surface)
    }
}

/// A canvas drawing into an owned pixmap.
pub struct RasterSurface {
    pixmap: Pixmap,
    font: Option<Arc<Font>>,
    layout: Layout,
    warned_no_font: bool,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            font: None,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            warned_no_font: false,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn font(&mut self) -> Option<Arc<Font>> {
        if self.font.is_none() && !self.warned_no_font {
            log::warn!("No font configured, text will not be drawn");
            self.warned_no_font = true;
        }
        self.font.clone()
    }
}

/// Lay `text` out on one line and return its glyphs with positions relative
/// to the baseline origin (Y down), plus the pen advance of the whole line.
fn layout_line(layout: &mut Layout, font: &Font, text: &str, size: f32) -> (Vec<GlyphPosition>, f32) {
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, size, 0));

    let baseline = layout
        .lines()
        .and_then(|lines| lines.first())
        .map_or(0.0, |line| line.baseline_y);
    let glyphs: Vec<GlyphPosition> = layout
        .glyphs()
        .iter()
        .map(|g| GlyphPosition { y: g.y - baseline, ..*g })
        .collect();
    let advance = glyphs
        .last()
        .map_or(0.0, |g| g.x + font.metrics(g.parent, size).advance_width);
    (glyphs, advance)
}

fn round_rect_path(rect: Rect, rx: f32, ry: f32) -> Option<tiny_skia::Path> {
    let rx = rx.clamp(0.0, rect.width() / 2.0);
    let ry = ry.clamp(0.0, rect.height() / 2.0);
    if rx == 0.0 || ry == 0.0 {
        return Some(PathBuilder::from_rect(rect));
    }

    let (l, t, r, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let mut pb = PathBuilder::new();
    pb.move_to(l + rx, t);
    pb.line_to(r - rx, t);
    pb.quad_to(r, t, r, t + ry);
    pb.line_to(r, b - ry);
    pb.quad_to(r, b, r - rx, b);
    pb.line_to(l + rx, b);
    pb.quad_to(l, b, l, b - ry);
    pb.line_to(l, t + ry);
    pb.quad_to(l, t, l + rx, t);
    pb.close();
    pb.finish()
}

impl Canvas for RasterSurface {
    fn decode_bitmap(&mut self, data: &[u8]) -> Result<Bitmap, RenderError> {
        decode_bitmap(data)
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: &BBox, opacity: f32) -> Result<(), RenderError> {
        let invalid = RenderError::InvalidBitmap {
            width: bitmap.width,
            height: bitmap.height,
        };
        let src = PixmapRef::from_bytes(&bitmap.pixels, bitmap.width, bitmap.height).ok_or(invalid)?;
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }

        let sx = (dest.width() / bitmap.width as f64) as f32;
        let sy = (dest.height() / bitmap.height as f64) as f32;
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_row(sx, 0.0, 0.0, sy, dest.min.x as f32, dest.min.y as f32);
        self.pixmap.draw_pixmap(0, 0, src, &paint, transform, None);
        Ok(())
    }

    fn measure_text(&mut self, text: &str, paint: &TextPaint) -> BBox {
        let Some(font) = self.font() else {
            return BBox::from_coords(0.0, 0.0, 0.0, 0.0);
        };

        let (glyphs, advance) = layout_line(&mut self.layout, &font, text, paint.size);
        let inked: Vec<BBox> = glyphs
            .iter()
            .filter(|g| g.width > 0 && g.height > 0)
            .map(|g| {
                let (left, top) = (g.x as f64, g.y as f64);
                BBox::from_coords(left, top, left + g.width as f64, top + g.height as f64)
            })
            .collect();

        match inked.split_first() {
            Some((first, rest)) => rest.iter().fold(*first, |acc, bb| acc.union(bb)),
            // Whitespace only: no ink, keep the advance
            None => BBox::from_coords(0.0, 0.0, advance as f64, 0.0),
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, paint: &TextPaint) -> Result<(), RenderError> {
        let Some(font) = self.font() else {
            return Ok(());
        };

        let color = paint.color;
        let (glyphs, _) = layout_line(&mut self.layout, &font, text, paint.size);
        for g in glyphs {
            if g.width == 0 || g.height == 0 {
                continue;
            }
            let (metrics, coverage) = font.rasterize_config(g.key);

            let (w, h) = (metrics.width as u32, metrics.height as u32);
            let mut glyph = Pixmap::new(w, h).ok_or(RenderError::SurfaceAllocation { width: w, height: h })?;
            for (dst, &cov) in glyph.pixels_mut().iter_mut().zip(coverage.iter()) {
                let cov = if paint.anti_alias { cov } else if cov >= 128 { 255 } else { 0 };
                let a = ((color.a as u16 * cov as u16 + 127) / 255) as u8;
                *dst = ColorU8::from_rgba(color.r, color.g, color.b, a).premultiply();
            }

            let gx = (x + g.x as f64).round() as i32;
            let gy = (y + g.y as f64).round() as i32;
            self.pixmap
                .draw_pixmap(gx, gy, glyph.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
        }
        Ok(())
    }

    fn draw_round_rect(&mut self, rect: &BBox, rx: f32, ry: f32, color: Color) -> Result<(), RenderError> {
        let Some(bounds) = Rect::from_ltrb(rect.min.x as f32, rect.min.y as f32, rect.max.x as f32, rect.max.y as f32)
        else {
            log::trace!("Skipping degenerate rectangle {:?}", rect);
            return Ok(());
        };
        let Some(path) = round_rect_path(bounds, rx, ry) else {
            return Ok(());
        };

        let mut fill = Paint::default();
        fill.set_color_rgba8(color.r, color.g, color.b, color.a);
        fill.anti_alias = true;
        self.pixmap
            .fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
        Ok(())
    }
}

impl OffscreenSurface for RasterSurface {
    fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}
