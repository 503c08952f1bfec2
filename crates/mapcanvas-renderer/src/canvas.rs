//! The immediate-mode drawing contract a platform back end implements.

use mapcanvas_core::{BBox, Bitmap, Color};

use crate::error::RenderError;

/// Paint parameters for text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPaint {
    pub color: Color,
    /// Nominal font size in pixels.
    pub size: f32,
    pub anti_alias: bool,
}

impl TextPaint {
    pub fn new(color: Color, size: f32) -> Self {
        Self {
            color,
            size,
            anti_alias: true,
        }
    }
}

/// A 2D drawing surface. All coordinates are screen pixels, Y down.
pub trait Canvas {
    /// Decode encoded image bytes into a bitmap this canvas can draw.
    fn decode_bitmap(&mut self, data: &[u8]) -> Result<Bitmap, RenderError>;

    /// Draw `bitmap` scaled to fill `dest`.
    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: &BBox, opacity: f32) -> Result<(), RenderError>;

    /// Tight bounds of `text` relative to its baseline origin. `min.y` is
    /// negative for glyphs rising above the baseline.
    fn measure_text(&mut self, text: &str, paint: &TextPaint) -> BBox;

    /// Draw `text` with its baseline origin at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f64, y: f64, paint: &TextPaint) -> Result<(), RenderError>;

    fn draw_round_rect(&mut self, rect: &BBox, rx: f32, ry: f32, color: Color) -> Result<(), RenderError>;
}

/// A canvas backed by its own pixel buffer that can be exported.
pub trait OffscreenSurface: Canvas {
    /// Encode the current contents as PNG (lossless).
    fn encode_png(&self) -> Result<Vec<u8>, RenderError>;
}

/// Factory for off-screen surfaces.
pub trait Backend: Sync {
    type Surface: OffscreenSurface;

    fn create_surface(&self, width: u32, height: u32) -> Result<Self::Surface, RenderError>;
}
