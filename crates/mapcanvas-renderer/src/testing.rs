//! Test doubles: a canvas that records draw calls instead of rasterizing.

use std::thread;

use mapcanvas_core::{BBox, Bitmap, Color};

use crate::canvas::{Backend, Canvas, OffscreenSurface, TextPaint};
use crate::error::RenderError;
use crate::raster;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Bitmap { size: (u32, u32), dest: BBox, opacity: f32 },
    Text { text: String, x: f64, y: f64, paint: TextPaint },
    RoundRect { rect: BBox, rx: f32, color: Color },
}

#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
    pub decodes: usize,
    pub measures: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for RecordingCanvas {
    fn decode_bitmap(&mut self, data: &[u8]) -> Result<Bitmap, RenderError> {
        self.decodes += 1;
        raster::decode_bitmap(data)
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: &BBox, opacity: f32) -> Result<(), RenderError> {
        self.commands.push(DrawCommand::Bitmap {
            size: (bitmap.width, bitmap.height),
            dest: *dest,
            opacity,
        });
        Ok(())
    }

    /// Every glyph is half the text size wide, with a left bearing of a
    /// tenth, rising three quarters above the baseline.
    fn measure_text(&mut self, text: &str, paint: &TextPaint) -> BBox {
        self.measures += 1;
        let size = paint.size as f64;
        let left = size * 0.1;
        let glyphs = text.chars().count() as f64;
        BBox::from_coords(left, -size * 0.75, left + glyphs * size * 0.5, size * 0.25)
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, paint: &TextPaint) -> Result<(), RenderError> {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            paint: *paint,
        });
        Ok(())
    }

    fn draw_round_rect(&mut self, rect: &BBox, rx: f32, _ry: f32, color: Color) -> Result<(), RenderError> {
        self.commands.push(DrawCommand::RoundRect {
            rect: *rect,
            rx,
            color,
        });
        Ok(())
    }
}

/// Surface whose "PNG" is a text summary of what was drawn and where.
pub struct RecordingSurface {
    canvas: RecordingCanvas,
    width: u32,
    height: u32,
    thread_name: String,
}

impl Canvas for RecordingSurface {
    fn decode_bitmap(&mut self, data: &[u8]) -> Result<Bitmap, RenderError> {
        self.canvas.decode_bitmap(data)
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: &BBox, opacity: f32) -> Result<(), RenderError> {
        self.canvas.draw_bitmap(bitmap, dest, opacity)
    }

    fn measure_text(&mut self, text: &str, paint: &TextPaint) -> BBox {
        self.canvas.measure_text(text, paint)
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, paint: &TextPaint) -> Result<(), RenderError> {
        self.canvas.draw_text(text, x, y, paint)
    }

    fn draw_round_rect(&mut self, rect: &BBox, rx: f32, ry: f32, color: Color) -> Result<(), RenderError> {
        self.canvas.draw_round_rect(rect, rx, ry, color)
    }
}

impl OffscreenSurface for RecordingSurface {
    fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let summary = format!(
            "{}x{} on {}: {} commands",
            self.width,
            self.height,
            self.thread_name,
            self.canvas.commands.len()
        );
        Ok(summary.into_bytes())
    }
}

pub struct RecordingBackend;

impl Backend for RecordingBackend {
    type Surface = RecordingSurface;

    fn create_surface(&self, width: u32, height: u32) -> Result<RecordingSurface, RenderError> {
        Ok(RecordingSurface {
            canvas: RecordingCanvas::new(),
            width,
            height,
            thread_name: thread::current().name().unwrap_or("unnamed").to_string(),
        })
    }
}

/// A valid PNG of the given size, filled with opaque red.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut pixmap = tiny_skia::Pixmap::new(width, height).unwrap();
    pixmap.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 255));
    pixmap.encode_png().unwrap()
}
