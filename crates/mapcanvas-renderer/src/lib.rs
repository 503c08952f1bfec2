//! # mapcanvas renderer
//!
//! Draws map layers and widget overlays onto an immediate-mode 2D
//! [`Canvas`], and exports off-screen renders as PNG.
//!
//! The [`raster`] module provides a CPU back end built on tiny-skia; other
//! platforms plug in by implementing [`Canvas`] and [`Backend`].

pub mod canvas;
pub mod config;
pub mod context;
pub mod error;
pub mod raster;
pub mod renderer;
pub mod widgets;

#[cfg(test)]
mod testing;

pub use canvas::{Backend, Canvas, OffscreenSurface, TextPaint};
pub use config::{RendererConfig, TileCounterConfig};
pub use context::RenderContext;
pub use error::RenderError;
pub use raster::{RasterBackend, RasterSurface};
pub use renderer::{round_to_pixel, world_to_screen, MapRenderer};
