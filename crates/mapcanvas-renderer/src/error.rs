use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to decode raster: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Bitmap {width}x{height} does not match its pixel buffer")]
    InvalidBitmap { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Cannot allocate a {width}x{height} drawing surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("Font error: {0}")]
    Font(String),

    #[error("Failed to start render context thread: {0}")]
    ContextSpawn(#[source] io::Error),

    #[error("Render context thread panicked")]
    ContextPanicked,

    #[error("Invalid renderer configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
