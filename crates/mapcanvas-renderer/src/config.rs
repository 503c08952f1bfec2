use std::path::Path;

use mapcanvas_core::Color;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Placement of the per-tile-layer debug counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileCounterConfig {
    pub x: f64,
    pub y: f64,
    pub text_size: f32,
    pub color: Color,
}

impl Default for TileCounterConfig {
    fn default() -> Self {
        Self {
            x: 20.0,
            y: 20.0,
            text_size: 30.0,
            color: Color::BLACK,
        }
    }
}

/// Renderer settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Device pixels per screen pixel, for high-DPI output.
    pub output_multiplier: f32,
    /// Tile-count overlay; `None` disables it.
    pub tile_counter: Option<TileCounterConfig>,
    /// Name of the worker thread used for off-screen export.
    pub export_thread_name: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            output_multiplier: 1.0,
            tile_counter: Some(TileCounterConfig::default()),
            export_thread_name: "mapcanvas-export".to_string(),
        }
    }
}

impl RendererConfig {
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let json = std::fs::read_to_string(path)?;
        log::info!("Loading renderer config from {}", path.display());
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.output_multiplier.is_finite() || self.output_multiplier <= 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "output_multiplier must be positive, got {}",
                self.output_multiplier
            )));
        }
        if self.export_thread_name.contains('\0') {
            return Err(RenderError::InvalidConfig(
                "export_thread_name must not contain NUL".into(),
            ));
        }
        Ok(())
    }
}
