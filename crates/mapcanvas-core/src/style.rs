use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique style identifier, used as the key of the rendered-geometry cache.
pub type StyleId = Uuid;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(128, 128, 128)
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply the alpha channel by a layer opacity in `0.0..=1.0`.
    pub fn with_opacity(&self, opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * opacity).round() as u8,
            ..*self
        }
    }
}

/// Rendering parameters attached to a layer or a feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    #[serde(default = "Uuid::new_v4")]
    pub id: StyleId,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Lowest resolution (world units per pixel) at which the style applies.
    #[serde(default)]
    pub min_visible: f64,
    /// Highest resolution at which the style applies.
    #[serde(default = "unbounded")]
    pub max_visible: f64,
    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default)]
    pub outline: Option<Color>,
}

fn full_opacity() -> f32 {
    1.0
}

fn enabled() -> bool {
    true
}

fn unbounded() -> f64 {
    f64::MAX
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Style {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            opacity: 1.0,
            enabled: true,
            min_visible: 0.0,
            max_visible: f64::MAX,
            fill: None,
            outline: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_visible_range(mut self, min: f64, max: f64) -> Self {
        self.min_visible = min;
        self.max_visible = max;
        self
    }

    /// Whether this style should be drawn at the given viewport resolution.
    pub fn applies_at(&self, resolution: f64) -> bool {
        self.enabled && self.min_visible <= resolution && resolution <= self.max_visible
    }
}
