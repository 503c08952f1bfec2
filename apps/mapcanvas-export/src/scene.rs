use std::path::{Path, PathBuf};

use mapcanvas_core::{
    BBox, Feature, Hyperlink, Layer, MemoryLayer, Style, TileIndex, TileLayer, Viewport,
};
use mapcanvas_renderer::{RenderError, RendererConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scene: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Cannot write widget report: {0}")]
    Report(#[source] serde_json::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// An image file placed at a world-space box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterSource {
    pub path: PathBuf,
    pub bbox: BBox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSource {
    pub index: TileIndex,
    pub path: PathBuf,
    pub bbox: BBox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSource {
    Raster {
        name: String,
        #[serde(default)]
        style: Option<Style>,
        #[serde(default)]
        images: Vec<RasterSource>,
    },
    Tiles {
        name: String,
        #[serde(default)]
        tiles: Vec<TileSource>,
    },
}

fn full_opacity() -> f32 {
    1.0
}

/// A scene file: what to draw and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub viewport: Viewport,
    #[serde(default)]
    pub renderer: RendererConfig,
    /// Font used for labels and the tile counter.
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub layers: Vec<LayerSource>,
    #[serde(default)]
    pub widgets: Vec<Hyperlink>,
    #[serde(default = "full_opacity")]
    pub widget_opacity: f32,
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(json)?;
        scene.renderer.validate()?;
        validate_viewport(&scene.viewport)?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let json = read_to_string(path)?;
        log::info!("Loaded scene {}", path.display());
        Self::from_json(&json)
    }

    /// Read every referenced image and build the layer stack. Relative paths
    /// resolve against `base_dir`.
    pub fn build_layers(&self, base_dir: &Path) -> Result<Vec<Box<dyn Layer>>, SceneError> {
        let mut layers: Vec<Box<dyn Layer>> = Vec::with_capacity(self.layers.len());
        for source in &self.layers {
            match source {
                LayerSource::Raster {
                    name,
                    style,
                    images,
                } => {
                    let mut layer = MemoryLayer::new(name);
                    if let Some(style) = style {
                        layer = layer.with_style(style.clone());
                    }
                    for image in images {
                        let data = read_bytes(&base_dir.join(&image.path))?;
                        layer.add_feature(Feature::raster(data, image.bbox));
                    }
                    log::info!("Layer '{}': {} rasters", name, layer.feature_count());
                    layers.push(Box::new(layer));
                }
                LayerSource::Tiles { name, tiles } => {
                    let mut layer = TileLayer::new(name);
                    for tile in tiles {
                        let data = read_bytes(&base_dir.join(&tile.path))?;
                        layer.memory_cache.add(tile.index, Feature::raster(data, tile.bbox));
                    }
                    log::info!("Layer '{}': {} tiles", name, layer.memory_cache.tile_count());
                    layers.push(Box::new(layer));
                }
            }
        }
        Ok(layers)
    }
}

#[derive(Serialize)]
struct WidgetEnvelope<'a> {
    text: &'a str,
    url: Option<&'a str>,
    envelope: Option<[f64; 4]>,
}

/// JSON list of where each widget landed on screen, for hit testing.
pub fn widget_report(widgets: &[Hyperlink]) -> Result<String, SceneError> {
    let envelopes: Vec<WidgetEnvelope> = widgets
        .iter()
        .map(|w| WidgetEnvelope {
            text: &w.text,
            url: w.url.as_deref(),
            envelope: w.envelope.map(|e| [e.min.x, e.min.y, e.max.x, e.max.y]),
        })
        .collect();
    serde_json::to_string_pretty(&envelopes).map_err(SceneError::Report)
}

fn validate_viewport(viewport: &Viewport) -> Result<(), SceneError> {
    if !(viewport.resolution.is_finite() && viewport.resolution > 0.0) {
        return Err(SceneError::InvalidViewport(format!(
            "resolution must be positive, got {}",
            viewport.resolution
        )));
    }
    for (axis, size) in [("width", viewport.width), ("height", viewport.height)] {
        if !(size.is_finite() && size >= 1.0) {
            return Err(SceneError::InvalidViewport(format!(
                "{} must be at least one pixel, got {}",
                axis, size
            )));
        }
    }
    if !(viewport.center.x.is_finite() && viewport.center.y.is_finite() && viewport.rotation.is_finite()) {
        return Err(SceneError::InvalidViewport("center and rotation must be finite".into()));
    }
    Ok(())
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, SceneError> {
    std::fs::read(path).map_err(|source| SceneError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String, SceneError> {
    std::fs::read_to_string(path).map_err(|source| SceneError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcanvas_core::{HorizontalAlignment, VerticalAlignment};

    const SCENE: &str = r#"{
        "viewport": { "center": { "x": 0.0, "y": 0.0 }, "resolution": 2.0, "width": 256, "height": 128 },
        "renderer": { "output_multiplier": 1.0, "tile_counter": null },
        "layers": [
            { "kind": "tiles", "name": "base" },
            { "kind": "raster", "name": "overlay", "style": { "opacity": 0.5 } }
        ],
        "widgets": [
            { "text": "© contributors", "url": "https://example.org", "horizontal_alignment": "Left", "vertical_alignment": "Bottom" }
        ]
    }"#;

    #[test]
    fn test_parse_scene() {
        let scene = Scene::from_json(SCENE).unwrap();
        assert_eq!(scene.viewport.width, 256.0);
        assert_eq!(scene.viewport.rotation, 0.0);
        assert!(scene.renderer.tile_counter.is_none());
        assert_eq!(scene.layers.len(), 2);
        assert_eq!(scene.widgets[0].horizontal_alignment, HorizontalAlignment::Left);
        assert_eq!(scene.widgets[0].vertical_alignment, VerticalAlignment::Bottom);
        assert_eq!(scene.widget_opacity, 1.0);
    }

    #[test]
    fn test_build_empty_layers() {
        let scene = Scene::from_json(SCENE).unwrap();
        let layers = scene.build_layers(Path::new(".")).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].tile_count(), Some(0));
        assert_eq!(layers[1].name(), "overlay");
        assert!((layers[1].style().unwrap().opacity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_alignment_is_fatal() {
        let json = SCENE.replace("\"Left\"", "\"Sideways\"");
        let err = Scene::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("Unknown HorizontalAlignment type 'Sideways'"));
    }

    #[test]
    fn test_rejects_degenerate_viewport() {
        for bad in [r#""resolution": 0.0"#, r#""resolution": -2.0"#] {
            let json = SCENE.replace(r#""resolution": 2.0"#, bad);
            let err = Scene::from_json(&json).unwrap_err();
            assert!(matches!(err, SceneError::InvalidViewport(_)), "{}", err);
            assert!(err.to_string().contains("resolution"));
        }

        let json = SCENE.replace(r#""width": 256"#, r#""width": -256"#);
        let err = Scene::from_json(&json).unwrap_err();
        assert!(matches!(err, SceneError::InvalidViewport(_)));
        assert!(err.to_string().contains("width"));

        let json = SCENE.replace(r#""height": 128"#, r#""height": 0"#);
        assert!(matches!(Scene::from_json(&json), Err(SceneError::InvalidViewport(_))));
    }

    #[test]
    fn test_widget_report() {
        let mut drawn = Hyperlink::new("© contributors").with_url("https://example.org");
        drawn.envelope = Some(BBox::from_coords(10.0, 20.0, 90.0, 36.0));
        let hidden = Hyperlink::new("");

        let report: serde_json::Value = serde_json::from_str(&widget_report(&[drawn, hidden]).unwrap()).unwrap();

        assert_eq!(report[0]["url"], "https://example.org");
        assert_eq!(report[0]["envelope"], serde_json::json!([10.0, 20.0, 90.0, 36.0]));
        assert!(report[1]["envelope"].is_null());
    }

    #[test]
    fn test_report_error_is_not_a_parse_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SceneError::Report(source);
        assert!(err.to_string().starts_with("Cannot write widget report"));
        assert!(!err.to_string().contains("Invalid scene"));
    }

    #[test]
    fn test_missing_image_reports_path() {
        let json = SCENE.replace(
            r#""style": { "opacity": 0.5 } }"#,
            r#""images": [ { "path": "missing.png", "bbox": { "min": { "x": 0, "y": 0 }, "max": { "x": 1, "y": 1 } } } ] }"#,
        );
        let scene = Scene::from_json(&json).unwrap();
        let err = scene.build_layers(Path::new("/nonexistent-dir")).err().unwrap();
        assert!(matches!(err, SceneError::Read { .. }));
        assert!(err.to_string().contains("missing.png"));
    }
}
