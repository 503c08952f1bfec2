use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::feature::Feature;
use crate::geometry::BBox;
use crate::spatial::{SpatialEntry, SpatialIndex};
use crate::style::Style;

/// A map layer as seen by the renderer.
///
/// Layers own their features, so handing out `&mut Feature` is how the
/// renderer reaches each feature's render cache.
pub trait Layer: Send {
    fn name(&self) -> &str;

    fn enabled(&self) -> bool;

    /// Resolution range (world units per pixel) in which the layer is drawn.
    fn visible_range(&self) -> (f64, f64) {
        (0.0, f64::MAX)
    }

    /// Layer-wide style, applied to every feature before the feature's own.
    fn style(&self) -> Option<&Style>;

    /// Features whose bounding box intersects `extent`, in draw order.
    fn features_in_view_mut(&mut self, extent: &BBox, resolution: f64) -> Vec<&mut Feature>;

    /// Number of tiles held in memory, for tile-backed layers only.
    fn tile_count(&self) -> Option<usize> {
        None
    }

    fn is_visible_at(&self, resolution: f64) -> bool {
        let (min, max) = self.visible_range();
        self.enabled() && min <= resolution && resolution <= max
    }
}

/// A layer backed by an in-memory feature list and an R-tree.
#[derive(Debug)]
pub struct MemoryLayer {
    pub name: String,
    pub enabled: bool,
    pub min_visible: f64,
    pub max_visible: f64,
    pub style: Option<Style>,
    features: Vec<Feature>,
    index: SpatialIndex,
}

impl MemoryLayer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            min_visible: 0.0,
            max_visible: f64::MAX,
            style: Some(Style::new()),
            features: Vec::new(),
            index: SpatialIndex::new(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_visible_range(mut self, min: f64, max: f64) -> Self {
        self.min_visible = min;
        self.max_visible = max;
        self
    }

    pub fn add_feature(&mut self, feature: Feature) {
        let feature_index = self.features.len();
        match feature.bbox() {
            Some(bbox) => self.index.insert(SpatialEntry {
                feature_index,
                bbox,
            }),
            None => log::debug!("Feature {} has no extent and will never be drawn", feature.id),
        }
        self.features.push(feature);
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

impl Layer for MemoryLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn visible_range(&self) -> (f64, f64) {
        (self.min_visible, self.max_visible)
    }

    fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    fn features_in_view_mut(&mut self, extent: &BBox, _resolution: f64) -> Vec<&mut Feature> {
        let hits = self.index.query_extent(extent);
        self.features
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| hits.binary_search(i).is_ok())
            .map(|(_, f)| f)
            .collect()
    }
}

/// Address of a tile in a tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    pub level: u32,
    pub col: i64,
    pub row: i64,
}

impl TileIndex {
    pub fn new(level: u32, col: i64, row: i64) -> Self {
        Self { level, col, row }
    }
}

/// The in-memory store of fetched tiles. Fetching and eviction live upstream.
#[derive(Debug, Default)]
pub struct MemoryCache {
    tiles: BTreeMap<TileIndex, Feature>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a tile, replacing any previous tile at the same index.
    pub fn add(&mut self, index: TileIndex, tile: Feature) {
        self.tiles.insert(index, tile);
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

/// A layer whose features are raster tiles held in a [`MemoryCache`].
#[derive(Debug)]
pub struct TileLayer {
    pub name: String,
    pub enabled: bool,
    pub style: Option<Style>,
    pub memory_cache: MemoryCache,
}

impl TileLayer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            style: Some(Style::new()),
            memory_cache: MemoryCache::new(),
        }
    }
}

impl Layer for TileLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    fn features_in_view_mut(&mut self, extent: &BBox, _resolution: f64) -> Vec<&mut Feature> {
        self.memory_cache
            .tiles
            .values_mut()
            .filter(|tile| tile.bbox().is_some_and(|bb| bb.intersects(extent)))
            .collect()
    }

    fn tile_count(&self) -> Option<usize> {
        Some(self.memory_cache.tile_count())
    }
}
