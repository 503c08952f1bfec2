use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{BBox, Point};
use crate::style::{Style, StyleId};

/// Unique feature identifier.
pub type FeatureId = Uuid;

/// A decoded raster, ready to blit.
///
/// Pixels are premultiplied RGBA8, row-major, `width * height * 4` bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Geometry carried by a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Vector shape as a vertex list.
    Vector(Vec<Point>),
    /// Encoded image (PNG, JPEG, ...) covering a world-space box.
    Raster { data: Vec<u8>, bbox: BBox },
}

impl Geometry {
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Geometry::Vector(points) => BBox::from_points(points),
            Geometry::Raster { bbox, .. } => Some(*bbox),
        }
    }
}

/// Per-style cache of rasterized geometry owned by a single feature.
///
/// Entries are written once per style and never evicted; the cache lives and
/// dies with its feature.
#[derive(Debug, Clone, Default)]
pub struct RenderedGeometry {
    entries: Vec<(StyleId, Bitmap)>,
}

impl RenderedGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, style: &StyleId) -> Option<&Bitmap> {
        self.entries
            .iter()
            .find(|(id, _)| id == style)
            .map(|(_, bitmap)| bitmap)
    }

    pub fn contains(&self, style: &StyleId) -> bool {
        self.get(style).is_some()
    }

    /// Return the cached bitmap for `style`, producing it with `make` on a miss.
    ///
    /// `make` runs at most once per style; its error is returned unchanged and
    /// leaves the cache untouched.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        style: StyleId,
        make: impl FnOnce() -> Result<Bitmap, E>,
    ) -> Result<&Bitmap, E> {
        let index = match self.entries.iter().position(|(id, _)| *id == style) {
            Some(index) => index,
            None => {
                let bitmap = make()?;
                self.entries.push((style, bitmap));
                self.entries.len() - 1
            }
        };
        Ok(&self.entries[index].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A map feature: geometry, optional own styles and its render cache.
#[derive(Debug, Clone)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub styles: Vec<Style>,
    pub rendered: RenderedGeometry,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry,
            styles: Vec::new(),
            rendered: RenderedGeometry::new(),
        }
    }

    pub fn raster(data: Vec<u8>, bbox: BBox) -> Self {
        Self::new(Geometry::Raster { data, bbox })
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.styles.push(style);
        self
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.geometry.bbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> Bitmap {
        Bitmap::new(1, 1, vec![255, 0, 0, 255])
    }

    #[test]
    fn test_cache_builds_once_per_style() {
        let mut cache = RenderedGeometry::new();
        let style = Uuid::new_v4();
        let mut calls = 0;
        for _ in 0..3 {
            let bitmap = cache
                .get_or_try_insert_with::<()>(style, || {
                    calls += 1;
                    Ok(pixel())
                })
                .unwrap();
            assert_eq!(bitmap.width, 1);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keeps_styles_apart() {
        let mut cache = RenderedGeometry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cache.get_or_try_insert_with::<()>(a, || Ok(pixel())).unwrap();
        cache
            .get_or_try_insert_with::<()>(b, || Ok(Bitmap::new(2, 1, vec![0; 8])))
            .unwrap();
        assert_eq!(cache.get(&a).unwrap().width, 1);
        assert_eq!(cache.get(&b).unwrap().width, 2);
    }

    #[test]
    fn test_cache_error_leaves_no_entry() {
        let mut cache = RenderedGeometry::new();
        let style = Uuid::new_v4();
        let result = cache.get_or_try_insert_with(style, || Err("bad bytes"));
        assert_eq!(result.unwrap_err(), "bad bytes");
        assert!(!cache.contains(&style));
    }

    #[test]
    fn test_raster_bbox() {
        let bbox = BBox::from_coords(0.0, 0.0, 10.0, 10.0);
        let feature = Feature::raster(vec![1, 2, 3], bbox);
        assert!(matches!(feature.geometry, Geometry::Raster { .. }));
        assert_eq!(feature.bbox(), Some(bbox));
    }
}
