//! # mapcanvas core
//!
//! The model the renderer consumes: world/screen geometry, the viewport
//! transform, styles, features with their per-style render cache, layers
//! (in-memory and tile-backed) with R-tree culling, visible-feature
//! iteration, and the hyperlink widget.

pub mod geometry;
pub mod viewport;
pub mod style;
pub mod feature;
pub mod spatial;
pub mod layer;
pub mod iteration;
pub mod widget;

pub use geometry::{BBox, Point};
pub use viewport::Viewport;
pub use style::{Color, Style, StyleId};
pub use feature::{Bitmap, Feature, FeatureId, Geometry, RenderedGeometry};
pub use layer::{Layer, MemoryCache, MemoryLayer, TileIndex, TileLayer};
pub use iteration::iterate_layers;
pub use widget::{HorizontalAlignment, Hyperlink, VerticalAlignment, WidgetError};
