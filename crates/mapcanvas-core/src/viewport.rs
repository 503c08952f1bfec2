use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Point};

/// The pan/zoom/rotation/size state that defines the world-to-screen mapping.
///
/// World Y grows upward, screen Y grows downward. Rotation is applied around
/// the screen center, clockwise in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// World coordinate shown at the center of the screen.
    pub center: Point,
    /// World units per screen pixel.
    pub resolution: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Output width in pixels.
    pub width: f64,
    /// Output height in pixels.
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            center: Point::new(0.0, 0.0),
            resolution: 1.0,
            rotation: 0.0,
            width,
            height,
        }
    }

    pub fn with_center(mut self, x: f64, y: f64) -> Self {
        self.center = Point::new(x, y);
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Convert a world coordinate to a screen pixel position.
    pub fn world_to_screen(&self, world: &Point) -> Point {
        let sx = (world.x - self.center.x) / self.resolution;
        let sy = (self.center.y - world.y) / self.resolution;
        let (rx, ry) = self.rotate(sx, sy, self.rotation);
        Point::new(rx + self.width / 2.0, ry + self.height / 2.0)
    }

    /// Convert a screen pixel position back to world coordinates.
    pub fn screen_to_world(&self, screen: &Point) -> Point {
        let (sx, sy) = self.rotate(
            screen.x - self.width / 2.0,
            screen.y - self.height / 2.0,
            -self.rotation,
        );
        Point::new(
            self.center.x + sx * self.resolution,
            self.center.y - sy * self.resolution,
        )
    }

    /// World-space bounding box covering the whole screen, rotation included.
    pub fn extent(&self) -> BBox {
        let corners = [
            self.screen_to_world(&Point::new(0.0, 0.0)),
            self.screen_to_world(&Point::new(self.width, 0.0)),
            self.screen_to_world(&Point::new(self.width, self.height)),
            self.screen_to_world(&Point::new(0.0, self.height)),
        ];
        // Four corners are always present.
        BBox::from_points(&corners).unwrap_or_else(|| BBox::new(self.center, self.center))
    }

    fn rotate(&self, x: f64, y: f64, degrees: f64) -> (f64, f64) {
        if degrees == 0.0 {
            return (x, y);
        }
        let rad = degrees.to_radians();
        let (sin_r, cos_r) = rad.sin_cos();
        (x * cos_r - y * sin_r, x * sin_r + y * cos_r)
    }
}
