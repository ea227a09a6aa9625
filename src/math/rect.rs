//! Rectangle, circle and tile-bounds primitives

use glam::{IVec2, Vec2};

/// An axis-aligned rectangle in world units
///
/// `(x, y)` is the minimum corner; the rectangle extends `width` along +X
/// and `height` along +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Minimum X
    pub x: f32,
    /// Minimum Y
    pub y: f32,
    /// Extent along X
    pub width: f32,
    /// Extent along Y
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its minimum and maximum corners
    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Create a rectangle of the given size centred on a point
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::from_min_max(center - size * 0.5, center + size * 0.5)
    }

    /// Minimum corner
    #[must_use]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Maximum corner
    #[must_use]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Width and height as a vector
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Centre point
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min() + self.size() * 0.5
    }

    /// Move the rectangle by an offset
    #[must_use]
    pub fn translate(self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Multiply every spatial field by a factor
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Check if a point is inside the rectangle (min inclusive, max exclusive)
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.x && point.x < max.x && point.y >= self.y && point.y < max.y
    }

    /// Smallest circle enclosing the rectangle
    #[must_use]
    pub fn bounding_circle(&self) -> Circle {
        Circle::new(self.center(), self.size().length() * 0.5)
    }

    /// Tiles overlapped by this rectangle
    ///
    /// Tile `t` covers `[t - 0.5, t + 0.5)` on each axis, so a unit square
    /// centred on a tile overlaps exactly that tile.
    #[must_use]
    pub fn tiles(&self) -> TileBounds {
        let min = (self.min() + Vec2::splat(0.5)).floor();
        let max = (self.max() + Vec2::splat(0.5)).ceil() - Vec2::ONE;
        TileBounds::new(min.as_ivec2(), max.max(min).as_ivec2())
    }
}

/// A circle in world units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    /// Centre point
    pub center: Vec2,
    /// Radius
    pub radius: f32,
}

impl Circle {
    /// Create a new circle
    #[must_use]
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if a point lies within the circle (boundary inclusive)
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) <= self.radius
    }

    /// Multiply centre and radius by a factor
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.center * factor, self.radius * factor)
    }
}

/// Inclusive range of integer tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    /// First tile (inclusive)
    pub min: IVec2,
    /// Last tile (inclusive)
    pub max: IVec2,
}

impl TileBounds {
    /// Create bounds spanning `min..=max`
    #[must_use]
    pub const fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    /// Bounds containing a single tile
    #[must_use]
    pub const fn single(tile: IVec2) -> Self {
        Self::new(tile, tile)
    }

    /// Check if a tile is inside the bounds
    #[must_use]
    pub fn contains(&self, tile: IVec2) -> bool {
        tile.x >= self.min.x && tile.x <= self.max.x && tile.y >= self.min.y && tile.y <= self.max.y
    }

    /// Iterate every tile, row by row
    pub fn iter(&self) -> impl Iterator<Item = IVec2> + use<> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec2::new(x, y)))
    }
}
