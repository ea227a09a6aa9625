//! Area filters for tile queries

use glam::{IVec2, Vec2};

use crate::math::{Circle, Rect, TileBounds};

/// Selects a set of tiles for an area query
pub trait SearchFilter {
    /// Tiles that may be included; everything outside is skipped
    fn search_bounds(&self) -> TileBounds;

    /// Final per-tile test for tiles inside the search bounds
    fn should_include(&self, tile: IVec2) -> bool;
}

/// Tiles whose centre lies within a radius of a point
#[derive(Debug, Clone, Copy)]
pub struct RadialSearchFilter {
    area: Circle,
}

impl RadialSearchFilter {
    /// Create a new radial filter
    #[must_use]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            area: Circle::new(center, radius),
        }
    }
}

impl SearchFilter for RadialSearchFilter {
    fn search_bounds(&self) -> TileBounds {
        let min = (self.area.center - Vec2::splat(self.area.radius)).floor();
        let max = (self.area.center + Vec2::splat(self.area.radius)).ceil();
        TileBounds::new(min.as_ivec2(), max.as_ivec2())
    }

    fn should_include(&self, tile: IVec2) -> bool {
        self.area.contains(tile.as_vec2())
    }
}

/// Tiles overlapped by a rectangle
#[derive(Debug, Clone, Copy)]
pub struct RectangleSearchFilter {
    area: Rect,
}

impl RectangleSearchFilter {
    /// Create a new rectangle filter
    #[must_use]
    pub fn new(area: Rect) -> Self {
        Self { area }
    }
}

impl SearchFilter for RectangleSearchFilter {
    fn search_bounds(&self) -> TileBounds {
        self.area.tiles()
    }

    fn should_include(&self, _tile: IVec2) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn included(filter: &dyn SearchFilter) -> Vec<IVec2> {
        filter
            .search_bounds()
            .iter()
            .filter(|&tile| filter.should_include(tile))
            .collect()
    }

    #[test]
    fn test_radial_zero_radius_is_single_tile() {
        let filter = RadialSearchFilter::new(Vec2::new(3.0, 4.0), 0.0);

        assert_eq!(included(&filter), vec![IVec2::new(3, 4)]);
    }

    #[test]
    fn test_radial_unit_radius_is_plus_shape() {
        let filter = RadialSearchFilter::new(Vec2::ZERO, 1.0);
        let tiles = included(&filter);

        assert_eq!(tiles.len(), 5);
        assert!(tiles.contains(&IVec2::new(0, 1)));
        assert!(!tiles.contains(&IVec2::new(1, 1)));
    }

    #[test]
    fn test_rectangle_filter() {
        let filter = RectangleSearchFilter::new(Rect::new(-0.5, -0.5, 2.0, 1.0));

        assert_eq!(included(&filter), vec![IVec2::new(0, 0), IVec2::new(1, 0)]);
    }
}
