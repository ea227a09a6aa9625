//! 2D geometry primitives
//!
//! Axis-aligned rectangles, circles and integer tile bounds shared by the
//! world, physics and navigation modules.

mod rect;

pub use rect::{Circle, Rect, TileBounds};
