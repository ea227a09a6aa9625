//! World module
//!
//! Tile directions, per-tile effects and the entity world that ties them to
//! physics and steering.

mod components;
mod direction;
mod effects;
mod entities;
mod search;

pub use components::{PhysicsBody, Steering};
pub use direction::{Direction, ZERO_TOLERANCE};
pub use effects::{EffectMap, TileEffects, TileQuery};
pub use entities::{World, WorldError};
pub use search::{RadialSearchFilter, RectangleSearchFilter, SearchFilter};
