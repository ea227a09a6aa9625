//! A 2D tile navigation and steering core built in Rust
//!
//! This crate provides:
//! - A* route planning over a tile grid with pluggable routing rules
//! - Steering behaviors that drive physics bodies along routes
//! - Physics simulation with rapier2d, optionally unit-scaled
//! - Entity Component System (ECS) world with tile effects

pub mod ai;
pub mod core;
pub mod math;
pub mod physics;
pub mod world;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier2d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AStarRouteFactory, AvoidanceBehavior, ClearanceRoutingRules, DefaultRoutingRules,
        DirectionBehavior, EntityRoutingRules, FleeBehavior, Route, RouteError, RouteFactory,
        RoutingRules, SeekBehavior, SteeringBehavior, SteeringBehaviorList, SteeringDriver,
        TraverseRouteBehavior, VelocityLimitSteeringDriver,
    };
    pub use crate::core::{ConfigError, NavigationConfig, WorldConfig};
    pub use crate::math::{Circle, Rect};
    pub use crate::physics::{
        BodyHandle, BodyObserver, PhysicsBodyDescription, PhysicsBodyKind, PhysicsBodyShape,
        PhysicsWorld, RapierWorld, ScaledPhysicsWorld,
    };
    pub use crate::world::{
        Direction, EffectMap, PhysicsBody, Steering, TileEffects, TileQuery, World, WorldError,
    };
    pub use glam::{IVec2, Vec2};
}
