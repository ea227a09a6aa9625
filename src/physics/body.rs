//! Backend-independent physics surface
//!
//! Everything above the physics engine talks to bodies through
//! [`PhysicsWorld`] and a [`BodyHandle`]. Reads of a removed body return
//! `None`; writes to a removed body are ignored.

use std::time::Duration;

use glam::Vec2;

use crate::math::{Circle, Rect};
use crate::world::Direction;

/// Handle to a body in a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    /// Build a handle from its raw arena index and generation
    #[must_use]
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Split the handle into arena index and generation
    #[must_use]
    pub const fn into_raw_parts(self) -> (u32, u32) {
        (self.index, self.generation)
    }
}

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhysicsBodyKind {
    /// Never moves
    #[default]
    Static,
    /// Moved by forces and contacts
    Dynamic,
}

/// Collision shape of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhysicsBodyShape {
    /// Circle inscribed in the description's AABB
    Circle,
    /// Box filling the description's AABB
    #[default]
    Box,
}

/// Everything needed to create a body
///
/// `aabb` is relative to the body origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBodyDescription {
    /// Static or dynamic
    pub kind: PhysicsBodyKind,
    /// Collider shape
    pub shape: PhysicsBodyShape,
    /// Collider bounds relative to the body origin
    pub aabb: Rect,
    /// Collider density
    pub density: f32,
    /// Disable rotation from contacts
    pub fixed_rotation: bool,
    /// Report contacts without colliding
    pub sensor: bool,
    /// Surface friction
    pub friction: f32,
}

impl Default for PhysicsBodyDescription {
    fn default() -> Self {
        Self {
            kind: PhysicsBodyKind::Static,
            shape: PhysicsBodyShape::Box,
            aabb: Rect::new(-0.5, -0.5, 1.0, 1.0),
            density: 1.0,
            fixed_rotation: true,
            sensor: false,
            friction: 0.0,
        }
    }
}

impl PhysicsBodyDescription {
    /// A dynamic body with the given bounds
    #[must_use]
    pub fn dynamic(aabb: Rect) -> Self {
        Self {
            kind: PhysicsBodyKind::Dynamic,
            aabb,
            ..Default::default()
        }
    }

    /// A static body with the given bounds
    #[must_use]
    pub fn fixed(aabb: Rect) -> Self {
        Self {
            kind: PhysicsBodyKind::Static,
            aabb,
            ..Default::default()
        }
    }

    /// Set the collider shape
    #[must_use]
    pub fn with_shape(mut self, shape: PhysicsBodyShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set density
    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Set friction
    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Make the body a sensor
    #[must_use]
    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }
}

/// Result of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastHit {
    /// The body that was hit
    pub body: BodyHandle,
    /// Surface normal at the hit point
    pub normal: Vec2,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Receives notifications about a single body
///
/// Contact callbacks are delivered after the physics step that produced them
/// has finished, so observers may freely mutate the world.
pub trait BodyObserver {
    /// The body started touching `other`
    fn begin_contact(&mut self, _other: BodyHandle) {}

    /// The body stopped touching `other`
    fn end_contact(&mut self, _other: BodyHandle) {}

    /// The body was teleported
    fn location_set(&mut self) {}

    /// The body was turned to face a new direction
    fn direction_set(&mut self) {}
}

/// A 2D physics world addressed through body handles
pub trait PhysicsWorld {
    /// Advance the simulation and relay deferred contact events
    fn step(&mut self, delta: Duration);

    /// Set world gravity
    fn set_gravity(&mut self, gravity: Vec2);

    /// Largest friction force the world surface can exert
    fn max_friction_force(&self) -> f32;

    /// Create a body at the origin
    fn create_body(&mut self, description: &PhysicsBodyDescription) -> BodyHandle;

    /// Remove a body and its collider
    fn remove_body(&mut self, body: BodyHandle);

    /// Check if a body exists
    fn contains(&self, body: BodyHandle) -> bool;

    /// Whether the body never moves
    fn is_static(&self, body: BodyHandle) -> bool;

    /// Whether the body takes part in collisions
    fn is_collidable(&self, body: BodyHandle) -> bool;

    /// Enable or disable collisions for a body
    fn set_collidable(&mut self, body: BodyHandle, collidable: bool);

    /// Body origin
    fn location(&self, body: BodyHandle) -> Option<Vec2>;

    /// Teleport a body
    fn set_location(&mut self, body: BodyHandle, location: Vec2);

    /// Grid direction the body is facing
    fn direction(&self, body: BodyHandle) -> Option<Direction>;

    /// Turn a body to face a grid direction
    fn set_direction(&mut self, body: BodyHandle, direction: Direction);

    /// Linear velocity
    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2>;

    /// Set linear velocity
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2);

    /// Angular velocity
    fn angular_velocity(&self, body: BodyHandle) -> Option<f32>;

    /// Body mass
    fn mass(&self, body: BodyHandle) -> Option<f32>;

    /// Collider friction
    fn friction(&self, body: BodyHandle) -> Option<f32>;

    /// World-space bounds of the collider
    fn aabb(&self, body: BodyHandle) -> Option<Rect>;

    /// World-space bounding circle of the collider
    fn bounding_circle(&self, body: BodyHandle) -> Option<Circle>;

    /// Apply an impulse at the centre of mass
    fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec2);

    /// Apply an angular impulse
    fn apply_angular_impulse(&mut self, body: BodyHandle, impulse: f32);

    /// Apply a force at the centre of mass until the next step
    fn apply_force_to_center(&mut self, body: BodyHandle, force: Vec2);

    /// Apply a torque until the next step
    fn apply_torque(&mut self, body: BodyHandle, torque: f32);

    /// Cast a ray from the body outwards, ignoring the body itself
    fn cast_ray(&self, body: BodyHandle, direction: Vec2, max_distance: f32) -> Option<RayCastHit>;

    /// Register an observer for a body
    fn add_observer(&mut self, body: BodyHandle, observer: Box<dyn BodyObserver>);
}
