//! Unit-scaling wrapper around a physics world
//!
//! Callers work in world units; the wrapped engine sees the same values
//! multiplied by `scale`. Lengths, velocities, impulses and forces are scaled
//! on the way in and unscaled on the way out. Density and friction are scaled
//! once, when a body is created.
//!
//! Body handles are shared with the inner world, so observers registered
//! through the wrapper are handed straight to the engine.

use std::time::Duration;

use glam::Vec2;

use super::body::{BodyHandle, BodyObserver, PhysicsBodyDescription, PhysicsWorld, RayCastHit};
use crate::math::{Circle, Rect};
use crate::world::Direction;

/// A physics world viewed through a uniform unit scale
pub struct ScaledPhysicsWorld<W> {
    inner: W,
    scale: f32,
}

impl<W: PhysicsWorld> ScaledPhysicsWorld<W> {
    /// Wrap `inner`, where one world unit is `scale` engine units
    pub fn new(inner: W, scale: f32) -> Self {
        Self { inner, scale }
    }

    /// Engine units per world unit
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The wrapped world
    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// The wrapped world, mutably
    pub fn inner_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwrap into the inner world
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: PhysicsWorld> PhysicsWorld for ScaledPhysicsWorld<W> {
    fn step(&mut self, delta: Duration) {
        self.inner.step(delta);
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.inner.set_gravity(gravity);
    }

    fn max_friction_force(&self) -> f32 {
        self.inner.max_friction_force()
    }

    fn create_body(&mut self, description: &PhysicsBodyDescription) -> BodyHandle {
        let scaled = PhysicsBodyDescription {
            aabb: description.aabb.scale(self.scale),
            density: description.density * self.scale,
            friction: description.friction * self.scale,
            ..*description
        };
        self.inner.create_body(&scaled)
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.inner.remove_body(body);
    }

    fn contains(&self, body: BodyHandle) -> bool {
        self.inner.contains(body)
    }

    fn is_static(&self, body: BodyHandle) -> bool {
        self.inner.is_static(body)
    }

    fn is_collidable(&self, body: BodyHandle) -> bool {
        self.inner.is_collidable(body)
    }

    fn set_collidable(&mut self, body: BodyHandle, collidable: bool) {
        self.inner.set_collidable(body, collidable);
    }

    fn location(&self, body: BodyHandle) -> Option<Vec2> {
        self.inner.location(body).map(|l| l / self.scale)
    }

    fn set_location(&mut self, body: BodyHandle, location: Vec2) {
        self.inner.set_location(body, location * self.scale);
    }

    fn direction(&self, body: BodyHandle) -> Option<Direction> {
        self.inner.direction(body)
    }

    fn set_direction(&mut self, body: BodyHandle, direction: Direction) {
        self.inner.set_direction(body, direction);
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.inner.linear_velocity(body).map(|v| v / self.scale)
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        self.inner.set_linear_velocity(body, velocity * self.scale);
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<f32> {
        self.inner.angular_velocity(body).map(|w| w / self.scale)
    }

    fn mass(&self, body: BodyHandle) -> Option<f32> {
        self.inner.mass(body).map(|m| m / self.scale)
    }

    fn friction(&self, body: BodyHandle) -> Option<f32> {
        self.inner.friction(body)
    }

    fn aabb(&self, body: BodyHandle) -> Option<Rect> {
        self.inner.aabb(body).map(|r| r.scale(1.0 / self.scale))
    }

    fn bounding_circle(&self, body: BodyHandle) -> Option<Circle> {
        self.inner
            .bounding_circle(body)
            .map(|c| c.scale(1.0 / self.scale))
    }

    fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        self.inner.apply_linear_impulse(body, impulse * self.scale);
    }

    fn apply_angular_impulse(&mut self, body: BodyHandle, impulse: f32) {
        self.inner.apply_angular_impulse(body, impulse * self.scale);
    }

    fn apply_force_to_center(&mut self, body: BodyHandle, force: Vec2) {
        self.inner.apply_force_to_center(body, force * self.scale);
    }

    fn apply_torque(&mut self, body: BodyHandle, torque: f32) {
        self.inner.apply_torque(body, torque * self.scale);
    }

    fn cast_ray(&self, body: BodyHandle, direction: Vec2, max_distance: f32) -> Option<RayCastHit> {
        self.inner
            .cast_ray(body, direction, max_distance * self.scale)
            .map(|hit| RayCastHit {
                distance: hit.distance / self.scale,
                ..hit
            })
    }

    fn add_observer(&mut self, body: BodyHandle, observer: Box<dyn BodyObserver>) {
        self.inner.add_observer(body, observer);
    }
}
