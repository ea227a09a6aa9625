//! Steering drivers turn behavior output into impulses on a body

use std::time::Duration;

use glam::Vec2;

use super::steering::{SteeringBehaviorList, SteeringSubject};
use crate::core::NavigationConfig;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::world::{Direction, ZERO_TOLERANCE};

/// Moves an attached body according to its steering behaviors
pub trait SteeringDriver: Send + Sync {
    /// Start driving `body`
    fn attach(&mut self, body: BodyHandle);

    /// Stop driving; later updates do nothing
    fn detach(&mut self);

    /// The driven body, if any
    fn attached(&self) -> Option<BodyHandle>;

    /// Whether a body is attached
    fn is_attached(&self) -> bool {
        self.attached().is_some()
    }

    /// Whether the behaviors currently ask for movement
    fn is_driving(&mut self, physics: &dyn PhysicsWorld) -> bool;

    /// Behaviors consulted on every update
    fn behaviors_mut(&mut self) -> &mut SteeringBehaviorList;

    /// Apply one tick of steering
    fn update(&mut self, physics: &mut dyn PhysicsWorld, delta: Duration);
}

/// Accelerates a body towards a capped steering velocity
///
/// Each tick the impulse that would take the body from its current velocity
/// to the desired one is applied, plus enough extra to overcome ground
/// friction. The body is turned to face the correction.
pub struct VelocityLimitSteeringDriver {
    behaviors: SteeringBehaviorList,
    max_steer_velocity: f32,
    body: Option<BodyHandle>,
}

impl VelocityLimitSteeringDriver {
    /// Create a detached driver with no behaviors
    #[must_use]
    pub fn new(max_steer_velocity: f32) -> Self {
        Self {
            behaviors: SteeringBehaviorList::new(),
            max_steer_velocity,
            body: None,
        }
    }

    /// Create a driver using the configured speed limit
    #[must_use]
    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.max_steer_velocity)
    }

    /// Replace the behavior list, builder style
    #[must_use]
    pub fn with_behaviors(mut self, behaviors: SteeringBehaviorList) -> Self {
        self.behaviors = behaviors;
        self
    }

    /// Speed the driver steers towards
    #[must_use]
    pub fn max_steer_velocity(&self) -> f32 {
        self.max_steer_velocity
    }

    fn steer_velocity(&mut self, subject: &SteeringSubject<'_>) -> Vec2 {
        self.behaviors.combine(subject) * self.max_steer_velocity
    }
}

impl SteeringDriver for VelocityLimitSteeringDriver {
    fn attach(&mut self, body: BodyHandle) {
        self.body = Some(body);
    }

    fn detach(&mut self) {
        self.body = None;
    }

    fn attached(&self) -> Option<BodyHandle> {
        self.body
    }

    fn is_driving(&mut self, physics: &dyn PhysicsWorld) -> bool {
        let Some(body) = self.body else {
            return false;
        };
        let Some(subject) = SteeringSubject::capture(physics, body) else {
            return false;
        };
        self.steer_velocity(&subject).length() > ZERO_TOLERANCE
    }

    fn behaviors_mut(&mut self) -> &mut SteeringBehaviorList {
        &mut self.behaviors
    }

    fn update(&mut self, physics: &mut dyn PhysicsWorld, delta: Duration) {
        let Some(body) = self.body else {
            return;
        };

        let (correction, mass) = {
            let Some(subject) = SteeringSubject::capture(&*physics, body) else {
                log::warn!("Steering driver lost its body {body:?}");
                return;
            };
            let desired = self.steer_velocity(&subject);
            (desired - subject.linear_velocity(), subject.mass())
        };

        if correction.length() <= ZERO_TOLERANCE {
            return;
        }

        let friction = correction.normalize() * physics.max_friction_force();
        let impulse = (correction * mass + friction) * delta.as_secs_f32();
        log::trace!("Steering {body:?} with impulse {impulse}");

        physics.apply_linear_impulse(body, impulse);
        physics.set_direction(body, Direction::from_vector(correction));
    }
}
