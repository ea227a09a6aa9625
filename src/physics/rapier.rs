//! Physics simulation using rapier2d

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use glam::Vec2;
use rapier2d::prelude::*;
use rustc_hash::FxHashMap;

use super::body::{
    BodyHandle, BodyObserver, PhysicsBodyDescription, PhysicsBodyKind, PhysicsBodyShape,
    PhysicsWorld, RayCastHit,
};
use super::contact::{ContactEvent, ContactQueue};
use crate::core::{StepClock, WorldConfig};
use crate::math::{Circle, Rect};
use crate::world::{Direction, ZERO_TOLERANCE};

impl From<RigidBodyHandle> for BodyHandle {
    fn from(handle: RigidBodyHandle) -> Self {
        let (index, generation) = handle.into_raw_parts();
        Self::from_raw_parts(index, generation)
    }
}

fn rapier_handle(body: BodyHandle) -> RigidBodyHandle {
    let (index, generation) = body.into_raw_parts();
    RigidBodyHandle::from_raw_parts(index, generation)
}

fn to_glam(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Collects collision events while the pipeline holds the sets
#[derive(Default)]
struct ContactCollector {
    queue: Mutex<ContactQueue>,
}

impl ContactCollector {
    fn drain(&self) -> Vec<ContactEvent> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.drain().collect()
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let parent = |handle| colliders.get(handle).and_then(Collider::parent);
        let (Some(a), Some(b)) = (parent(event.collider1()), parent(event.collider2())) else {
            return;
        };

        let (body, other) = (BodyHandle::from(a), BodyHandle::from(b));
        let contact = if event.started() {
            ContactEvent::Begin { body, other }
        } else {
            ContactEvent::End { body, other }
        };

        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(contact);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Top-down physics world backed by rapier2d
///
/// Ground friction is emulated by braking every dynamic body with at most
/// `max_friction_force` each step.
pub struct RapierWorld {
    /// Gravity vector
    gravity: Vec2,
    /// Friction limit of the ground surface
    max_friction_force: f32,
    /// Fixed-step accumulator
    clock: StepClock,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Query pipeline for ray casts
    query_pipeline: QueryPipeline,
    integration_parameters: IntegrationParameters,
    collector: ContactCollector,
    observers: FxHashMap<BodyHandle, Vec<Box<dyn BodyObserver>>>,
}

impl RapierWorld {
    /// Create a world with the given ground friction limit, zero gravity and a 30 Hz step
    pub fn new(max_friction_force: f32) -> Self {
        Self::with_step_rate(max_friction_force, 30.0)
    }

    /// Create a world stepping at `rate` Hz
    pub fn with_step_rate(max_friction_force: f32, rate: f32) -> Self {
        let clock = StepClock::from_rate(rate);
        let integration_parameters = IntegrationParameters {
            dt: clock.interval().as_secs_f32(),
            ..IntegrationParameters::default()
        };

        Self {
            gravity: Vec2::ZERO,
            max_friction_force,
            clock,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters,
            collector: ContactCollector::default(),
            observers: FxHashMap::default(),
        }
    }

    /// Create a world from the engine-side values of a config
    pub fn from_config(config: &WorldConfig) -> Self {
        let mut world = Self::with_step_rate(config.max_friction_force, config.step_rate);
        world.gravity = config.gravity;
        world
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    fn collider(&self, body: BodyHandle) -> Option<&Collider> {
        let rb = self.rigid_body_set.get(rapier_handle(body))?;
        rb.colliders()
            .first()
            .and_then(|&handle| self.collider_set.get(handle))
    }

    fn step_once(&mut self) {
        self.apply_ground_friction();

        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.collector,
        );

        for (_, rb) in self.rigid_body_set.iter_mut() {
            if rb.is_dynamic() {
                rb.reset_forces(false);
                rb.reset_torques(false);
            }
        }
    }

    fn apply_ground_friction(&mut self) {
        let max_impulse = self.max_friction_force * self.integration_parameters.dt;
        if max_impulse <= 0.0 {
            return;
        }

        for (_, rb) in self.rigid_body_set.iter_mut() {
            if !rb.is_dynamic() {
                continue;
            }

            let velocity = *rb.linvel();
            let speed = velocity.norm();
            if speed <= ZERO_TOLERANCE {
                continue;
            }

            let braking = (rb.mass() * speed).min(max_impulse);
            rb.apply_impulse(-velocity / speed * braking, false);
        }
    }

    fn relay_contacts(&mut self) {
        for event in self.collector.drain() {
            let (body, other) = event.bodies();
            match event {
                ContactEvent::Begin { .. } => {
                    self.notify(body, |o| o.begin_contact(other));
                    self.notify(other, |o| o.begin_contact(body));
                }
                ContactEvent::End { .. } => {
                    self.notify(body, |o| o.end_contact(other));
                    self.notify(other, |o| o.end_contact(body));
                }
            }
        }
    }

    fn notify(&mut self, body: BodyHandle, mut f: impl FnMut(&mut dyn BodyObserver)) {
        if let Some(observers) = self.observers.get_mut(&body) {
            for observer in observers.iter_mut() {
                f(observer.as_mut());
            }
        }
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::from_config(&WorldConfig::default())
    }
}

impl PhysicsWorld for RapierWorld {
    fn step(&mut self, delta: Duration) {
        for _ in 0..self.clock.advance(delta) {
            self.step_once();
        }
        self.relay_contacts();
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn max_friction_force(&self) -> f32 {
        self.max_friction_force
    }

    fn create_body(&mut self, description: &PhysicsBodyDescription) -> BodyHandle {
        let builder = match description.kind {
            PhysicsBodyKind::Static => RigidBodyBuilder::fixed(),
            PhysicsBodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let builder = if description.fixed_rotation {
            builder.lock_rotations()
        } else {
            builder
        };
        let handle = self.rigid_body_set.insert(builder.build());

        let aabb = description.aabb;
        let half = aabb.size() * 0.5;
        let center = aabb.center();
        let shape = match description.shape {
            PhysicsBodyShape::Box => ColliderBuilder::cuboid(half.x, half.y),
            PhysicsBodyShape::Circle => ColliderBuilder::ball(half.x.min(half.y)),
        };
        let collider = shape
            .translation(vector![center.x, center.y])
            .density(description.density)
            .friction(description.friction)
            .sensor(description.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        let body = BodyHandle::from(handle);
        log::debug!("Created {:?} body {:?} with bounds {:?}", description.kind, body, aabb);
        body
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.rigid_body_set.remove(
            rapier_handle(body),
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        self.observers.remove(&body);
        log::debug!("Removed body {body:?}");
    }

    fn contains(&self, body: BodyHandle) -> bool {
        self.rigid_body_set.contains(rapier_handle(body))
    }

    fn is_static(&self, body: BodyHandle) -> bool {
        self.rigid_body_set
            .get(rapier_handle(body))
            .is_some_and(RigidBody::is_fixed)
    }

    fn is_collidable(&self, body: BodyHandle) -> bool {
        self.collider(body).is_some_and(Collider::is_enabled)
    }

    fn set_collidable(&mut self, body: BodyHandle, collidable: bool) {
        if let Some(rb) = self.rigid_body_set.get(rapier_handle(body)) {
            for &handle in rb.colliders() {
                if let Some(collider) = self.collider_set.get_mut(handle) {
                    collider.set_enabled(collidable);
                }
            }
        }
    }

    fn location(&self, body: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(rapier_handle(body))
            .map(|rb| to_glam(rb.translation()))
    }

    fn set_location(&mut self, body: BodyHandle, location: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(rapier_handle(body)) {
            rb.set_translation(vector![location.x, location.y], true);
            self.notify(body, |o| o.location_set());
        }
    }

    fn direction(&self, body: BodyHandle) -> Option<Direction> {
        self.rigid_body_set
            .get(rapier_handle(body))
            .map(|rb| Direction::from_angle(rb.rotation().angle()))
    }

    fn set_direction(&mut self, body: BodyHandle, direction: Direction) {
        if direction == Direction::Zero {
            return;
        }

        if let Some(rb) = self.rigid_body_set.get_mut(rapier_handle(body)) {
            rb.set_rotation(Rotation::new(direction.angle()), true);
            self.notify(body, |o| o.direction_set());
        }
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(rapier_handle(body))
            .map(|rb| to_glam(rb.linvel()))
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(rapier_handle(body)) {
            rb.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<f32> {
        self.rigid_body_set.get(rapier_handle(body)).map(RigidBody::angvel)
    }

    fn mass(&self, body: BodyHandle) -> Option<f32> {
        self.rigid_body_set.get(rapier_handle(body)).map(RigidBody::mass)
    }

    fn friction(&self, body: BodyHandle) -> Option<f32> {
        self.collider(body).map(Collider::friction)
    }

    fn aabb(&self, body: BodyHandle) -> Option<Rect> {
        self.collider(body).map(|collider| {
            let aabb = collider.compute_aabb();
            Rect::from_min_max(
                Vec2::new(aabb.mins.x, aabb.mins.y),
                Vec2::new(aabb.maxs.x, aabb.maxs.y),
            )
        })
    }

    fn bounding_circle(&self, body: BodyHandle) -> Option<Circle> {
        let collider = self.collider(body)?;
        match collider.shape().as_ball() {
            Some(ball) => Some(Circle::new(to_glam(collider.translation()), ball.radius)),
            None => self.aabb(body).map(|aabb| aabb.bounding_circle()),
        }
    }

    fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(rapier_handle(body)) {
            rb.apply_impulse(vector![impulse.x, impulse.y], true);
        }
    }

    fn apply_angular_impulse(&mut self, body: BodyHandle, impulse: f32) {
        if let Some(rb) = self.rigid_body_set.get_mut(rapier_handle(body)) {
            rb.apply_torque_impulse(impulse, true);
        }
    }

    fn apply_force_to_center(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(rapier_handle(body)) {
            rb.add_force(vector![force.x, force.y], true);
        }
    }

    fn apply_torque(&mut self, body: BodyHandle, torque: f32) {
        if let Some(rb) = self.rigid_body_set.get_mut(rapier_handle(body)) {
            rb.add_torque(torque, true);
        }
    }

    fn cast_ray(&self, body: BodyHandle, direction: Vec2, max_distance: f32) -> Option<RayCastHit> {
        let handle = rapier_handle(body);
        let origin = self.rigid_body_set.get(handle)?.translation();
        if direction.length() <= ZERO_TOLERANCE {
            return None;
        }

        let dir = direction.normalize();
        let ray = Ray::new(point![origin.x, origin.y], vector![dir.x, dir.y]);
        let filter = QueryFilter::default()
            .exclude_rigid_body(handle)
            .exclude_sensors();

        let (collider, hit) = self.query_pipeline.cast_ray_and_get_normal(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            filter,
        )?;

        let parent = self.collider_set.get(collider)?.parent()?;
        Some(RayCastHit {
            body: parent.into(),
            normal: to_glam(&hit.normal),
            distance: hit.time_of_impact,
        })
    }

    fn add_observer(&mut self, body: BodyHandle, observer: Box<dyn BodyObserver>) {
        self.observers.entry(body).or_default().push(observer);
    }
}
