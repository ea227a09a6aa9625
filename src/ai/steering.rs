//! Steering behaviors for physics bodies
//!
//! A behavior takes the direction accumulated so far and returns an adjusted
//! one. Behaviors are chained through a [`SteeringBehaviorList`], which starts
//! from zero and normalizes the final sum.

use std::f32::consts::PI;

use glam::Vec2;

use super::route::Route;
use crate::math::{Circle, Rect};
use crate::physics::{BodyHandle, PhysicsWorld, RayCastHit};
use crate::world::{Direction, ZERO_TOLERANCE};

/// Snapshot of a body's state for one steering tick
pub struct SteeringSubject<'a> {
    physics: &'a dyn PhysicsWorld,
    body: BodyHandle,
    location: Vec2,
    linear_velocity: Vec2,
    mass: f32,
    aabb: Rect,
}

impl<'a> SteeringSubject<'a> {
    /// Read the current state of `body`, or `None` if it no longer exists
    pub fn capture(physics: &'a dyn PhysicsWorld, body: BodyHandle) -> Option<Self> {
        Some(Self {
            location: physics.location(body)?,
            linear_velocity: physics.linear_velocity(body)?,
            mass: physics.mass(body)?,
            aabb: physics.aabb(body)?,
            physics,
            body,
        })
    }

    /// The body being steered
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Body location
    pub fn location(&self) -> Vec2 {
        self.location
    }

    /// Body linear velocity
    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    /// Body mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// World-space bounds
    pub fn aabb(&self) -> Rect {
        self.aabb
    }

    /// Circle enclosing the bounds
    pub fn bounding_circle(&self) -> Circle {
        self.aabb.bounding_circle()
    }

    /// Cast a ray out from the body
    pub fn cast_ray(&self, direction: Vec2, max_distance: f32) -> Option<RayCastHit> {
        self.physics.cast_ray(self.body, direction, max_distance)
    }
}

/// Adjusts a steering direction
pub trait SteeringBehavior: Send + Sync {
    /// Return `current` adjusted by this behavior
    fn direct(&mut self, subject: &SteeringSubject<'_>, current: Vec2) -> Vec2;
}

/// Steer towards a point
#[derive(Debug, Clone)]
pub struct SeekBehavior {
    /// Point to reach
    pub target: Vec2,
    /// Weight of this behavior
    pub influence: f32,
    /// Distance at which the target counts as reached
    pub arrival_tolerance: f32,
}

impl SeekBehavior {
    /// Default arrival tolerance
    pub const ARRIVAL_TOLERANCE: f32 = 0.1;

    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec2, influence: f32) -> Self {
        Self {
            target,
            influence,
            arrival_tolerance: Self::ARRIVAL_TOLERANCE,
        }
    }

    /// Set the arrival tolerance
    #[must_use]
    pub fn with_arrival_tolerance(mut self, tolerance: f32) -> Self {
        self.arrival_tolerance = tolerance;
        self
    }
}

impl SteeringBehavior for SeekBehavior {
    fn direct(&mut self, subject: &SteeringSubject<'_>, current: Vec2) -> Vec2 {
        let delta = self.target - subject.location();
        if delta.length() < self.arrival_tolerance {
            return current;
        }
        current + delta.normalize_or_zero() * self.influence
    }
}

/// Steer away from a point while it is close
#[derive(Debug, Clone)]
pub struct FleeBehavior {
    /// Point to escape
    pub target: Vec2,
    /// Weight of this behavior
    pub influence: f32,
    /// Beyond this distance the behavior does nothing
    pub reaction_distance: f32,
}

impl FleeBehavior {
    /// Create a new flee behavior
    #[must_use]
    pub fn new(target: Vec2, influence: f32, reaction_distance: f32) -> Self {
        Self {
            target,
            influence,
            reaction_distance,
        }
    }
}

impl SteeringBehavior for FleeBehavior {
    fn direct(&mut self, subject: &SteeringSubject<'_>, current: Vec2) -> Vec2 {
        let delta = subject.location() - self.target;
        if delta.length() > self.reaction_distance {
            return current;
        }
        current + delta.normalize_or_zero() * self.influence
    }
}

/// Bend the travel direction around obstacles found by ray casts
///
/// Three rays are cast: straight ahead and one step to either side. When a
/// single side is blocked the heading turns away from it and the rays are
/// cast again, until a clear heading is found, the turn would be undone, or a
/// full turn has been tried.
#[derive(Debug, Clone)]
pub struct AvoidanceBehavior {
    /// Look-ahead beyond the body's own radius
    pub reaction_distance: f32,
}

impl AvoidanceBehavior {
    /// Angle between adjacent rays
    pub const STEP: f32 = PI / 8.0;

    /// Turns needed to sweep a full circle
    const ITERATIONS: usize = 16;

    /// Create a new avoidance behavior
    #[must_use]
    pub fn new(reaction_distance: f32) -> Self {
        Self { reaction_distance }
    }
}

impl SteeringBehavior for AvoidanceBehavior {
    fn direct(&mut self, subject: &SteeringSubject<'_>, current: Vec2) -> Vec2 {
        if current.length() <= ZERO_TOLERANCE {
            return current;
        }

        let reach = self.reaction_distance + subject.bounding_circle().radius;
        let (turn_left, turn_right) = (Vec2::from_angle(Self::STEP), Vec2::from_angle(-Self::STEP));
        let mut travel = current.normalize();
        let mut last_turn = None;

        for _ in 0..Self::ITERATIONS {
            let left = subject.cast_ray(turn_left.rotate(travel), reach).is_some();
            let right = subject.cast_ray(turn_right.rotate(travel), reach).is_some();
            let blocked_ahead = || subject.cast_ray(travel, reach).is_some();

            let turn = match (left, right) {
                (true, true) if blocked_ahead() => return Vec2::ZERO,
                (true, true) | (false, false) => return travel,
                (true, false) => Turn::Right,
                (false, true) => Turn::Left,
            };

            // Turning back undoes the previous step; settle between the two obstacles
            if last_turn == Some(turn.reverse()) && !blocked_ahead() {
                return travel;
            }

            travel = match turn {
                Turn::Left => turn_left.rotate(travel),
                Turn::Right => turn_right.rotate(travel),
            };
            last_turn = Some(turn);
        }

        log::trace!("Avoidance swept a full turn for {:?}", subject.body());
        travel
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Left,
    Right,
}

impl Turn {
    fn reverse(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Push in a fixed grid direction
#[derive(Debug, Clone)]
pub struct DirectionBehavior {
    /// Direction to push in
    pub direction: Direction,
}

impl DirectionBehavior {
    /// Create a new direction behavior
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl SteeringBehavior for DirectionBehavior {
    fn direct(&mut self, _subject: &SteeringSubject<'_>, current: Vec2) -> Vec2 {
        current + self.direction.unit_vector()
    }
}

/// Follow a route waypoint by waypoint
#[derive(Debug, Clone)]
pub struct TraverseRouteBehavior {
    route: Route,
    seek: SeekBehavior,
    waypoint_tolerance: f32,
    arrival_tolerance: f32,
}

impl TraverseRouteBehavior {
    /// Follow `route`
    ///
    /// Intermediate waypoints are passed once within `waypoint_tolerance`;
    /// the last one needs to be within `arrival_tolerance`.
    #[must_use]
    pub fn new(influence: f32, route: Route, waypoint_tolerance: f32, arrival_tolerance: f32) -> Self {
        Self {
            route,
            seek: SeekBehavior::new(Vec2::ZERO, influence),
            waypoint_tolerance,
            arrival_tolerance,
        }
    }

    /// Waypoints not yet reached
    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Whether every waypoint has been reached
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.route.is_empty()
    }
}

impl SteeringBehavior for TraverseRouteBehavior {
    fn direct(&mut self, subject: &SteeringSubject<'_>, current: Vec2) -> Vec2 {
        while let Some(target) = self.route.current_target() {
            let tolerance = if self.route.has_next() {
                self.waypoint_tolerance
            } else {
                self.arrival_tolerance
            };

            if subject.location().distance(target) < tolerance {
                self.route.next_target();
                continue;
            }

            self.seek.target = target;
            self.seek.arrival_tolerance = tolerance;
            return self.seek.direct(subject, current);
        }

        current
    }
}

/// Ordered behaviors folded into one direction
///
/// At most one route is followed at a time. It is folded in first, so the
/// remaining behaviors (avoidance in particular) can bend it, and is dropped
/// once complete.
#[derive(Default)]
pub struct SteeringBehaviorList {
    route: Option<TraverseRouteBehavior>,
    behaviors: Vec<Box<dyn SteeringBehavior>>,
}

impl SteeringBehaviorList {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a behavior, builder style
    #[must_use]
    pub fn with(mut self, behavior: impl SteeringBehavior + 'static) -> Self {
        self.push(behavior);
        self
    }

    /// Append a behavior
    pub fn push(&mut self, behavior: impl SteeringBehavior + 'static) {
        self.behaviors.push(Box::new(behavior));
    }

    /// Append an already boxed behavior
    pub fn push_boxed(&mut self, behavior: Box<dyn SteeringBehavior>) {
        self.behaviors.push(behavior);
    }

    /// Follow `route` instead of any route currently being followed
    pub fn set_route(&mut self, route: TraverseRouteBehavior) {
        self.route = Some(route);
    }

    /// Stop following the current route
    pub fn clear_route(&mut self) -> Option<TraverseRouteBehavior> {
        self.route.take()
    }

    /// The route being followed, if it is not yet complete
    #[must_use]
    pub fn route(&self) -> Option<&TraverseRouteBehavior> {
        self.route.as_ref()
    }

    /// Remove every behavior and the route
    pub fn clear(&mut self) {
        self.route = None;
        self.behaviors.clear();
    }

    /// Number of behaviors, the route included
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.len() + usize::from(self.route.is_some())
    }

    /// Check if there are no behaviors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fold every behavior starting from zero
    ///
    /// The result is a unit vector, or zero when the behaviors cancel out.
    pub fn combine(&mut self, subject: &SteeringSubject<'_>) -> Vec2 {
        let start = match self.route.as_mut() {
            Some(route) => route.direct(subject, Vec2::ZERO),
            None => Vec2::ZERO,
        };
        if self.route.as_ref().is_some_and(TraverseRouteBehavior::is_complete) {
            self.route = None;
        }

        let sum = self
            .behaviors
            .iter_mut()
            .fold(start, |acc, behavior| behavior.direct(subject, acc));

        if sum.length() > ZERO_TOLERANCE {
            sum.normalize()
        } else {
            Vec2::ZERO
        }
    }
}

impl SteeringBehavior for SteeringBehaviorList {
    fn direct(&mut self, subject: &SteeringSubject<'_>, _current: Vec2) -> Vec2 {
        self.combine(subject)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ai::{AStarRouteFactory, DefaultRoutingRules, RouteFactory};
    use crate::physics::{PhysicsBodyDescription, RapierWorld};
    use crate::world::EffectMap;

    fn world_with_body() -> (RapierWorld, BodyHandle) {
        let mut world = RapierWorld::new(1.0);
        let body = world.create_body(&PhysicsBodyDescription::dynamic(Rect::new(-0.25, -0.25, 0.5, 0.5)));
        (world, body)
    }

    fn wall(world: &mut RapierWorld, center: Vec2, size: Vec2) {
        let body = world.create_body(&PhysicsBodyDescription::fixed(Rect::from_center(Vec2::ZERO, size)));
        world.set_location(body, center);
    }

    #[test]
    fn test_seek() {
        let (world, body) = world_with_body();
        let subject = SteeringSubject::capture(&world, body).unwrap();

        let mut seek = SeekBehavior::new(Vec2::new(3.0, 4.0), 2.0);
        let out = seek.direct(&subject, Vec2::new(1.0, 0.0));
        assert!((out - Vec2::new(2.2, 1.6)).length() < 1e-5);

        let mut arrived = SeekBehavior::new(Vec2::new(0.05, 0.0), 1.0);
        assert_eq!(arrived.direct(&subject, Vec2::Y), Vec2::Y);
    }

    #[test]
    fn test_flee_reaction_distance() {
        let (world, body) = world_with_body();
        let subject = SteeringSubject::capture(&world, body).unwrap();

        let mut flee = FleeBehavior::new(Vec2::new(2.0, 0.0), 1.0, 3.0);
        assert!((flee.direct(&subject, Vec2::ZERO) - Vec2::NEG_X).length() < 1e-6);

        let mut distant = FleeBehavior::new(Vec2::new(5.0, 0.0), 1.0, 3.0);
        assert_eq!(distant.direct(&subject, Vec2::Y), Vec2::Y);
    }

    #[test]
    fn test_seek_and_flee_cancel() {
        let (world, body) = world_with_body();
        let subject = SteeringSubject::capture(&world, body).unwrap();
        let target = Vec2::new(2.0, 0.0);

        let mut list = SteeringBehaviorList::new()
            .with(SeekBehavior::new(target, 1.0))
            .with(FleeBehavior::new(target, 1.0, 2.0));

        let out = list.combine(&subject);
        assert_eq!(out, Vec2::ZERO);
        assert!(!out.is_nan());
    }

    #[test]
    fn test_list_normalizes() {
        let (world, body) = world_with_body();
        let subject = SteeringSubject::capture(&world, body).unwrap();

        let mut list = SteeringBehaviorList::new()
            .with(DirectionBehavior::new(Direction::XPlus))
            .with(DirectionBehavior::new(Direction::YPlus));

        let out = list.combine(&subject);
        assert!((out.length() - 1.0).abs() < 1e-6);
        assert!((out.x - out.y).abs() < 1e-6);
        assert_eq!(SteeringBehaviorList::new().combine(&subject), Vec2::ZERO);
    }

    #[test]
    fn test_avoidance_clear_path() {
        let (mut world, body) = world_with_body();
        world.step(Duration::from_millis(40));
        let subject = SteeringSubject::capture(&world, body).unwrap();

        let mut avoid = AvoidanceBehavior::new(3.0);
        assert!((avoid.direct(&subject, Vec2::new(2.0, 0.0)) - Vec2::X).length() < 1e-6);
        assert_eq!(avoid.direct(&subject, Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_avoidance_blocked_ahead() {
        let (mut world, body) = world_with_body();
        wall(&mut world, Vec2::new(3.0, 0.0), Vec2::new(1.0, 6.0));
        world.step(Duration::from_millis(40));
        let subject = SteeringSubject::capture(&world, body).unwrap();

        let mut avoid = AvoidanceBehavior::new(3.0);
        assert_eq!(avoid.direct(&subject, Vec2::X), Vec2::ZERO);
    }

    #[test]
    fn test_avoidance_turns_away() {
        let (mut world, body) = world_with_body();
        wall(&mut world, Vec2::new(2.0, 1.2), Vec2::ONE);
        world.step(Duration::from_millis(40));
        let subject = SteeringSubject::capture(&world, body).unwrap();

        let mut avoid = AvoidanceBehavior::new(3.0);
        let out = avoid.direct(&subject, Vec2::X);

        assert!((out.length() - 1.0).abs() < 1e-5);
        assert!((out.to_angle() + AvoidanceBehavior::STEP).abs() < 1e-4);
    }

    #[test]
    fn test_avoidance_settles_between_obstacles() {
        let (mut world, body) = world_with_body();
        let box_size = Vec2::splat(0.4);
        wall(&mut world, Vec2::from_angle(PI / 8.0) * 2.5, box_size);
        wall(&mut world, Vec2::from_angle(-PI / 4.0) * 2.5, box_size);
        world.step(Duration::from_millis(40));
        let subject = SteeringSubject::capture(&world, body).unwrap();

        assert!(subject.cast_ray(Vec2::X, 3.0).is_none());
        assert!(subject.cast_ray(Vec2::from_angle(-PI / 8.0), 3.0).is_none());

        let out = AvoidanceBehavior::new(3.0).direct(&subject, Vec2::X);
        assert!((out.length() - 1.0).abs() < 1e-5);
        assert!((out.to_angle() + AvoidanceBehavior::STEP).abs() < 1e-4);
    }

    #[test]
    fn test_traverse_route_advances() {
        let (mut world, body) = world_with_body();
        let route = Route::from_waypoints([Vec2::new(0.2, 0.0), Vec2::new(0.2, 3.0), Vec2::new(4.0, 3.0)]);
        let mut traverse = TraverseRouteBehavior::new(1.0, route, 0.5, 0.1);

        let subject = SteeringSubject::capture(&world, body).unwrap();
        let out = traverse.direct(&subject, Vec2::ZERO);
        assert_eq!(traverse.route().len(), 2);
        assert!(out.y > 0.99);

        world.set_location(body, Vec2::new(0.3, 2.8));
        let subject = SteeringSubject::capture(&world, body).unwrap();
        let out = traverse.direct(&subject, Vec2::ZERO);
        assert_eq!(traverse.route().len(), 1);
        assert!(out.x > 0.99);

        world.set_location(body, Vec2::new(4.0, 2.95));
        let subject = SteeringSubject::capture(&world, body).unwrap();
        assert_eq!(traverse.direct(&subject, Vec2::X), Vec2::X);
        assert!(traverse.is_complete());
    }

    #[test]
    fn test_list_follows_one_route() {
        let (world, body) = world_with_body();
        let subject = SteeringSubject::capture(&world, body).unwrap();
        let traverse = |to: Vec2| TraverseRouteBehavior::new(1.0, Route::from_waypoints([to]), 0.4, 0.1);
        let mut list = SteeringBehaviorList::new();

        list.set_route(traverse(Vec2::new(3.0, 0.0)));
        list.set_route(traverse(Vec2::new(0.0, -3.0)));
        assert_eq!(list.len(), 1);
        assert!((list.combine(&subject) - Vec2::NEG_Y).length() < 1e-6);

        list.set_route(traverse(Vec2::new(0.05, 0.0)));
        assert_eq!(list.combine(&subject), Vec2::ZERO);
        assert!(list.route().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_traverse_generated_route() {
        let (world, body) = world_with_body();
        let route = AStarRouteFactory::new()
            .create(&DefaultRoutingRules::default(), &EffectMap::new(), Vec2::ZERO, Vec2::new(3.0, 0.0), 0.0)
            .unwrap()
            .reduce();
        let mut traverse = TraverseRouteBehavior::new(1.0, route, 0.5, 0.1);

        let subject = SteeringSubject::capture(&world, body).unwrap();
        assert!((traverse.direct(&subject, Vec2::ZERO) - Vec2::X).length() < 1e-6);
    }
}
