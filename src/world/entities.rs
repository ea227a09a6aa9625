//! The simulation world: entities, tile effects and physics

use std::time::Duration;

use glam::{IVec2, Vec2};
use hecs::Entity;
use thiserror::Error;

use super::components::{PhysicsBody, Steering};
use super::direction::Direction;
use super::effects::{EffectMap, TileEffects, TileQuery};
use super::search::SearchFilter;
use crate::ai::{
    AStarRouteFactory, EntityRoutingRules, Route, RouteError, RouteFactory, SteeringDriver,
    TraverseRouteBehavior,
};
use crate::core::WorldConfig;
use crate::math::Rect;
use crate::physics::{BodyHandle, PhysicsBodyDescription, PhysicsWorld, RapierWorld, ScaledPhysicsWorld};

/// Errors from entity-level world operations
#[derive(Debug, Error)]
pub enum WorldError {
    /// The entity does not exist
    #[error(transparent)]
    NoSuchEntity(#[from] hecs::NoSuchEntity),
    /// The entity has no live physics body
    #[error("entity {0:?} has no physics body")]
    NoBody(Entity),
    /// The entity has no steering driver
    #[error("entity {0:?} has no steering driver")]
    NoSteering(Entity),
    /// Route planning did not reach the destination
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Game world containing entities, tile effects and the physics simulation
pub struct World {
    entities: hecs::World,
    effects: EffectMap,
    physics: Box<dyn PhysicsWorld>,
    route_factory: AStarRouteFactory,
    config: WorldConfig,
}

impl World {
    /// Create an empty world backed by rapier
    ///
    /// The engine is wrapped in a [`ScaledPhysicsWorld`] unless the config
    /// uses a unit physics scale.
    pub fn new(config: WorldConfig) -> Self {
        let rapier = RapierWorld::from_config(&config);
        let physics: Box<dyn PhysicsWorld> = if config.is_scaled() {
            Box::new(ScaledPhysicsWorld::new(rapier, config.physics_scale))
        } else {
            Box::new(rapier)
        };
        Self::with_physics(config, physics)
    }

    /// Create an empty world on top of an existing physics world
    pub fn with_physics(config: WorldConfig, physics: Box<dyn PhysicsWorld>) -> Self {
        Self {
            entities: hecs::World::new(),
            effects: EffectMap::new(),
            physics,
            route_factory: AStarRouteFactory::from_config(&config.navigation),
            config,
        }
    }

    /// The configuration this world was built with
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The underlying hecs world
    pub fn entities(&self) -> &hecs::World {
        &self.entities
    }

    /// The underlying hecs world, mutably
    pub fn entities_mut(&mut self) -> &mut hecs::World {
        &mut self.entities
    }

    /// Tile effects currently applied
    pub fn effects(&self) -> &EffectMap {
        &self.effects
    }

    /// Tile effects, mutably
    pub fn effects_mut(&mut self) -> &mut EffectMap {
        &mut self.effects
    }

    /// The physics world
    pub fn physics(&self) -> &dyn PhysicsWorld {
        self.physics.as_ref()
    }

    /// The physics world, mutably
    pub fn physics_mut(&mut self) -> &mut dyn PhysicsWorld {
        self.physics.as_mut()
    }

    /// Route factory used by [`World::plan_route`]
    pub fn route_factory(&self) -> &AStarRouteFactory {
        &self.route_factory
    }

    /// Number of entities
    pub fn len(&self) -> u32 {
        self.entities.len()
    }

    /// Check if the world has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Spawn an entity with a body described by `description`, placed at `location`
    pub fn spawn_body(&mut self, description: &PhysicsBodyDescription, location: Vec2) -> Entity {
        let body = self.physics.create_body(description);
        self.physics.set_location(body, location);
        self.entities.spawn((PhysicsBody(body),))
    }

    /// Spawn a static one-tile obstacle that blocks `tile`
    pub fn spawn_obstacle(&mut self, tile: IVec2) -> Entity {
        let description = PhysicsBodyDescription::fixed(Rect::new(-0.5, -0.5, 1.0, 1.0));
        let entity = self.spawn_body(&description, tile.as_vec2());
        self.effects.obstruct(tile, entity);
        entity
    }

    /// Mark `tile` as obstructed by `entity`
    pub fn obstruct(&mut self, tile: IVec2, entity: Entity) {
        self.effects.obstruct(tile, entity);
    }

    /// Despawn an entity, removing its body and every obstruction it caused
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        if let Some(body) = self.body(entity) {
            self.physics.remove_body(body);
        }
        self.effects.remove_obstructions(entity);
        self.entities.despawn(entity)
    }

    /// Physics body of an entity
    pub fn body(&self, entity: Entity) -> Option<BodyHandle> {
        self.entities
            .get::<&PhysicsBody>(entity)
            .ok()
            .map(|body| body.0)
    }

    /// Location of an entity's body
    pub fn location(&self, entity: Entity) -> Option<Vec2> {
        self.physics.location(self.body(entity)?)
    }

    /// Give an entity a steering driver, attached to its body if it has one
    pub fn attach_steering(
        &mut self,
        entity: Entity,
        driver: impl SteeringDriver + 'static,
    ) -> Result<(), hecs::NoSuchEntity> {
        let mut steering = Steering::new(driver);
        if let Some(body) = self.body(entity) {
            steering.driver_mut().attach(body);
        }
        self.entities.insert_one(entity, steering)
    }

    /// Get an entity's steering component
    pub fn steering_mut(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, Steering>, hecs::ComponentError> {
        self.entities.get::<&mut Steering>(entity)
    }

    /// Plan a reduced route for an entity's body to `destination`
    ///
    /// The entity's own obstructions are ignored and its footprint must fit
    /// along the whole route.
    pub fn plan_route(&self, entity: Entity, destination: Vec2) -> Result<Route, WorldError> {
        if !self.entities.contains(entity) {
            return Err(hecs::NoSuchEntity.into());
        }
        let body = self.body(entity).ok_or(WorldError::NoBody(entity))?;
        let start = self.physics.location(body).ok_or(WorldError::NoBody(entity))?;
        let rules = EntityRoutingRules::for_body(entity, self.physics(), body, Direction::ALL)
            .ok_or(WorldError::NoBody(entity))?;

        let route = self.route_factory.create(
            &rules,
            &self.effects,
            start,
            destination,
            self.config.navigation.arrival_tolerance,
        )?;
        Ok(route.reduce())
    }

    /// Make an entity's steering driver follow `route`
    ///
    /// Replaces any route the driver is still following.
    pub fn follow_route(&mut self, entity: Entity, route: Route) -> Result<(), WorldError> {
        let navigation = &self.config.navigation;
        let behavior = TraverseRouteBehavior::new(
            1.0,
            route,
            navigation.waypoint_tolerance,
            navigation.arrival_tolerance,
        );
        let mut steering = self
            .entities
            .get::<&mut Steering>(entity)
            .map_err(|_| WorldError::NoSteering(entity))?;
        steering.driver_mut().behaviors_mut().set_route(behavior);
        Ok(())
    }

    /// Advance physics by `delta`, then tick every steering driver
    pub fn update(&mut self, delta: Duration) {
        self.physics.step(delta);
        for (_, steering) in self.entities.query_mut::<&mut Steering>() {
            steering.driver_mut().update(self.physics.as_mut(), delta);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl TileQuery for World {
    fn tile_effects(&self, tile: IVec2) -> TileEffects {
        self.effects.tile_effects(tile)
    }

    fn tile_effects_in(&self, filter: &dyn SearchFilter) -> Vec<TileEffects> {
        self.effects.tile_effects_in(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{DirectionBehavior, SteeringBehaviorList, VelocityLimitSteeringDriver};

    const TICK: Duration = Duration::from_millis(40);

    fn mover() -> PhysicsBodyDescription {
        PhysicsBodyDescription::dynamic(Rect::new(-0.4, -0.4, 0.8, 0.8))
    }

    #[test]
    fn test_obstacle_blocks_tile_until_despawned() {
        let mut world = World::default();
        let tile = IVec2::new(3, -2);
        let obstacle = world.spawn_obstacle(tile);
        let body = world.body(obstacle).unwrap();

        assert!(!world.tile_effects(tile).is_traversable());
        assert!(world.physics().is_static(body));
        assert_eq!(world.location(obstacle), Some(Vec2::new(3.0, -2.0)));

        world.despawn(obstacle).unwrap();
        assert!(world.tile_effects(tile).is_traversable());
        assert!(!world.physics().contains(body));
        assert!(world.is_empty());
        assert!(world.despawn(obstacle).is_err());
    }

    #[test]
    fn test_scaled_world_reports_world_units() {
        let mut world = World::new(WorldConfig::default().with_physics_scale(0.5));
        let entity = world.spawn_body(&mover(), Vec2::new(2.0, 1.0));
        world.update(TICK);

        let body = world.body(entity).unwrap();
        let aabb = world.physics().aabb(body).unwrap();
        assert!((aabb.size() - Vec2::splat(0.8)).length() < 1e-4);
        assert!((aabb.center() - Vec2::new(2.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_update_ticks_steering() {
        let mut world = World::default();
        let entity = world.spawn_body(&mover(), Vec2::ZERO);
        let driver = VelocityLimitSteeringDriver::new(2.0).with_behaviors(
            SteeringBehaviorList::new().with(DirectionBehavior::new(Direction::XPlus)),
        );
        world.attach_steering(entity, driver).unwrap();
        assert!(world.steering_mut(entity).unwrap().driver().is_attached());

        for _ in 0..10 {
            world.update(TICK);
        }

        let location = world.location(entity).unwrap();
        assert!(location.x > 0.0);
        assert!(location.y.abs() < 1e-4);
        let body = world.body(entity).unwrap();
        assert_eq!(world.physics().direction(body), Some(Direction::XPlus));
    }

    #[test]
    fn test_plan_route_avoids_obstacles() {
        let mut world = World::default();
        for y in -1..=1 {
            world.spawn_obstacle(IVec2::new(2, y));
        }
        let entity = world.spawn_body(&mover(), Vec2::ZERO);
        world.update(TICK);

        let route = world.plan_route(entity, Vec2::new(4.0, 0.0)).unwrap();
        let waypoints: Vec<_> = route.waypoints().copied().collect();
        assert_eq!(waypoints.last(), Some(&Vec2::new(4.0, 0.0)));
        for waypoint in &waypoints {
            let tile = waypoint.round().as_ivec2();
            assert!(world.tile_effects(tile).is_traversable());
        }
    }

    #[test]
    fn test_plan_route_requires_body() {
        let mut world = World::default();
        let entity = world.entities_mut().spawn(());

        assert!(matches!(
            world.plan_route(entity, Vec2::ONE),
            Err(WorldError::NoBody(_))
        ));
        assert!(matches!(
            world.follow_route(entity, Route::new()),
            Err(WorldError::NoSteering(_))
        ));
    }

    #[test]
    fn test_new_route_replaces_previous() {
        let mut world = World::default();
        let entity = world.spawn_body(&mover(), Vec2::ZERO);
        world.update(TICK);
        world
            .attach_steering(entity, VelocityLimitSteeringDriver::new(2.0))
            .unwrap();

        let first = world.plan_route(entity, Vec2::new(3.0, 0.0)).unwrap();
        world.follow_route(entity, first).unwrap();
        for _ in 0..5 {
            world.update(TICK);
        }

        let destination = Vec2::new(0.0, 3.0);
        let second = world.plan_route(entity, destination).unwrap();
        world.follow_route(entity, second).unwrap();
        {
            let mut steering = world.steering_mut(entity).unwrap();
            let behaviors = steering.driver_mut().behaviors_mut();
            assert_eq!(behaviors.len(), 1);
            let route = behaviors.route().unwrap().route();
            assert_eq!(route.peek(route.len() - 1), Some(destination));
        }

        for _ in 0..300 {
            world.update(TICK);
        }

        let location = world.location(entity).unwrap();
        assert!(location.distance(destination) < 1.0);
        assert!(location.distance(Vec2::new(3.0, 0.0)) > 2.0);
        assert!(world.steering_mut(entity).unwrap().driver_mut().behaviors_mut().is_empty());
    }

    #[test]
    fn test_follow_route_reaches_destination() {
        let mut world = World::default();
        let entity = world.spawn_body(&mover(), Vec2::ZERO);
        world.update(TICK);
        world
            .attach_steering(entity, VelocityLimitSteeringDriver::new(2.0))
            .unwrap();

        let destination = Vec2::new(3.0, 0.0);
        let route = world.plan_route(entity, destination).unwrap();
        world.follow_route(entity, route).unwrap();

        for _ in 0..300 {
            world.update(TICK);
        }

        // the route completes on arrival, after which the driver brakes
        let location = world.location(entity).unwrap();
        assert!(location.x > 2.8);
        assert!(location.distance(destination) < 1.0);
    }
}
