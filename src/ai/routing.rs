//! Movement policies consulted while expanding a route

use glam::IVec2;
use hecs::Entity;
use smallvec::SmallVec;

use super::search::NodeRef;
use crate::math::Rect;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::world::{Direction, RadialSearchFilter, RectangleSearchFilter, TileQuery};

/// Candidate directions out of a node
pub type Directions = SmallVec<[Direction; 8]>;

/// Decides which steps are legal from a search node
pub trait RoutingRules {
    /// Legal directions out of `node`
    ///
    /// `destination` is the tile being routed to, if any. An empty set means
    /// the node is a dead end.
    fn movements(
        &self,
        world: &dyn TileQuery,
        node: NodeRef<'_>,
        destination: Option<IVec2>,
    ) -> Directions;
}

impl<R: RoutingRules + ?Sized> RoutingRules for &R {
    fn movements(
        &self,
        world: &dyn TileQuery,
        node: NodeRef<'_>,
        destination: Option<IVec2>,
    ) -> Directions {
        (**self).movements(world, node, destination)
    }
}

impl<R: RoutingRules + ?Sized> RoutingRules for Box<R> {
    fn movements(
        &self,
        world: &dyn TileQuery,
        node: NodeRef<'_>,
        destination: Option<IVec2>,
    ) -> Directions {
        (**self).movements(world, node, destination)
    }
}

/// Steps onto traversable tiles, without cutting corners
#[derive(Debug, Clone)]
pub struct DefaultRoutingRules {
    allowed: Vec<Direction>,
}

impl DefaultRoutingRules {
    /// Rules permitting the given directions
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = Direction>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Horizontal and vertical steps only
    #[must_use]
    pub fn orthogonal() -> Self {
        Self::new(Direction::HV)
    }

    /// Directions these rules consider
    #[must_use]
    pub fn allowed(&self) -> &[Direction] {
        &self.allowed
    }
}

impl Default for DefaultRoutingRules {
    fn default() -> Self {
        Self::new(Direction::ALL)
    }
}

impl RoutingRules for DefaultRoutingRules {
    fn movements(
        &self,
        world: &dyn TileQuery,
        node: NodeRef<'_>,
        destination: Option<IVec2>,
    ) -> Directions {
        let traversable = |dir: Direction| {
            world
                .tile_effects(node.location_toward(dir))
                .is_traversable()
        };

        let mut directions = Directions::new();
        for &dir in &self.allowed {
            if traversable(dir) && !node.is_ineffective(dir) {
                if !dir.is_diagonal() || (traversable(dir.x_component()) && traversable(dir.y_component())) {
                    directions.push(dir);
                }
            } else if destination == Some(node.location_toward(dir)) {
                // The destination itself is unreachable from here
                return Directions::new();
            }
        }
        directions
    }
}

/// Filters another policy down to steps with room around them
#[derive(Debug, Clone)]
pub struct ClearanceRoutingRules<R> {
    inner: R,
    clearance: f32,
}

impl<R: RoutingRules> ClearanceRoutingRules<R> {
    /// Require every tile within `clearance` of a step to be traversable
    pub fn new(inner: R, clearance: f32) -> Self {
        Self { inner, clearance }
    }

    /// Required free radius
    pub fn clearance(&self) -> f32 {
        self.clearance
    }

    /// The wrapped policy
    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn has_clearance(&self, world: &dyn TileQuery, point: IVec2) -> bool {
        world
            .tile_effects_in(&RadialSearchFilter::new(point.as_vec2(), self.clearance))
            .iter()
            .all(|effects| effects.is_traversable())
    }
}

impl<R: RoutingRules> RoutingRules for ClearanceRoutingRules<R> {
    fn movements(
        &self,
        world: &dyn TileQuery,
        node: NodeRef<'_>,
        destination: Option<IVec2>,
    ) -> Directions {
        self.inner
            .movements(world, node, destination)
            .into_iter()
            .filter(|&dir| self.has_clearance(world, node.location_toward(dir)))
            .collect()
    }
}

/// Steps the footprint of a particular entity fits through
///
/// Tiles obstructed only by the subject itself count as free. The search
/// path is not consulted, so revisiting steps are left to the caller.
#[derive(Debug, Clone)]
pub struct EntityRoutingRules {
    subject: Entity,
    footprint: Rect,
    allowed: Vec<Direction>,
}

impl EntityRoutingRules {
    /// Rules for `subject`, whose bounds relative to its location are `footprint`
    #[must_use]
    pub fn new(subject: Entity, footprint: Rect, allowed: impl IntoIterator<Item = Direction>) -> Self {
        Self {
            subject,
            footprint,
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Rules capturing the current footprint of a body
    ///
    /// Returns `None` if the body no longer exists.
    pub fn for_body(
        subject: Entity,
        physics: &dyn PhysicsWorld,
        body: BodyHandle,
        allowed: impl IntoIterator<Item = Direction>,
    ) -> Option<Self> {
        let location = physics.location(body)?;
        let aabb = physics.aabb(body)?;
        Some(Self::new(subject, aabb.translate(-location), allowed))
    }

    /// The entity being routed
    #[must_use]
    pub fn subject(&self) -> Entity {
        self.subject
    }

    /// Bounds relative to the subject's location
    #[must_use]
    pub fn footprint(&self) -> Rect {
        self.footprint
    }

    fn has_clearance(&self, world: &dyn TileQuery, point: IVec2) -> bool {
        let area = self.footprint.translate(point.as_vec2());
        world
            .tile_effects_in(&RectangleSearchFilter::new(area))
            .iter()
            .all(|effects| effects.is_traversable_for(self.subject))
    }
}

impl RoutingRules for EntityRoutingRules {
    fn movements(
        &self,
        world: &dyn TileQuery,
        node: NodeRef<'_>,
        _destination: Option<IVec2>,
    ) -> Directions {
        let origin = node.location();
        let step = |dir: Direction| origin.saturating_add(dir.vector());

        self.allowed
            .iter()
            .copied()
            .filter(|&dir| self.has_clearance(world, step(dir)))
            .filter(|&dir| {
                !dir.is_diagonal()
                    || (self.has_clearance(world, step(dir.x_component()))
                        && self.has_clearance(world, step(dir.y_component())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;

    use super::*;
    use crate::ai::SearchTree;
    use crate::physics::{PhysicsBodyDescription, RapierWorld};
    use crate::world::EffectMap;

    fn entities(count: usize) -> Vec<Entity> {
        let mut world = hecs::World::new();
        (0..count).map(|_| world.spawn(())).collect()
    }

    fn sorted(mut dirs: Directions) -> Vec<Direction> {
        dirs.sort_by_key(|d| Direction::ALL.iter().position(|a| a == d));
        dirs.into_vec()
    }

    #[test]
    fn test_open_ground_allows_everything() {
        let map = EffectMap::new();
        let tree = SearchTree::new(IVec2::ZERO);

        let dirs = DefaultRoutingRules::default().movements(&map, tree.get(SearchTree::ROOT), None);
        assert_eq!(sorted(dirs), Direction::ALL.to_vec());

        let dirs = DefaultRoutingRules::orthogonal().movements(&map, tree.get(SearchTree::ROOT), None);
        assert_eq!(dirs.len(), 4);
    }

    #[test]
    fn test_blocked_tile_cuts_corners() {
        let wall = entities(1)[0];
        let mut map = EffectMap::new();
        map.obstruct(IVec2::new(1, 0), wall);
        let tree = SearchTree::new(IVec2::ZERO);

        let dirs = DefaultRoutingRules::default().movements(&map, tree.get(SearchTree::ROOT), None);
        assert_eq!(dirs.len(), 5);
        assert!(!dirs.contains(&Direction::XPlus));
        assert!(!dirs.contains(&Direction::XYPlus));
        assert!(!dirs.contains(&Direction::XYPlusMinus));
    }

    #[test]
    fn test_blocked_destination_is_dead_end() {
        let wall = entities(1)[0];
        let mut map = EffectMap::new();
        map.obstruct(IVec2::new(0, 1), wall);
        let tree = SearchTree::new(IVec2::ZERO);

        let rules = DefaultRoutingRules::default();
        assert!(rules.movements(&map, tree.get(SearchTree::ROOT), Some(IVec2::new(0, 1))).is_empty());
        assert!(!rules.movements(&map, tree.get(SearchTree::ROOT), Some(IVec2::new(5, 1))).is_empty());
    }

    #[test]
    fn test_ineffective_steps_excluded() {
        let map = EffectMap::new();
        let mut tree = SearchTree::new(IVec2::ZERO);
        let next = tree.add_node(SearchTree::ROOT, Direction::XPlus);

        let dirs = DefaultRoutingRules::orthogonal().movements(&map, tree.get(next), None);
        assert!(!dirs.contains(&Direction::XMinus));
        assert_eq!(dirs.len(), 3);
    }

    #[test]
    fn test_zero_clearance_matches_inner() {
        let walls = entities(3);
        let mut map = EffectMap::new();
        map.obstruct(IVec2::new(1, 1), walls[0]);
        map.obstruct(IVec2::new(-1, 0), walls[1]);
        map.obstruct(IVec2::new(3, -2), walls[2]);
        let tree = SearchTree::new(IVec2::ZERO);
        let node = tree.get(SearchTree::ROOT);

        let inner = DefaultRoutingRules::default();
        let clearance = ClearanceRoutingRules::new(inner.clone(), 0.0);

        assert_eq!(
            clearance.movements(&map, node, None),
            inner.movements(&map, node, None)
        );
    }

    #[test]
    fn test_clearance_keeps_distance() {
        let wall = entities(1)[0];
        let mut map = EffectMap::new();
        map.obstruct(IVec2::new(2, 0), wall);
        let tree = SearchTree::new(IVec2::ZERO);

        let rules = ClearanceRoutingRules::new(DefaultRoutingRules::orthogonal(), 1.0);
        let dirs = rules.movements(&map, tree.get(SearchTree::ROOT), None);

        assert!(!dirs.contains(&Direction::XPlus));
        assert_eq!(dirs.len(), 3);
    }

    #[test]
    fn test_entity_ignores_own_obstruction() {
        let ids = entities(2);
        let (subject, other) = (ids[0], ids[1]);
        let mut map = EffectMap::new();
        map.obstruct(IVec2::new(1, 0), subject);
        map.obstruct(IVec2::new(0, 1), other);
        let tree = SearchTree::new(IVec2::ZERO);

        let rules = EntityRoutingRules::new(subject, Rect::from_center(Vec2::ZERO, Vec2::ONE), Direction::HV);
        let dirs = rules.movements(&map, tree.get(SearchTree::ROOT), None);

        assert!(dirs.contains(&Direction::XPlus));
        assert!(!dirs.contains(&Direction::YPlus));
    }

    #[test]
    fn test_entity_wide_footprint() {
        let ids = entities(2);
        let (subject, wall) = (ids[0], ids[1]);
        let mut map = EffectMap::new();
        map.obstruct(IVec2::new(2, 1), wall);
        let mut tree = SearchTree::new(IVec2::ZERO);

        // Spans the step tile and the one above it
        let footprint = Rect::new(-0.5, -0.5, 1.0, 2.0);
        let rules = EntityRoutingRules::new(subject, footprint, Direction::ALL);
        let dirs = rules.movements(&map, tree.get(SearchTree::ROOT), None);
        assert!(dirs.contains(&Direction::XPlus));

        let next = tree.add_node(SearchTree::ROOT, Direction::XPlus);
        let dirs = rules.movements(&map, tree.get(next), None);
        assert!(!dirs.contains(&Direction::XPlus));
        assert!(!dirs.contains(&Direction::XYPlus));
        assert!(!dirs.contains(&Direction::XYPlusMinus));
    }

    #[test]
    fn test_entity_rules_for_body() {
        let subject = entities(1)[0];
        let mut physics = RapierWorld::new(1.0);
        let body = physics.create_body(&PhysicsBodyDescription::dynamic(Rect::new(-0.4, -0.4, 0.8, 0.8)));
        physics.set_location(body, Vec2::new(3.0, 3.0));
        physics.step(Duration::from_millis(40));

        let rules = EntityRoutingRules::for_body(subject, &physics, body, Direction::ALL).unwrap();
        assert_eq!(rules.subject(), subject);
        assert!((rules.footprint().min() - Vec2::splat(-0.4)).length() < 1e-4);
    }
}
