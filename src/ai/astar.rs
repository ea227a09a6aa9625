//! A* route construction and random walks over the tile grid

use glam::{IVec2, Vec2};
use rand::Rng;
use thiserror::Error;

use super::route::Route;
use super::routing::RoutingRules;
use super::search::{NodeId, SearchTree};
use crate::core::NavigationConfig;
use crate::world::{Direction, TileQuery};

/// Why a route could not be completed
#[derive(Debug, Clone, Error)]
pub enum RouteError {
    /// The destination was not reached; `partial` is the closest attempt
    #[error("route incomplete, best attempt has {} waypoints", partial.len())]
    Incomplete {
        /// Best partial route, without the start point
        partial: Route,
    },
}

impl RouteError {
    /// The best partial route
    #[must_use]
    pub fn partial(&self) -> &Route {
        match self {
            Self::Incomplete { partial } => partial,
        }
    }

    /// Take the best partial route
    #[must_use]
    pub fn into_partial(self) -> Route {
        match self {
            Self::Incomplete { partial } => partial,
        }
    }
}

/// Something that builds routes through a tile world
pub trait RouteFactory {
    /// Route from `start` to within `arrival_tolerance` tiles of `end`
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Incomplete`] when the destination cannot be reached.
    fn create(
        &self,
        rules: &dyn RoutingRules,
        world: &dyn TileQuery,
        start: Vec2,
        end: Vec2,
        arrival_tolerance: f32,
    ) -> Result<Route, RouteError>;

    /// Wander up to `length` waypoints from `start`
    fn create_random_walk(
        &self,
        rules: &dyn RoutingRules,
        world: &dyn TileQuery,
        start: Vec2,
        length: usize,
    ) -> Route;
}

/// Bounded A* search over routing rules
#[derive(Debug, Clone)]
pub struct AStarRouteFactory {
    max_iterations: usize,
    pathing_consistency: f64,
}

impl AStarRouteFactory {
    /// Default expansion cap
    pub const MAX_PATH_ITERATIONS: usize = 150;

    /// Default chance a random walk keeps its heading
    pub const PATHING_CONSISTENCY: f64 = 0.7;

    /// Create a factory with default limits
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_iterations: Self::MAX_PATH_ITERATIONS,
            pathing_consistency: Self::PATHING_CONSISTENCY,
        }
    }

    /// Create a factory from navigation settings
    #[must_use]
    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new()
            .with_max_iterations(config.max_path_iterations)
            .with_pathing_consistency(config.pathing_consistency)
    }

    /// Set the expansion cap
    #[must_use]
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the random walk heading consistency, clamped to `[0, 1]`
    #[must_use]
    pub fn with_pathing_consistency(mut self, consistency: f64) -> Self {
        self.pathing_consistency = consistency.clamp(0.0, 1.0);
        self
    }

    /// Expansion cap
    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Random walk using a caller-supplied generator
    pub fn create_random_walk_with<R: Rng + ?Sized>(
        &self,
        rules: &dyn RoutingRules,
        world: &dyn TileQuery,
        start: Vec2,
        length: usize,
        rng: &mut R,
    ) -> Route {
        let mut tree = SearchTree::new(start.round().as_ivec2());
        let mut head = SearchTree::ROOT;
        let mut last_direction = Direction::Zero;

        while tree.depth(head) < length {
            for dir in rules.movements(world, tree.get(head), None) {
                if !tree.is_ineffective(head, dir) {
                    tree.add_node(head, dir);
                }
            }

            let children = tree.children(head);
            if children.is_empty() {
                break;
            }

            let consistent = match last_direction {
                Direction::Zero => None,
                dir => tree.child(head, dir),
            };
            head = match consistent {
                Some(node) if rng.gen_bool(self.pathing_consistency) => node,
                _ => children[rng.gen_range(0..children.len())],
            };
            last_direction = tree.direction(head);
        }

        tree.route(head)
    }
}

impl Default for AStarRouteFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the first open node with the lowest cost
fn cheapest(tree: &SearchTree, open: &[NodeId], target: IVec2) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (index, &node) in open.iter().enumerate() {
        let cost = tree.cost(node, target);
        if best.is_none_or(|(_, lowest)| cost < lowest) {
            best = Some((index, cost));
        }
    }
    best.map(|(index, _)| index)
}

impl RouteFactory for AStarRouteFactory {
    fn create(
        &self,
        rules: &dyn RoutingRules,
        world: &dyn TileQuery,
        start: Vec2,
        end: Vec2,
        arrival_tolerance: f32,
    ) -> Result<Route, RouteError> {
        let end_tile = end.round().as_ivec2();

        if arrival_tolerance <= 0.0 && !world.tile_effects(end_tile).is_traversable() {
            log::debug!("Destination {end_tile} is obstructed, not searching");
            return Err(RouteError::Incomplete {
                partial: Route::new(),
            });
        }

        let mut tree = SearchTree::new(start.round().as_ivec2());
        let mut open = vec![SearchTree::ROOT];
        let mut closed: Vec<NodeId> = Vec::new();
        let mut best = None;

        for _ in 0..self.max_iterations {
            let Some(index) = cheapest(&tree, &open, end_tile) else {
                break;
            };
            let current = open[index];
            best = Some(current);

            let remaining = end_tile.as_i64vec2() - tree.location(current).as_i64vec2();
            if remaining.as_dvec2().length() <= f64::from(arrival_tolerance) {
                let mut waypoints: Vec<Vec2> = tree.route(current).waypoints().copied().collect();
                if let Some(first) = waypoints.first_mut() {
                    *first = start;
                }
                if let Some(last) = waypoints.last_mut() {
                    *last = end;
                }
                return Ok(waypoints.into_iter().collect());
            }

            open.remove(index);
            closed.push(current);

            for dir in rules.movements(world, tree.get(current), Some(end_tile)) {
                if tree.is_ineffective(current, dir) {
                    continue;
                }

                let step = tree.add_node(current, dir);
                let location = tree.location(step);
                let known = open
                    .iter()
                    .chain(&closed)
                    .any(|&node| tree.location(node) == location);
                if !known {
                    open.push(step);
                }
            }
        }

        let partial = match best {
            Some(node) => {
                let mut route = tree.route(node);
                route.next_target();
                route
            }
            None => Route::new(),
        };
        log::debug!(
            "No route to {end_tile} within {} expansions, best attempt has {} waypoints",
            self.max_iterations,
            partial.len()
        );
        Err(RouteError::Incomplete { partial })
    }

    fn create_random_walk(
        &self,
        rules: &dyn RoutingRules,
        world: &dyn TileQuery,
        start: Vec2,
        length: usize,
    ) -> Route {
        self.create_random_walk_with(rules, world, start, length, &mut rand::thread_rng())
    }
}
