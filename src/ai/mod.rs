//! Navigation module
//!
//! Provides A* route planning over the tile grid, routing rules that decide
//! which moves are legal, and steering behaviors that drive physics bodies
//! along the result.

mod astar;
mod driver;
mod route;
mod routing;
mod search;
mod steering;

pub use astar::{AStarRouteFactory, RouteError, RouteFactory};
pub use driver::{SteeringDriver, VelocityLimitSteeringDriver};
pub use route::Route;
pub use routing::{
    ClearanceRoutingRules, DefaultRoutingRules, Directions, EntityRoutingRules, RoutingRules,
};
pub use search::{DIAGONAL_COST, NodeId, NodeRef, ORTHOGONAL_COST, SearchNode, SearchTree};
pub use steering::{
    AvoidanceBehavior, DirectionBehavior, FleeBehavior, SeekBehavior, SteeringBehavior,
    SteeringBehaviorList, SteeringSubject, TraverseRouteBehavior,
};
