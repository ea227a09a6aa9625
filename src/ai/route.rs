//! Waypoint routes

use std::collections::VecDeque;

use glam::Vec2;

use crate::world::Direction;

/// An ordered sequence of waypoints; the front is the current target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    path: VecDeque<Vec2>,
}

impl Route {
    /// Create an empty route
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a route through the given waypoints
    #[must_use]
    pub fn from_waypoints(waypoints: impl IntoIterator<Item = Vec2>) -> Self {
        waypoints.into_iter().collect()
    }

    /// Drop intermediate waypoints that continue in a straight line
    ///
    /// A waypoint is kept where the grid direction of travel changes; the
    /// final waypoint is always kept. Repeated points are skipped without
    /// resetting the direction of travel.
    #[must_use]
    pub fn reduce(&self) -> Route {
        if self.path.len() < 2 {
            return self.clone();
        }

        let mut reduced = Route::new();
        let mut last_direction = Direction::Zero;

        for (i, &current) in self.path.iter().enumerate() {
            let Some(&next) = self.path.get(i + 1) else {
                reduced.add_waypoint(current);
                break;
            };

            let direction = Direction::from_vector(next - current);
            if direction != Direction::Zero {
                if direction != last_direction {
                    reduced.add_waypoint(current);
                }
                last_direction = direction;
            }
        }

        reduced
    }

    /// Keep at most the first `max_steps` waypoints
    pub fn truncate(&mut self, max_steps: usize) {
        self.path.truncate(max_steps);
    }

    /// Number of remaining waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Check if no waypoints remain
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// The waypoint currently being travelled to
    #[must_use]
    pub fn current_target(&self) -> Option<Vec2> {
        self.path.front().copied()
    }

    /// Discard the current target; returns whether another remains
    pub fn next_target(&mut self) -> bool {
        self.path.pop_front();
        !self.path.is_empty()
    }

    /// Whether a waypoint follows the current target
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.path.len() > 1
    }

    /// Waypoint `ahead` positions past the current target
    #[must_use]
    pub fn peek(&self, ahead: usize) -> Option<Vec2> {
        self.path.get(ahead).copied()
    }

    /// Append a waypoint
    pub fn add_waypoint(&mut self, waypoint: Vec2) {
        self.path.push_back(waypoint);
    }

    /// Append several waypoints in order
    pub fn add_waypoints(&mut self, waypoints: impl IntoIterator<Item = Vec2>) {
        self.path.extend(waypoints);
    }

    /// Iterate the remaining waypoints in order
    pub fn waypoints(&self) -> impl Iterator<Item = &Vec2> + '_ {
        self.path.iter()
    }
}

impl FromIterator<Vec2> for Route {
    fn from_iter<I: IntoIterator<Item = Vec2>>(iter: I) -> Self {
        Self {
            path: iter.into_iter().collect(),
        }
    }
}
