//! World and navigation configuration
//!
//! Configs are plain serde structs. Every field has a default, so a RON or
//! JSON file only needs to name the values it overrides:
//!
//! ```ignore
//! let config = WorldConfig::from_ron_str("(physics_scale: 0.5, navigation: (max_path_iterations: 300))")?;
//! ```

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or saving a config
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The RON document was malformed
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The JSON document was malformed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The config could not be written as RON
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Pathfinding and steering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Node expansions before A* gives up
    pub max_path_iterations: usize,
    /// Chance a random walk keeps its previous heading
    pub pathing_consistency: f64,
    /// Distance at which an intermediate waypoint counts as reached
    pub waypoint_tolerance: f32,
    /// Distance at which the final waypoint counts as reached
    pub arrival_tolerance: f32,
    /// Speed steering drivers accelerate bodies towards
    pub max_steer_velocity: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_path_iterations: 150,
            pathing_consistency: 0.7,
            waypoint_tolerance: 0.4,
            arrival_tolerance: 0.1,
            max_steer_velocity: 2.0,
        }
    }
}

impl NavigationConfig {
    /// Set the A* expansion cap
    #[must_use]
    pub fn with_max_path_iterations(mut self, iterations: usize) -> Self {
        self.max_path_iterations = iterations;
        self
    }

    /// Set the random walk heading consistency, clamped to `[0, 1]`
    #[must_use]
    pub fn with_pathing_consistency(mut self, consistency: f64) -> Self {
        self.pathing_consistency = consistency.clamp(0.0, 1.0);
        self
    }

    /// Set waypoint and arrival tolerances
    #[must_use]
    pub fn with_tolerances(mut self, waypoint: f32, arrival: f32) -> Self {
        self.waypoint_tolerance = waypoint;
        self.arrival_tolerance = arrival;
        self
    }

    /// Set the steering speed limit
    #[must_use]
    pub fn with_max_steer_velocity(mut self, velocity: f32) -> Self {
        self.max_steer_velocity = velocity;
        self
    }
}

/// Top level world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Physics engine units per world unit
    pub physics_scale: f32,
    /// Largest friction force the ground exerts on a body
    pub max_friction_force: f32,
    /// Fixed physics steps per second
    pub step_rate: f32,
    /// World gravity; top-down worlds leave this at zero
    pub gravity: Vec2,
    /// Pathfinding and steering parameters
    pub navigation: NavigationConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            physics_scale: 1.0,
            max_friction_force: 1.0,
            step_rate: 30.0,
            gravity: Vec2::ZERO,
            navigation: NavigationConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Set the physics scale
    #[must_use]
    pub fn with_physics_scale(mut self, scale: f32) -> Self {
        self.physics_scale = scale;
        self
    }

    /// Set the ground friction limit
    #[must_use]
    pub fn with_max_friction_force(mut self, force: f32) -> Self {
        self.max_friction_force = force;
        self
    }

    /// Set the fixed step rate in Hz
    #[must_use]
    pub fn with_step_rate(mut self, rate: f32) -> Self {
        self.step_rate = rate;
        self
    }

    /// Set gravity
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Replace the navigation parameters
    #[must_use]
    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = navigation;
        self
    }

    /// Whether physics runs in a different unit space than the world
    #[must_use]
    pub fn is_scaled(&self) -> bool {
        (self.physics_scale - 1.0).abs() > f32::EPSILON
    }

    /// Parse a config from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid RON for this type
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
