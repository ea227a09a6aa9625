//! Core configuration and timing
//!
//! Contains the world configuration and the fixed-step clock

mod config;
mod time;

pub use config::{ConfigError, NavigationConfig, WorldConfig};
pub use time::StepClock;
