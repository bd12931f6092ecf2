//! Match tuning
//!
//! Every field has a default, so a settings file only needs the overrides.

use std::path::Path;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::SolverConfig;

/// Runtime tuning for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchSettings {
    // === Physics ===
    /// World gravity (physics units/s²)
    pub gravity: Vec2,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Bounciness of the ball against everything
    pub ball_restitution: f32,
    /// Paddle tracking limits
    pub paddle_max_speed: f32,
    pub paddle_max_spin: f32,

    // === Rules ===
    /// Time the server gets before play starts on its own
    pub serve_timeout_ms: u64,
    /// Pause after a point before the next serve
    pub linger_ms: u64,
    /// Ball velocity applied when play begins
    pub serve_velocity: Vec2,

    /// Seed for choosing the first server (random when absent)
    pub seed: Option<u64>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            velocity_iterations: VELOCITY_ITERATIONS,
            position_iterations: POSITION_ITERATIONS,
            ball_restitution: BALL_RESTITUTION,
            paddle_max_speed: PADDLE_MAX_SPEED,
            paddle_max_spin: PADDLE_MAX_SPIN,

            serve_timeout_ms: SERVE_TIMEOUT_MS,
            linger_ms: LINGER_MS,
            serve_velocity: SERVE_VELOCITY,

            seed: None,
        }
    }
}

impl MatchSettings {
    /// Defaults with a fixed seed (reproducible first server)
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn solver(&self) -> SolverConfig {
        SolverConfig {
            velocity_iterations: self.velocity_iterations,
            position_iterations: self.position_iterations,
        }
    }

    pub fn serve_timeout(&self) -> Duration {
        Duration::from_millis(self.serve_timeout_ms)
    }

    pub fn linger(&self) -> Duration {
        Duration::from_millis(self.linger_ms)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        if !settings.gravity.is_finite() || !settings.serve_velocity.is_finite() {
            return Err(ConfigError::Invalid("gravity and serve velocity must be finite".to_string()));
        }
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded match settings from {}", path.as_ref().display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_rules() {
        let settings = MatchSettings::default();
        assert_eq!(settings.serve_timeout(), Duration::from_millis(5000));
        assert_eq!(settings.linger(), Duration::from_millis(2000));
        assert_eq!(settings.serve_velocity, Vec2::new(0.0, -5.0));
        assert_eq!(settings.solver().velocity_iterations, 8);
        assert_eq!(settings.solver().position_iterations, 6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = MatchSettings::from_json(r#"{ "lingerMs": 500, "seed": 7 }"#).unwrap();
        assert_eq!(settings.linger_ms, 500);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.serve_timeout_ms, SERVE_TIMEOUT_MS);
        assert_eq!(settings.gravity, GRAVITY);
    }
}
