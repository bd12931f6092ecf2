//! Volley Core - authoritative match logic for a two-player physics ball game
//!
//! Core modules:
//! - `sim`: Physics adapter, contact interpretation, mode state machine, match controller
//! - `game_def`: Arena geometry supplied by the game definition
//! - `settings`: Runtime tuning (gravity, solver, timeouts)
//! - `error`: Error taxonomy

pub mod error;
pub mod game_def;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, MatchError, PhysicsError};
pub use game_def::{GameDefinition, Zone};
pub use settings::MatchSettings;
pub use sim::{Match, Mode, ModeKind, Snapshot};

use serde::{Deserialize, Serialize};

/// Match configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed frame timestep used by the headless driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// World gravity (physics units/s², y grows downward)
    pub const GRAVITY: Vec2 = Vec2::new(0.0, 10.0);
    /// Solver passes per step
    pub const VELOCITY_ITERATIONS: u32 = 8;
    pub const POSITION_ITERATIONS: u32 = 6;

    /// Serving player has this long to double-touch before play starts anyway
    pub const SERVE_TIMEOUT_MS: u64 = 5000;
    /// Pause after a point before the next serve
    pub const LINGER_MS: u64 = 2000;
    /// Ball velocity applied when play begins
    pub const SERVE_VELOCITY: Vec2 = Vec2::new(0.0, -5.0);

    /// Horizontal paddle offset from its zone center on reset (logical units)
    pub const PADDLE_RESET_OFFSET: f32 = 50.0;
    /// Paddle tilt on reset (radians, mirrored for player two)
    pub const PADDLE_RESET_ANGLE: f32 = std::f32::consts::FRAC_PI_4;
    /// Ball is placed this far left of the above-net zone center on reset
    pub const BALL_RESET_OFFSET: f32 = 20.0;

    /// Ball defaults
    pub const DEFAULT_BALL_RADIUS: f32 = 15.0;
    pub const BALL_RESTITUTION: f32 = 0.8;
    pub const BALL_MASS: f32 = 1.0;

    /// Paddle tracking speed limits (physics units/s, radians/s)
    pub const PADDLE_MAX_SPEED: f32 = 30.0;
    pub const PADDLE_MAX_SPIN: f32 = 12.0;

    /// Thickness of floor, walls and ceiling (logical units)
    pub const WALL_THICKNESS: f32 = 20.0;
}

/// One of the two players; doubles as the control index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    /// Index into score and paddle arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// Map a control index (0 or 1) to a player
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Player::One),
            1 => Some(Player::Two),
            _ => None,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_player_index_roundtrip() {
        for player in Player::ALL {
            assert_eq!(Player::from_index(player.index()), Some(player));
        }
        assert_eq!(Player::from_index(2), None);
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(1.5 * PI) - (-PI / 2.0)).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) - (-PI / 2.0)).abs() < 1e-6);
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
    }
}
