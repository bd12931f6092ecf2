//! Error taxonomy
//!
//! None of these escape `Match::step` except `PhysicsError`, which is fatal
//! to the frame. Match anomalies are logged and recorded instead.

use glam::Vec2;
use thiserror::Error;

use crate::Player;
use crate::sim::{BodyHandle, ModeKind};

/// Match-level anomalies (non-fatal)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    /// A point was reported while the ball was not in play
    #[error("point for {scorer:?} reported while mode is {mode:?}; points only count in play")]
    InvalidStateTransition { scorer: Player, mode: ModeKind },
    /// A floor contact landed outside both player zones
    #[error("floor contact at ({}, {}) is outside both player zones", .position.x, .position.y)]
    AmbiguousCollisionZone { position: Vec2 },
}

/// Failures of the physics collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("invalid timestep: {0}")]
    InvalidTimestep(f32),
    #[error("body {body:?} reached a non-finite state")]
    Diverged { body: BodyHandle },
}

/// Loading or validating a game definition / settings file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
