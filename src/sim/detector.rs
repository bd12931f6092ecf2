//! Floor contacts to scoring decisions
//!
//! The ball position is copied inside the contact notification, while the
//! physics step is still running. By the time the step returns the solver
//! may have bounced the ball out of the zone it landed in.

use glam::Vec2;

use super::mode::ModeKind;
use super::world::{BodyHandle, BodyView, Contact, ContactHandler};
use crate::Player;
use crate::error::MatchError;
use crate::game_def::GameDefinition;

/// Where the ball was when something touched the floor (physics units)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorContact {
    pub ball_position: Vec2,
}

/// Side that wins the point when the ball lands at `position` (logical units).
///
/// Landing in a player's zone loses them the point.
pub fn classify(position: Vec2, def: &GameDefinition) -> Result<Player, MatchError> {
    if def.player_one.contains(position) {
        Ok(Player::Two)
    } else if def.player_two.contains(position) {
        Ok(Player::One)
    } else {
        Err(MatchError::AmbiguousCollisionZone { position })
    }
}

/// Collects floor contacts during a step
#[derive(Debug, Clone)]
pub struct CollisionEventDetector {
    ball: BodyHandle,
    pending: Vec<FloorContact>,
}

impl CollisionEventDetector {
    pub fn new(ball: BodyHandle) -> Self {
        Self {
            ball,
            pending: Vec::new(),
        }
    }

    /// Floor contacts seen since the last drain, in the order they happened
    pub fn drain(&mut self) -> Vec<FloorContact> {
        std::mem::take(&mut self.pending)
    }

    /// Decide what a floor contact means in `mode`.
    ///
    /// `None` when the ball is not in play (a resting ball during a serve
    /// or a bounce while lingering); otherwise the scorer, or an anomaly if
    /// the ball landed in neither zone.
    pub fn interpret(
        &self,
        contact: &FloorContact,
        mode: ModeKind,
        def: &GameDefinition,
    ) -> Option<Result<Player, MatchError>> {
        if mode != ModeKind::InPlay {
            log::debug!("Ignoring floor contact while {mode:?}");
            return None;
        }
        Some(classify(def.to_logical(contact.ball_position), def))
    }
}

impl ContactHandler for CollisionEventDetector {
    fn begin_contact(&mut self, contact: &Contact, bodies: &dyn BodyView) {
        let Some(floor) = bodies.floor() else {
            return;
        };
        if !contact.involves(floor) {
            return;
        }
        self.pending.push(FloorContact {
            ball_position: bodies.position(self.ball),
        });
    }
}
