//! Match simulation module
//!
//! Everything that mutates a match lives here and runs on one thread:
//! - Physics goes through the `PhysicsWorld` contract only
//! - Deadlines run on logical time, advanced by the caller
//! - Score events leave through snapshots, each exactly once

pub mod bodies;
pub mod collision;
pub mod detector;
pub mod game;
pub mod mode;
pub mod physics;
pub mod snapshot;
pub mod timer;
pub mod world;

pub use bodies::{Arena, Ball, Paddle};
pub use collision::{CollisionResult, circle_box_collision, circle_circle_collision};
pub use detector::{CollisionEventDetector, FloorContact, classify};
pub use game::Match;
pub use mode::{Mode, ModeKind, ModeStateMachine, ModeTimeout, ModeTimings};
pub use physics::SimpleWorld;
pub use snapshot::{Pose, ScoreEvent, ScoreReason, Snapshot, encode};
pub use timer::{DeadlineToken, Expired, LogicalScheduler, Scheduler};
pub use world::{
    BodyDef, BodyHandle, BodyKind, BodyView, Contact, ContactHandler, PhysicsWorld, Shape,
    SolverConfig,
};
