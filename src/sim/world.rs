//! Physics world contract
//!
//! The match never touches physics internals: it creates bodies through
//! `PhysicsWorld`, moves them through narrow accessors, and hears about
//! contacts through a `ContactHandler` passed to `step`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Opaque reference to a body owned by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub(crate) usize);

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves
    Static,
    /// Moved by its velocity only, unaffected by contacts or gravity
    Kinematic,
    /// Fully simulated
    Dynamic,
}

/// Collision shape, centered on the body position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    /// Oriented box, rotated by the body angle
    Box { half_extents: Vec2 },
}

/// Body construction parameters
#[derive(Debug, Clone)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec2,
    pub angle: f32,
    pub restitution: f32,
    pub mass: f32,
}

impl BodyDef {
    pub fn dynamic_circle(radius: f32) -> Self {
        Self::new(BodyKind::Dynamic, Shape::Circle { radius })
    }

    pub fn kinematic_box(half_extents: Vec2) -> Self {
        Self::new(BodyKind::Kinematic, Shape::Box { half_extents })
    }

    pub fn static_box(half_extents: Vec2) -> Self {
        Self::new(BodyKind::Static, Shape::Box { half_extents })
    }

    fn new(kind: BodyKind, shape: Shape) -> Self {
        Self {
            kind,
            shape,
            position: Vec2::ZERO,
            angle: 0.0,
            restitution: 0.0,
            mass: 1.0,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

/// Solver effort, fixed when the world is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    pub velocity_iterations: u32,
    pub position_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            velocity_iterations: crate::consts::VELOCITY_ITERATIONS,
            position_iterations: crate::consts::POSITION_ITERATIONS,
        }
    }
}

/// Two bodies that started touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl Contact {
    #[inline]
    pub fn involves(&self, body: BodyHandle) -> bool {
        self.a == body || self.b == body
    }
}

/// Read access to body state; what a contact handler may look at mid-step
pub trait BodyView {
    fn position(&self, body: BodyHandle) -> Vec2;
    fn angle(&self, body: BodyHandle) -> f32;
    fn velocity(&self, body: BodyHandle) -> Vec2;
    /// The body flagged as the arena floor, if any
    fn floor(&self) -> Option<BodyHandle>;

    fn is_floor(&self, body: BodyHandle) -> bool {
        self.floor() == Some(body)
    }
}

/// Receives begin-contact notifications synchronously during `PhysicsWorld::step`
pub trait ContactHandler {
    /// Called once per pair when it starts touching. `bodies` reflects the
    /// world at that instant, before the contact is resolved.
    fn begin_contact(&mut self, contact: &Contact, bodies: &dyn BodyView);
}

/// A rigid-body world the match can drive
pub trait PhysicsWorld: BodyView {
    fn create_body(&mut self, def: BodyDef) -> BodyHandle;
    /// Flag a body as the arena floor
    fn set_floor(&mut self, body: BodyHandle);

    fn set_position(&mut self, body: BodyHandle, position: Vec2);
    fn set_angle(&mut self, body: BodyHandle, angle: f32);
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2);
    fn set_angular_velocity(&mut self, body: BodyHandle, omega: f32);
    /// 0 disables gravity for the body, 1 is normal
    fn set_gravity_scale(&mut self, body: BodyHandle, scale: f32);

    fn set_transform(&mut self, body: BodyHandle, position: Vec2, angle: f32) {
        self.set_position(body, position);
        self.set_angle(body, angle);
    }

    /// Advance by `dt` seconds, notifying `contacts` of every contact that
    /// begins during the step before returning.
    fn step(&mut self, dt: f32, contacts: &mut dyn ContactHandler) -> Result<(), PhysicsError>;
}
