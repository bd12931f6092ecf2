//! Ball, paddles and arena built from the game definition
//!
//! These hold handles into the physics world, never the bodies themselves.

use glam::Vec2;

use super::mode::ModeKind;
use super::snapshot::Pose;
use super::world::{BodyDef, BodyHandle, PhysicsWorld};
use crate::consts::*;
use crate::game_def::GameDefinition;
use crate::normalize_angle;

fn pose_of<W: PhysicsWorld>(world: &W, body: BodyHandle, scale: f32) -> Pose {
    let pos = world.position(body) * scale;
    Pose {
        x: pos.x,
        y: pos.y,
        angle: world.angle(body),
    }
}

/// Static arena: floor, side walls, ceiling and net
#[derive(Debug, Clone)]
pub struct Arena {
    pub floor: BodyHandle,
    pub walls: [BodyHandle; 2],
    pub ceiling: BodyHandle,
    pub net: Option<BodyHandle>,
}

impl Arena {
    pub fn new<W: PhysicsWorld>(world: &mut W, def: &GameDefinition) -> Self {
        let scale = def.scale;
        let t = WALL_THICKNESS;
        let (left, right) = def.court_span();
        let floor_level = def.floor_level();
        let top = def
            .player_one
            .min
            .y
            .min(def.player_two.min.y)
            .min(def.above_net.min.y);
        let width = right - left;
        let height = floor_level - top;

        // Box in logical units -> static body
        let mut add_box = |center: Vec2, size: Vec2| {
            world.create_body(BodyDef::static_box(size / 2.0 / scale).at(center / scale))
        };

        let floor = add_box(
            Vec2::new(left + width / 2.0, floor_level + t / 2.0),
            Vec2::new(width + 2.0 * t, t),
        );
        let ceiling = add_box(
            Vec2::new(left + width / 2.0, top - t / 2.0),
            Vec2::new(width + 2.0 * t, t),
        );
        let walls = [
            add_box(Vec2::new(left - t / 2.0, top + height / 2.0), Vec2::new(t, height)),
            add_box(Vec2::new(right + t / 2.0, top + height / 2.0), Vec2::new(t, height)),
        ];

        // Net fills the gap between the above-net zone and the floor
        let net_top = def.above_net.max.y;
        let net = (net_top < floor_level).then(|| {
            add_box(
                Vec2::new(def.above_net.center().x, (net_top + floor_level) / 2.0),
                Vec2::new(def.above_net.size().x, floor_level - net_top),
            )
        });

        world.set_floor(floor);
        log::debug!("Arena built: {width}x{height} court, net {}", net.is_some());

        Self {
            floor,
            walls,
            ceiling,
            net,
        }
    }
}

/// The ball
#[derive(Debug, Clone)]
pub struct Ball {
    body: BodyHandle,
    scale: f32,
}

impl Ball {
    pub fn new<W: PhysicsWorld>(world: &mut W, def: &GameDefinition, restitution: f32) -> Self {
        let body = world.create_body(
            BodyDef::dynamic_circle(def.ball_radius / def.scale)
                .with_restitution(restitution)
                .with_mass(BALL_MASS),
        );
        Self {
            body,
            scale: def.scale,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Teleport the ball (physics units) and stop it
    pub fn set_transform<W: PhysicsWorld>(&self, world: &mut W, position: Vec2, angle: f32) {
        world.set_transform(self.body, position, angle);
        world.set_velocity(self.body, Vec2::ZERO);
        world.set_angular_velocity(self.body, 0.0);
    }

    pub fn set_velocity<W: PhysicsWorld>(&self, world: &mut W, velocity: Vec2) {
        world.set_velocity(self.body, velocity);
    }

    /// Per-frame behavior: the ball hangs still while a serve is pending
    pub fn on_frame<W: PhysicsWorld>(&self, world: &mut W, mode: ModeKind) {
        match mode {
            ModeKind::Serving => {
                world.set_gravity_scale(self.body, 0.0);
                world.set_velocity(self.body, Vec2::ZERO);
                world.set_angular_velocity(self.body, 0.0);
            }
            ModeKind::InPlay | ModeKind::Lingering => {
                world.set_gravity_scale(self.body, 1.0);
            }
        }
    }

    pub fn pose<W: PhysicsWorld>(&self, world: &W) -> Pose {
        pose_of(world, self.body, self.scale)
    }
}

/// Where the touch input wants a paddle (physics units)
#[derive(Debug, Clone, Copy, PartialEq)]
struct PaddleTarget {
    position: Vec2,
    angle: Option<f32>,
}

/// A player's paddle, steered toward the latest touch input
#[derive(Debug, Clone)]
pub struct Paddle {
    body: BodyHandle,
    scale: f32,
    max_speed: f32,
    max_spin: f32,
    target: Option<PaddleTarget>,
}

impl Paddle {
    pub fn new<W: PhysicsWorld>(
        world: &mut W,
        def: &GameDefinition,
        max_speed: f32,
        max_spin: f32,
    ) -> Self {
        let half_extents = Vec2::new(def.paddle_width, def.paddle_height) / 2.0 / def.scale;
        let body = world.create_body(BodyDef::kinematic_box(half_extents));
        Self {
            body,
            scale: def.scale,
            max_speed,
            max_spin,
            target: None,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Update the target from raw touch samples (logical units).
    ///
    /// No points: hold still. One point: move there. Two or more: move to
    /// the midpoint of the first two and tilt along the line between them.
    pub fn set_touch_points(&mut self, points: &[Vec2]) {
        self.target = match points {
            [] => None,
            [p] => Some(PaddleTarget {
                position: *p / self.scale,
                angle: None,
            }),
            [a, b, ..] => {
                let dir = *b - *a;
                Some(PaddleTarget {
                    position: (*a + *b) / 2.0 / self.scale,
                    angle: (dir.length_squared() > f32::EPSILON).then(|| dir.y.atan2(dir.x)),
                })
            }
        };
    }

    /// Place the paddle directly (physics units), dropping any touch target
    pub fn set_transform<W: PhysicsWorld>(&mut self, world: &mut W, position: Vec2, angle: f32) {
        self.target = None;
        world.set_transform(self.body, position, angle);
        world.set_velocity(self.body, Vec2::ZERO);
        world.set_angular_velocity(self.body, 0.0);
    }

    /// Drive the kinematic body toward the target for the coming step
    pub fn on_frame<W: PhysicsWorld>(&self, world: &mut W, dt: f32) {
        let (velocity, spin) = match self.target {
            Some(target) if dt > 0.0 => {
                let delta = target.position - world.position(self.body);
                let velocity = (delta / dt).clamp_length_max(self.max_speed);
                let spin = target.angle.map_or(0.0, |angle| {
                    let turn = normalize_angle(angle - world.angle(self.body));
                    (turn / dt).clamp(-self.max_spin, self.max_spin)
                });
                (velocity, spin)
            }
            _ => (Vec2::ZERO, 0.0),
        };
        world.set_velocity(self.body, velocity);
        world.set_angular_velocity(self.body, spin);
    }

    pub fn pose<W: PhysicsWorld>(&self, world: &W) -> Pose {
        pose_of(world, self.body, self.scale)
    }
}
