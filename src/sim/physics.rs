//! Minimal 2D rigid-body world
//!
//! Enough physics for one ball, two paddles and a static arena: gravity,
//! circle/box contacts, restitution impulses and penetration correction.
//! Each step is split into substeps short enough that no moving body travels
//! more than a fraction of its own size. Begin-contact notifications fire
//! during `step` with the dynamic body rewound to the moment of first touch,
//! before the contact is resolved.

use std::collections::HashSet;

use glam::Vec2;

use super::collision::{CollisionResult, circle_box_collision, circle_circle_collision};
use super::world::{
    BodyDef, BodyHandle, BodyKind, BodyView, Contact, ContactHandler, PhysicsWorld, Shape,
    SolverConfig,
};
use crate::error::PhysicsError;

/// Shapes closer than this still count as touching
const CONTACT_SLOP: f32 = 0.005;

/// Largest move per substep, as a fraction of the smallest moving extent
const MAX_TRAVEL: f32 = 0.5;

const MAX_SUBSTEPS: u32 = 64;

#[derive(Debug, Clone)]
struct Body {
    kind: BodyKind,
    shape: Shape,
    position: Vec2,
    angle: f32,
    velocity: Vec2,
    angular_velocity: f32,
    gravity_scale: f32,
    restitution: f32,
    inv_mass: f32,
}

impl Body {
    /// Half the narrowest dimension of the shape
    fn min_extent(&self) -> f32 {
        match self.shape {
            Shape::Circle { radius } => radius,
            Shape::Box { half_extents } => half_extents.min_element(),
        }
    }

    fn from_def(def: BodyDef) -> Self {
        let inv_mass = match def.kind {
            BodyKind::Dynamic if def.mass > 0.0 => 1.0 / def.mass,
            _ => 0.0,
        };
        Self {
            kind: def.kind,
            shape: def.shape,
            position: def.position,
            angle: def.angle,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            gravity_scale: 1.0,
            restitution: def.restitution,
            inv_mass,
        }
    }
}

/// Narrow phase for a pair; normal points from `b` toward `a`
fn collide(a: &Body, b: &Body) -> Option<CollisionResult> {
    let result = match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle_collision(a.position, ra + CONTACT_SLOP, b.position, rb)
        }
        (Shape::Circle { radius }, Shape::Box { half_extents }) => {
            circle_box_collision(a.position, radius + CONTACT_SLOP, b.position, half_extents, b.angle)
        }
        (Shape::Box { half_extents }, Shape::Circle { radius }) => {
            circle_box_collision(b.position, radius + CONTACT_SLOP, a.position, half_extents, a.angle)
                .flipped()
        }
        // Box pairs only ever involve paddles and walls, which don't respond
        (Shape::Box { .. }, Shape::Box { .. }) => return None,
    };
    result.hit.then(|| CollisionResult {
        penetration: result.penetration - CONTACT_SLOP,
        ..result
    })
}

/// The in-crate physics collaborator
#[derive(Debug, Clone)]
pub struct SimpleWorld {
    gravity: Vec2,
    solver: SolverConfig,
    bodies: Vec<Body>,
    floor: Option<BodyHandle>,
    /// Pairs touching at the end of the previous step
    touching: HashSet<(usize, usize)>,
}

impl SimpleWorld {
    pub fn new(gravity: Vec2, solver: SolverConfig) -> Self {
        Self {
            gravity,
            solver,
            bodies: Vec::new(),
            floor: None,
            touching: HashSet::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn body(&self, handle: BodyHandle) -> &Body {
        &self.bodies[handle.0]
    }

    fn body_mut(&mut self, handle: BodyHandle) -> &mut Body {
        &mut self.bodies[handle.0]
    }

    /// Substeps needed so no moving body skips through a thin shape
    fn substeps(&self, dt: f32) -> u32 {
        let mut travel: f32 = 0.0;
        let mut extent = f32::INFINITY;
        for body in self.bodies.iter().filter(|b| b.kind != BodyKind::Static) {
            let velocity = match body.kind {
                BodyKind::Dynamic => body.velocity + self.gravity * body.gravity_scale * dt,
                _ => body.velocity,
            };
            travel = travel.max(velocity.length() * dt);
            extent = extent.min(body.min_extent());
        }
        if travel <= 0.0 || extent <= 0.0 || !extent.is_finite() {
            return 1;
        }
        let needed = (travel / (extent * MAX_TRAVEL)).ceil();
        if needed.is_finite() {
            (needed as u32).clamp(1, MAX_SUBSTEPS)
        } else {
            MAX_SUBSTEPS
        }
    }

    /// Move the dynamic bodies of a fresh contact back along their velocity
    /// to where the shapes first touched, at most `dt` back in time
    fn rewind_to_touch(&mut self, i: usize, j: usize, dt: f32) {
        let (a, b) = (&self.bodies[i], &self.bodies[j]);
        let Some(contact) = collide(a, b) else {
            return;
        };
        if contact.penetration <= 0.0 {
            return;
        }
        let moving = |body: &Body| if body.inv_mass > 0.0 { body.velocity } else { Vec2::ZERO };
        let approach = (moving(a) - moving(b)).dot(contact.normal);
        if approach >= 0.0 {
            return;
        }

        let back = (contact.penetration / -approach).min(dt);
        let (va, vb) = (moving(a), moving(b));
        self.bodies[i].position -= va * back;
        self.bodies[j].position -= vb * back;
    }

    fn substep(&mut self, dt: f32, contacts: &mut dyn ContactHandler) {
        self.integrate(dt);

        let pairs = self.find_contacts();
        for &(i, j) in &pairs {
            if !self.touching.contains(&(i, j)) {
                self.rewind_to_touch(i, j, dt);
                let contact = Contact {
                    a: BodyHandle(i),
                    b: BodyHandle(j),
                };
                contacts.begin_contact(&contact, &*self);
            }
        }
        self.touching = pairs.iter().copied().collect();

        for _ in 0..self.solver.velocity_iterations {
            for &(i, j) in &pairs {
                self.solve_velocity(i, j);
            }
        }
        for _ in 0..self.solver.position_iterations {
            for &(i, j) in &pairs {
                self.solve_position(i, j);
            }
        }
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in &mut self.bodies {
            match body.kind {
                BodyKind::Static => {}
                BodyKind::Kinematic => {
                    body.position += body.velocity * dt;
                    body.angle += body.angular_velocity * dt;
                }
                BodyKind::Dynamic => {
                    body.velocity += gravity * body.gravity_scale * dt;
                    body.position += body.velocity * dt;
                    body.angle += body.angular_velocity * dt;
                }
            }
        }
    }

    /// All touching pairs with at least one dynamic body, in stable order
    fn find_contacts(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                if a.kind != BodyKind::Dynamic && b.kind != BodyKind::Dynamic {
                    continue;
                }
                if collide(a, b).is_some() {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    fn solve_velocity(&mut self, i: usize, j: usize) {
        let (a, b) = (&self.bodies[i], &self.bodies[j]);
        let Some(contact) = collide(a, b) else {
            return;
        };
        let total_inv_mass = a.inv_mass + b.inv_mass;
        if total_inv_mass == 0.0 {
            return;
        }

        let relative = a.velocity - b.velocity;
        let approach = relative.dot(contact.normal);
        if approach >= 0.0 {
            return; // Already separating
        }

        let restitution = a.restitution.max(b.restitution);
        let impulse = -(1.0 + restitution) * approach / total_inv_mass;
        let (inv_a, inv_b) = (a.inv_mass, b.inv_mass);
        if inv_a > 0.0 {
            self.bodies[i].velocity += contact.normal * impulse * inv_a;
        }
        if inv_b > 0.0 {
            self.bodies[j].velocity -= contact.normal * impulse * inv_b;
        }
    }

    fn solve_position(&mut self, i: usize, j: usize) {
        let (a, b) = (&self.bodies[i], &self.bodies[j]);
        let Some(contact) = collide(a, b) else {
            return;
        };
        let total_inv_mass = a.inv_mass + b.inv_mass;
        if total_inv_mass == 0.0 || contact.penetration <= 0.0 {
            return;
        }

        let correction = contact.normal * (contact.penetration / total_inv_mass);
        let (inv_a, inv_b) = (a.inv_mass, b.inv_mass);
        if inv_a > 0.0 {
            self.bodies[i].position += correction * inv_a;
        }
        if inv_b > 0.0 {
            self.bodies[j].position -= correction * inv_b;
        }
    }

    fn check_finite(&self) -> Result<(), PhysicsError> {
        match self
            .bodies
            .iter()
            .position(|b| !(b.position.is_finite() && b.velocity.is_finite() && b.angle.is_finite()))
        {
            Some(index) => Err(PhysicsError::Diverged {
                body: BodyHandle(index),
            }),
            None => Ok(()),
        }
    }
}

impl BodyView for SimpleWorld {
    fn position(&self, body: BodyHandle) -> Vec2 {
        self.body(body).position
    }

    fn angle(&self, body: BodyHandle) -> f32 {
        self.body(body).angle
    }

    fn velocity(&self, body: BodyHandle) -> Vec2 {
        self.body(body).velocity
    }

    fn floor(&self) -> Option<BodyHandle> {
        self.floor
    }
}

impl PhysicsWorld for SimpleWorld {
    fn create_body(&mut self, def: BodyDef) -> BodyHandle {
        self.bodies.push(Body::from_def(def));
        BodyHandle(self.bodies.len() - 1)
    }

    fn set_floor(&mut self, body: BodyHandle) {
        self.floor = Some(body);
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec2) {
        self.body_mut(body).position = position;
    }

    fn set_angle(&mut self, body: BodyHandle, angle: f32) {
        self.body_mut(body).angle = angle;
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        self.body_mut(body).velocity = velocity;
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, omega: f32) {
        self.body_mut(body).angular_velocity = omega;
    }

    fn set_gravity_scale(&mut self, body: BodyHandle, scale: f32) {
        self.body_mut(body).gravity_scale = scale;
    }

    fn step(&mut self, dt: f32, contacts: &mut dyn ContactHandler) -> Result<(), PhysicsError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTimestep(dt));
        }

        let substeps = self.substeps(dt);
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.substep(h, contacts);
        }

        self.check_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every contact plus where body `watch` was at that moment
    #[derive(Default)]
    struct Recorder {
        watch: Option<BodyHandle>,
        seen: Vec<(Contact, Vec2)>,
    }

    impl ContactHandler for Recorder {
        fn begin_contact(&mut self, contact: &Contact, bodies: &dyn BodyView) {
            let pos = self.watch.map(|b| bodies.position(b)).unwrap_or(Vec2::ZERO);
            self.seen.push((*contact, pos));
        }
    }

    fn world_with_floor() -> (SimpleWorld, BodyHandle, BodyHandle) {
        let mut world = SimpleWorld::new(Vec2::new(0.0, 10.0), SolverConfig::default());
        // Floor top surface at y = 10
        let floor = world.create_body(BodyDef::static_box(Vec2::new(20.0, 0.5)).at(Vec2::new(0.0, 10.5)));
        world.set_floor(floor);
        let ball = world.create_body(
            BodyDef::dynamic_circle(0.5)
                .at(Vec2::new(0.0, 8.0))
                .with_restitution(0.5),
        );
        (world, floor, ball)
    }

    #[test]
    fn test_gravity_pulls_dynamic_bodies_only() {
        let (mut world, floor, ball) = world_with_floor();
        let mut recorder = Recorder::default();
        world.step(0.1, &mut recorder).unwrap();
        assert!(world.velocity(ball).y > 0.0);
        assert_eq!(world.position(floor), Vec2::new(0.0, 10.5));
    }

    #[test]
    fn test_gravity_scale_zero_holds_ball() {
        let (mut world, _, ball) = world_with_floor();
        world.set_gravity_scale(ball, 0.0);
        let mut recorder = Recorder::default();
        world.step(0.1, &mut recorder).unwrap();
        assert_eq!(world.position(ball), Vec2::new(0.0, 8.0));
    }

    #[test]
    fn test_floor_contact_fires_once_and_bounces() {
        let (mut world, floor, ball) = world_with_floor();
        let mut recorder = Recorder {
            watch: Some(ball),
            ..Default::default()
        };

        for _ in 0..60 {
            world.step(1.0 / 60.0, &mut recorder).unwrap();
            if !recorder.seen.is_empty() {
                break;
            }
        }

        assert_eq!(recorder.seen.len(), 1);
        let (contact, _) = recorder.seen[0];
        assert!(contact.involves(floor));
        assert!(contact.involves(ball));
        assert!(world.is_floor(floor));
        // Restitution sends it back up
        assert!(world.velocity(ball).y < 0.0);
        // And it no longer overlaps the floor
        assert!(world.position(ball).y <= 9.5 + CONTACT_SLOP);

        // Still near the floor on the next step: no second begin-contact
        world.step(1.0 / 60.0, &mut recorder).unwrap();
        assert_eq!(recorder.seen.len(), 1);
    }

    #[test]
    fn test_contact_position_sampled_before_resolution() {
        let (mut world, _, ball) = world_with_floor();
        // Sink the ball into the floor; the step must report where it was, then push it out
        world.set_gravity_scale(ball, 0.0);
        world.set_position(ball, Vec2::new(0.0, 9.8));
        let mut recorder = Recorder {
            watch: Some(ball),
            ..Default::default()
        };
        world.step(1.0 / 60.0, &mut recorder).unwrap();

        assert_eq!(recorder.seen.len(), 1);
        assert!((recorder.seen[0].1.y - 9.8).abs() < 1e-5);
        assert!(world.position(ball).y < 9.6);
    }

    #[test]
    fn test_fast_ball_reported_at_first_touch() {
        let (mut world, floor, ball) = world_with_floor();
        world.set_velocity(ball, Vec2::new(0.0, 40.0));
        let mut recorder = Recorder {
            watch: Some(ball),
            ..Default::default()
        };

        for _ in 0..10 {
            world.step(1.0 / 60.0, &mut recorder).unwrap();
        }

        let floor_hits: Vec<_> = recorder.seen.iter().filter(|(c, _)| c.involves(floor)).collect();
        assert_eq!(floor_hits.len(), 1);
        // Center one radius above the floor surface at y = 10
        assert!((floor_hits[0].1.y - 9.5).abs() < 1e-3);
    }

    #[test]
    fn test_very_fast_ball_does_not_tunnel() {
        let (mut world, floor, ball) = world_with_floor();
        world.set_velocity(ball, Vec2::new(0.0, 200.0));
        let mut recorder = Recorder {
            watch: Some(ball),
            ..Default::default()
        };

        world.step(1.0 / 60.0, &mut recorder).unwrap();

        assert!(recorder.seen.iter().any(|(c, pos)| c.involves(floor) && pos.y < 10.0));
        assert!(world.position(ball).y < 10.0);
        assert!(world.velocity(ball).y < 0.0);
    }

    #[test]
    fn test_kinematic_box_moves_and_pushes_ball() {
        let (mut world, _, ball) = world_with_floor();
        world.set_gravity_scale(ball, 0.0);
        let paddle = world.create_body(BodyDef::kinematic_box(Vec2::new(1.0, 0.2)).at(Vec2::new(-2.0, 8.0)));
        world.set_velocity(paddle, Vec2::new(30.0, 0.0));

        let mut recorder = Recorder::default();
        for _ in 0..10 {
            world.step(1.0 / 60.0, &mut recorder).unwrap();
        }
        assert!(world.position(paddle).x > -2.0);
        assert!(recorder.seen.iter().any(|(c, _)| c.involves(paddle) && c.involves(ball)));
        assert!(world.velocity(ball).x > 0.0);
    }

    #[test]
    fn test_invalid_timestep_rejected() {
        let (mut world, _, _) = world_with_floor();
        let mut recorder = Recorder::default();
        assert!(matches!(
            world.step(f32::NAN, &mut recorder),
            Err(PhysicsError::InvalidTimestep(dt)) if dt.is_nan()
        ));
        assert!(matches!(
            world.step(-1.0, &mut recorder),
            Err(PhysicsError::InvalidTimestep(_))
        ));
    }

    #[test]
    fn test_divergence_reported() {
        let (mut world, _, ball) = world_with_floor();
        world.set_velocity(ball, Vec2::new(f32::INFINITY, 0.0));
        let mut recorder = Recorder::default();
        assert_eq!(
            world.step(1.0 / 60.0, &mut recorder),
            Err(PhysicsError::Diverged { body: ball })
        );
    }
}
