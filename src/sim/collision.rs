//! Narrow-phase collision for circles and oriented boxes
//!
//! Every test returns a normal pointing from the other shape toward the
//! circle, so pushing the circle along it separates the pair.

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at the contact, pointing toward the circle center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    /// Same contact seen from the other shape
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Check collision between a circle and a box rotated by `box_angle`
///
/// Touching counts as a hit (zero penetration), so a ball resting on the
/// floor stays in contact instead of flickering.
pub fn circle_box_collision(
    center: Vec2,
    radius: f32,
    box_pos: Vec2,
    half_extents: Vec2,
    box_angle: f32,
) -> CollisionResult {
    let rotation = Vec2::from_angle(box_angle);
    let inverse = Vec2::from_angle(-box_angle);

    // Work in the box's local frame
    let local = inverse.rotate(center - box_pos);
    let closest = local.clamp(-half_extents, half_extents);

    if closest == local {
        // Center is inside the box: push out along the shallowest axis
        let dx = half_extents.x - local.x.abs();
        let dy = half_extents.y - local.y.abs();
        let (local_normal, depth) = if dx < dy {
            (Vec2::new(local.x.signum(), 0.0), dx)
        } else {
            (Vec2::new(0.0, local.y.signum()), dy)
        };
        return CollisionResult {
            hit: true,
            normal: rotation.rotate(local_normal),
            penetration: radius + depth,
        };
    }

    let delta = local - closest;
    let dist = delta.length();
    if dist > radius {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: rotation.rotate(delta / dist),
        penetration: radius - dist,
    }
}

/// Check collision between two circles; normal points from `b` toward `a`
pub fn circle_circle_collision(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> CollisionResult {
    let delta = a - b;
    let dist = delta.length();
    let reach = radius_a + radius_b;
    if dist > reach {
        return CollisionResult::miss();
    }

    // Concentric circles: pick an arbitrary but stable axis
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::NEG_Y };
    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}
