//! Sphere contacts and impulse response for stylized bumps between tools

use super::integrator::ForceIntegrator;
use forge_core::Vec3;

/// Fraction of penetration removed by positional correction
const SEPARATION_PERCENT: f32 = 0.8;

/// Bounding sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }
}

/// Overlap between two spheres
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first sphere toward the second
    pub normal: Vec3,
    /// Overlap depth along the normal
    pub penetration: f32,
}

/// Sphere/sphere overlap test
///
/// Touching spheres do not collide. Coincident centers report an upward
/// normal.
pub fn check_collision(a: &BoundingSphere, b: &BoundingSphere) -> Option<Contact> {
    let delta = b.center - a.center;
    let distance = delta.length();
    let radii = a.radius + b.radius;

    if distance >= radii {
        return None;
    }

    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec3::UP
    };

    Some(Contact {
        normal,
        penetration: radii - distance,
    })
}

/// Apply an impulse along the contact normal and push the bodies apart
///
/// A disabled integrator behaves as an immovable body. Bodies already moving
/// apart receive no impulse, only positional correction.
pub fn resolve_collision(
    a: &mut ForceIntegrator,
    b: &mut ForceIntegrator,
    contact: &Contact,
    restitution: f32,
) {
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return;
    }

    let restitution = restitution.clamp(0.0, 1.0);
    let relative = b.state().velocity - a.state().velocity;
    let closing = relative.dot(contact.normal);

    if closing < 0.0 {
        let j = -(1.0 + restitution) * closing / inv_sum;
        let impulse = contact.normal * j;
        a.state_mut().velocity -= impulse * inv_a;
        b.state_mut().velocity += impulse * inv_b;
    }

    let correction = contact.normal * (contact.penetration * SEPARATION_PERCENT / inv_sum);
    a.state_mut().position -= correction * inv_a;
    b.state_mut().position += correction * inv_b;
}
