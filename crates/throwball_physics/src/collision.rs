//! Collision detection
//!
//! Provides sphere tests against every collider shape plus collision
//! filtering via layer masks. The ball is the only moving shape, so every
//! narrow-phase test takes a sphere first.

use bitflags::bitflags;

use crate::shapes::{Aabb, Plane, Sphere, Triangle, TriangleMesh};
use throwball_math::Vec3;

bitflags! {
    /// Collision layers for filtering which objects can collide
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for most objects
        const DEFAULT = 1 << 0;
        /// Throwable balls
        const BALL = 1 << 1;
        /// Reconstructed room geometry
        const ENVIRONMENT = 1 << 2;
        /// All layers (collide with everything)
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what an object collides with
///
/// Two objects A and B collide if:
/// - (A.layer & B.mask) != 0, AND
/// - (B.layer & A.mask) != 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this object belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this object can collide with
    pub mask: CollisionLayer,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

impl CollisionFilter {
    /// Create a new collision filter with specified layer and mask
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask }
    }

    /// Check if this filter allows collision with another filter
    pub fn collides_with(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// Balls hit everything
    pub fn ball() -> Self {
        Self {
            layer: CollisionLayer::BALL,
            mask: CollisionLayer::ALL,
        }
    }

    /// Reconstructed environment is hit by everything
    pub fn environment() -> Self {
        Self {
            layer: CollisionLayer::ENVIRONMENT,
            mask: CollisionLayer::ALL,
        }
    }
}

/// Contact information from a collision
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Point of contact (on the surface of the second shape)
    pub point: Vec3,
    /// Normal pointing from the second shape toward the first
    pub normal: Vec3,
    /// Penetration depth (positive means overlapping)
    pub penetration: f32,
}

impl Contact {
    /// Create a new contact
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    /// Check if this represents an actual collision (positive penetration)
    pub fn is_colliding(&self) -> bool {
        self.penetration > 0.0
    }
}

/// Test sphere vs plane collision
///
/// The contact normal is the plane normal.
pub fn sphere_vs_plane(sphere: &Sphere, plane: &Plane) -> Option<Contact> {
    let signed_dist = plane.signed_distance(sphere.center);
    let penetration = sphere.radius - signed_dist;

    if penetration > 0.0 {
        let normal = plane.normal;
        let point = sphere.center - normal * signed_dist;
        Some(Contact::new(point, normal, penetration))
    } else {
        None
    }
}

/// Test sphere vs AABB collision
///
/// The contact normal points from the AABB toward the sphere.
pub fn sphere_vs_aabb(sphere: &Sphere, aabb: &Aabb) -> Option<Contact> {
    let closest = aabb.closest_point(sphere.center);
    let delta = sphere.center - closest;
    let dist_squared = delta.length_squared();

    if dist_squared >= sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_squared.sqrt();
    if dist > 0.0001 {
        return Some(Contact::new(closest, delta.normalized(), sphere.radius - dist));
    }

    // Center is inside the box: push out through the nearest face
    let to_min = sphere.center - aabb.min;
    let to_max = aabb.max - sphere.center;
    let candidates = [
        (to_min.x, -Vec3::X),
        (to_max.x, Vec3::X),
        (to_min.y, -Vec3::Y),
        (to_max.y, Vec3::Y),
        (to_min.z, -Vec3::Z),
        (to_max.z, Vec3::Z),
    ];
    let (depth, normal) = candidates
        .iter()
        .copied()
        .fold((f32::INFINITY, Vec3::Y), |best, c| if c.0 < best.0 { c } else { best });

    Some(Contact::new(closest, normal, depth + sphere.radius))
}

/// Sphere vs sphere collision (normal points from `b` toward `a`)
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> Option<Contact> {
    let delta = a.center - b.center;
    let dist_sq = delta.length_squared();
    let min_dist = a.radius + b.radius;

    if dist_sq < min_dist * min_dist && dist_sq > 0.0001 * 0.0001 {
        let dist = dist_sq.sqrt();
        let normal = delta / dist;
        let point = b.center + normal * b.radius;
        Some(Contact::new(point, normal, min_dist - dist))
    } else {
        None
    }
}

/// Test sphere vs a single triangle
///
/// The contact normal points from the triangle toward the sphere center. A
/// center lying on the triangle uses the face normal.
pub fn sphere_vs_triangle(sphere: &Sphere, triangle: &Triangle) -> Option<Contact> {
    let closest = triangle.closest_point(sphere.center);
    let delta = sphere.center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0001 {
        delta / dist
    } else {
        triangle.normal()
    };

    Some(Contact::new(closest, normal, sphere.radius - dist))
}

/// Test sphere vs a static triangle mesh
///
/// Returns the deepest triangle contact. The mesh bounds reject distant
/// spheres before any triangle is visited.
pub fn sphere_vs_mesh(sphere: &Sphere, mesh: &TriangleMesh) -> Option<Contact> {
    if !mesh.bounds().expanded(sphere.radius).contains(sphere.center) {
        return None;
    }

    mesh.triangles()
        .iter()
        .filter_map(|tri| sphere_vs_triangle(sphere, tri))
        .fold(None, |deepest: Option<Contact>, contact| match deepest {
            Some(d) if d.penetration >= contact.penetration => Some(d),
            _ => Some(contact),
        })
}
