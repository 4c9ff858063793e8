//! Collision shapes
//!
//! These are lightweight primitives used for collision detection. Environment
//! geometry from scene reconstruction becomes a [`TriangleMesh`], which is
//! the only shape whose construction can fail.

use std::fmt;
use std::sync::Arc;

use throwball_math::{RigidTransform, Vec3};

/// Triangles with less than this doubled area are dropped as degenerate
const DEGENERATE_AREA_EPSILON: f32 = 1e-12;

/// A sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere at the given center with the given radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if a point is inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    /// Translate the sphere by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        Self::new(self.center + delta, self.radius)
    }
}

/// An axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing all points (None for an empty iterator)
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first, first);
        for p in points {
            bounds.min = bounds.min.min_components(p);
            bounds.max = bounds.max.max_components(p);
        }
        Some(bounds)
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half the size in each dimension)
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if a point is inside or on the AABB
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Get the closest point inside or on the AABB to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp_components(self.min, self.max)
    }

    /// Grow the box by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

/// An infinite plane defined by normal and distance from origin
///
/// The plane equation is: normal · point = distance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal vector pointing to the positive side
    pub normal: Vec3,
    /// Signed distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a point on the plane and a normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalized();
        Self {
            normal: n,
            distance: n.dot(point),
        }
    }

    /// Create a horizontal floor plane at the given Y height
    pub fn floor(y: f32) -> Self {
        Self::from_point_normal(Vec3::new(0.0, y, 0.0), Vec3::Y)
    }

    /// Signed distance from a point to the plane (positive = normal side)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// A single triangle in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unit face normal (counter-clockwise winding), zero if degenerate
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalized()
    }

    /// Twice the triangle's area
    pub fn doubled_area(&self) -> f32 {
        (self.b - self.a).cross(self.c - self.a).length()
    }

    /// Closest point on the triangle to `p`
    ///
    /// Voronoi-region walk over vertices, edges and face.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;

        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }
}

/// Error building a collision shape from reconstructed geometry
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// No vertices or no triangles
    Empty,
    /// A triangle references a vertex that doesn't exist
    IndexOutOfRange { index: u32, vertex_count: usize },
    /// A vertex contains NaN or infinity
    NonFinite { vertex: usize },
    /// Every triangle has zero area
    Degenerate,
    /// Raw vertex buffer is not a whole number of 3-float vertices
    MalformedVertexBuffer { len: usize },
    /// Raw index buffer is not a whole number of triangles
    MalformedIndexBuffer { len: usize },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::Empty => write!(f, "mesh has no vertices or triangles"),
            ShapeError::IndexOutOfRange { index, vertex_count } => write!(
                f,
                "triangle index {} out of range for {} vertices",
                index, vertex_count
            ),
            ShapeError::NonFinite { vertex } => write!(f, "vertex {} is not finite", vertex),
            ShapeError::Degenerate => write!(f, "every triangle in the mesh is degenerate"),
            ShapeError::MalformedVertexBuffer { len } => {
                write!(f, "vertex buffer of {} floats is not a multiple of 3", len)
            }
            ShapeError::MalformedIndexBuffer { len } => {
                write!(f, "index buffer of {} indices is not a multiple of 3", len)
            }
        }
    }
}

impl std::error::Error for ShapeError {}

/// Static triangle mesh in world space
///
/// Built once per mesh-anchor add/update; triangles are pre-transformed so
/// collision queries never touch the anchor transform.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    bounds: Aabb,
}

impl TriangleMesh {
    /// Generate a static collision mesh from anchor-local geometry
    ///
    /// Degenerate triangles are dropped; the mesh fails only if none remain.
    pub fn generate_static(
        vertices: &[Vec3],
        indices: &[[u32; 3]],
        origin_from_anchor: &RigidTransform,
    ) -> Result<Self, ShapeError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(ShapeError::Empty);
        }

        if let Some(vertex) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(ShapeError::NonFinite { vertex });
        }

        let world: Vec<Vec3> = vertices
            .iter()
            .map(|v| origin_from_anchor.transform_point(*v))
            .collect();

        let mut triangles = Vec::with_capacity(indices.len());
        for tri in indices {
            let mut corners = [Vec3::ZERO; 3];
            for (corner, &index) in corners.iter_mut().zip(tri.iter()) {
                *corner = *world.get(index as usize).ok_or(ShapeError::IndexOutOfRange {
                    index,
                    vertex_count: vertices.len(),
                })?;
            }
            let triangle = Triangle::new(corners[0], corners[1], corners[2]);
            if triangle.doubled_area() > DEGENERATE_AREA_EPSILON {
                triangles.push(triangle);
            }
        }

        let bounds = Aabb::from_points(triangles.iter().flat_map(|t| [t.a, t.b, t.c]))
            .ok_or(ShapeError::Degenerate)?;

        Ok(Self { triangles, bounds })
    }

    /// World-space triangles
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// World-space bounding box
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Collision shape variants
#[derive(Clone, Debug)]
pub enum Collider {
    Sphere(Sphere),
    Aabb(Aabb),
    Plane(Plane),
    /// Shared so that re-adding the same mesh to the world is cheap
    Mesh(Arc<TriangleMesh>),
}

impl Collider {
    /// Wrap a triangle mesh
    pub fn mesh(mesh: TriangleMesh) -> Self {
        Collider::Mesh(Arc::new(mesh))
    }
}
