//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::shape::{Shape, ShapeHit, SurfaceSample};
use crate::Sampler;
use tern_math::{Aabb, Ray, Vec2, Vec3};

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length, counter-clockwise winding)
    normal: Vec3,
    area: f32,
    /// Bounding box
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);
        let area = 0.5 * cross.length();
        let normal = cross.normalize_or_zero();

        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            v0,
            v1,
            v2,
            normal,
            area,
            bbox,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Shape for Triangle {
    fn bound(&self) -> Aabb {
        self.bbox
    }

    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !(t > 0.0 && t < ray.t_max) {
            return None;
        }

        Some(ShapeHit {
            t,
            point: ray.at(t),
            normal: self.normal,
            uv: Vec2::new(u, v),
        })
    }

    fn surface_area(&self) -> f32 {
        self.area
    }

    fn sample_surface(&self, sampler: &mut Sampler) -> SurfaceSample {
        // Square-root warp gives uniform barycentrics
        let r = sampler.rand_vec2();
        let su = r.x.sqrt();
        let b0 = 1.0 - su;
        let b1 = r.y * su;

        SurfaceSample {
            point: self.v0 * b0 + self.v1 * b1 + self.v2 * (1.0 - b0 - b1),
            normal: self.normal,
            pdf: 1.0 / self.area,
        }
    }
}
