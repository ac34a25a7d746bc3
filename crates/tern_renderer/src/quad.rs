//! Parallelogram primitive, used for area lights and box walls.

use crate::shape::{Shape, ShapeHit, SurfaceSample};
use crate::Sampler;
use tern_math::{Aabb, Ray, Vec2, Vec3};

/// Parallelogram spanned by edges `u` and `v` from corner `q`.
///
/// The front face normal is `u x v`.
#[derive(Debug, Clone)]
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    normal: Vec3,
    /// Plane offset: dot(normal, p) == d for points on the quad
    d: f32,
    /// `n / dot(n, n)` for unnormalized n, projects hit offsets to (alpha, beta)
    w: Vec3,
    area: f32,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3) -> Self {
        let n = u.cross(v);
        let area = n.length();
        let normal = n.normalize_or_zero();
        let d = normal.dot(q);
        let w = if area > 0.0 { n / n.dot(n) } else { Vec3::ZERO };

        let bbox = Aabb::surrounding(
            &Aabb::from_points(q, q + u + v),
            &Aabb::from_points(q + u, q + v),
        );

        Self {
            q,
            u,
            v,
            normal,
            d,
            w,
            area,
            bbox,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Shape for Quad {
    fn bound(&self) -> Aabb {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let denom = self.normal.dot(ray.direction());

        // Ray is parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !(t > 0.0 && t < ray.t_max) {
            return None;
        }

        let point = ray.at(t);
        let planar = point - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));
        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return None;
        }

        Some(ShapeHit {
            t,
            point,
            normal: self.normal,
            uv: Vec2::new(alpha, beta),
        })
    }

    fn surface_area(&self) -> f32 {
        self.area
    }

    fn sample_surface(&self, sampler: &mut Sampler) -> SurfaceSample {
        let r = sampler.rand_vec2();

        SurfaceSample {
            point: self.q + r.x * self.u + r.y * self.v,
            normal: self.normal,
            pdf: 1.0 / self.area,
        }
    }
}
