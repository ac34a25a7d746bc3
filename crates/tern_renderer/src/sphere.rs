//! Sphere primitive for ray tracing.

use crate::shape::{Shape, ShapeHit, SurfaceSample};
use crate::{sampling, Sampler};
use std::f32::consts::PI;
use tern_math::{Aabb, Ray, Vec2, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y, phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        Vec2::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Shape for Sphere {
    fn bound(&self) -> Aabb {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !(root > 0.0 && root < ray.t_max) {
            root = (h + sqrtd) / a;
            if !(root > 0.0 && root < ray.t_max) {
                return None;
            }
        }

        let point = ray.at(root);
        let normal = (point - self.center) / self.radius;

        Some(ShapeHit {
            t: root,
            point,
            normal,
            uv: Self::get_sphere_uv(normal),
        })
    }

    fn surface_area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample_surface(&self, sampler: &mut Sampler) -> SurfaceSample {
        let normal = sampling::uniform_sample_sphere(sampler.rand_vec2());

        SurfaceSample {
            point: self.center + self.radius * normal,
            normal,
            pdf: 1.0 / self.surface_area(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.intersect(&ray).is_none());
        assert!(!sphere.intersect_any(&ray));
    }

    #[test]
    fn test_sphere_hit_from_inside_keeps_outward_normal() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_respects_t_max() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::segment(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 3.0);
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_samples_lie_on_surface() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.75);
        let mut sampler = Sampler::new(9);

        for _ in 0..100 {
            let s = sphere.sample_surface(&mut sampler);
            assert!(((s.point - sphere.center()).length() - 0.75).abs() < 1e-4);
            assert!((s.pdf * sphere.surface_area() - 1.0).abs() < 1e-5);
        }
    }
}
