//! Shape trait for ray-geometry intersection and surface sampling.

use crate::Sampler;
use tern_math::{Aabb, Ray, Vec2, Vec3};

/// Geometric result of a ray-shape intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Outward unit normal (not flipped towards the ray)
    pub normal: Vec3,
    /// Surface parameterization
    pub uv: Vec2,
}

/// A point sampled on a shape's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub point: Vec3,
    /// Outward unit normal at `point`
    pub normal: Vec3,
    /// Density with respect to surface area
    pub pdf: f32,
}

/// Geometry that can be intersected, bounded and sampled.
///
/// Valid hits have `0 < t < ray.t_max`.
pub trait Shape: Send + Sync {
    /// Axis-aligned bounding box of the shape.
    fn bound(&self) -> Aabb;

    /// Closest intersection along the ray, if any.
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit>;

    /// Whether any intersection exists along the ray.
    fn intersect_any(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    /// Total surface area.
    fn surface_area(&self) -> f32;

    /// Sample a point uniformly by area.
    fn sample_surface(&self, sampler: &mut Sampler) -> SurfaceSample;
}
