//! Surface intersection record produced by scene queries.

use crate::{Material, Object};
use tern_math::{Frame, Ray, Vec2, Vec3};

/// Everything the integrator and materials need to know about a hit point.
///
/// Built fresh for every closest-hit query and never stored.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub position: Vec3,
    /// Unit direction back towards the ray origin
    pub wo: Vec3,
    /// Geometric normal, outward and unflipped
    pub normal: Vec3,
    /// Shading basis; its normal equals `normal` unless a material perturbs it
    pub shading: Frame,
    /// UV texture coordinates
    pub uv: Vec2,
    /// Whether `wo` is on the outward side of the surface
    pub front_face: bool,
    /// Hit object
    pub object: &'a Object,
    /// Index of the object in the scene snapshot
    pub object_index: usize,
}

impl<'a> Intersection<'a> {
    pub fn new(
        ray: &Ray,
        t: f32,
        position: Vec3,
        normal: Vec3,
        uv: Vec2,
        object: &'a Object,
        object_index: usize,
    ) -> Self {
        let wo = (-ray.direction()).normalize_or_zero();

        Self {
            t,
            position,
            wo,
            normal,
            shading: Frame::from_normal(normal),
            uv,
            front_face: wo.dot(normal) > 0.0,
            object,
            object_index,
        }
    }

    /// Material of the hit object.
    #[inline]
    pub fn material(&self) -> &'a dyn Material {
        self.object.material()
    }

    /// Shading frame oriented so that `wo` lies in its upper hemisphere.
    pub fn facing_frame(&self) -> Frame {
        if self.wo.dot(self.shading.normal) < 0.0 {
            self.shading.flipped()
        } else {
            self.shading
        }
    }

    /// Ray leaving the surface along `direction`, with its origin pushed
    /// `epsilon` along that direction to avoid self-intersection.
    pub fn spawn_ray(&self, direction: Vec3, epsilon: f32) -> Ray {
        Ray::new(self.position + direction * epsilon, direction)
    }
}
