//! Scene objects: a shape paired with its material.

use std::fmt;
use std::sync::Arc;

use crate::bvh::Primitive;
use crate::shape::{Shape, ShapeHit};
use crate::Material;
use tern_math::{Aabb, Ray};

/// A renderable object.
///
/// Materials are shared through `Arc` so many objects can use one instance.
pub struct Object {
    shape: Box<dyn Shape>,
    material: Arc<dyn Material>,
}

impl Object {
    pub fn new(shape: impl Shape + 'static, material: Arc<dyn Material>) -> Self {
        Self {
            shape: Box::new(shape),
            material,
        }
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    pub fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }

    /// Whether this object is an area light.
    pub fn is_emissive(&self) -> bool {
        self.material.is_emissive()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("bound", &self.shape.bound())
            .field("emissive", &self.is_emissive())
            .finish()
    }
}

impl Primitive for Object {
    type Hit = ShapeHit;

    fn bound(&self) -> Aabb {
        self.shape.bound()
    }

    fn intersect(&self, ray: &Ray) -> Option<(f32, ShapeHit)> {
        self.shape.intersect(ray).map(|hit| (hit.t, hit))
    }

    fn intersect_any(&self, ray: &Ray) -> bool {
        self.shape.intersect_any(ray)
    }
}
