//! Scene container: objects, camera, environment and the acceleration
//! structure over a snapshot of the objects.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::{Bvh, Camera, Environment, Intersection, Object, Sampler};
use tern_math::{Ray, Vec3};

/// Errors from scene preparation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Scene contains no objects")]
    EmptyScene,

    #[error("Acceleration structure has not been built")]
    AccelerationStructureNotBuilt,

    #[error("Scene has no camera")]
    MissingCamera,
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// A point sampled on an emitter.
#[derive(Clone, Copy)]
pub struct LightSample<'a> {
    pub point: Vec3,
    /// Outward unit normal at `point`
    pub normal: Vec3,
    /// Density with respect to surface area over all emitters
    pub pdf: f32,
    pub object: &'a Object,
    pub object_index: usize,
}

/// Frozen view of the objects the BVH was built over.
struct Accelerated {
    objects: Vec<Arc<Object>>,
    bvh: Bvh,
    /// Indices of emissive objects
    emitters: Vec<usize>,
}

/// Everything needed to render an image.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Arc<Object>>,
    camera: Option<Camera>,
    environment: Option<Arc<dyn Environment>>,
    accel: Option<Accelerated>,
    /// Objects changed since the last build
    dirty: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object. Takes effect at the next acceleration structure build.
    pub fn add(&mut self, object: Object) -> &mut Self {
        self.push(Arc::new(object));
        self
    }

    pub fn push(&mut self, object: Arc<Object>) {
        self.objects.push(object);
        self.dirty = true;
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.set_camera(camera);
        self
    }

    pub fn set_environment(&mut self, environment: Arc<dyn Environment>) {
        self.environment = Some(environment);
    }

    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.set_environment(Arc::new(environment));
        self
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn environment(&self) -> Option<&dyn Environment> {
        self.environment.as_deref()
    }

    /// Objects as last added, which may be newer than the built snapshot.
    pub fn objects(&self) -> &[Arc<Object>] {
        &self.objects
    }

    /// Snapshot the object list, build the BVH over it and index emitters.
    pub fn build_acceleration_structure(&mut self) -> SceneResult<()> {
        if self.objects.is_empty() {
            return Err(SceneError::EmptyScene);
        }

        let start = Instant::now();
        let objects = self.objects.clone();
        let bvh = Bvh::build(&objects);
        let emitters: Vec<usize> = objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_emissive())
            .map(|(i, _)| i)
            .collect();

        log::info!(
            "Scene built: {} objects, {} emitters, BVH {} nodes (depth {}) in {:.2?}",
            objects.len(),
            emitters.len(),
            bvh.len(),
            bvh.max_depth(),
            start.elapsed()
        );

        self.accel = Some(Accelerated {
            objects,
            bvh,
            emitters,
        });
        self.dirty = false;
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.accel.is_some()
    }

    /// Whether objects were added after the last build.
    pub fn needs_rebuild(&self) -> bool {
        self.dirty
    }

    fn accelerated(&self) -> &Accelerated {
        match &self.accel {
            Some(accel) => accel,
            None => panic!("scene queried before build_acceleration_structure"),
        }
    }

    /// BVH over the built snapshot.
    ///
    /// # Panics
    /// If the acceleration structure has not been built.
    pub fn bvh(&self) -> &Bvh {
        &self.accelerated().bvh
    }

    /// Closest hit along the ray, narrowing `ray.t_max` to it.
    ///
    /// # Panics
    /// If the acceleration structure has not been built.
    pub fn intersect(&self, ray: &mut Ray) -> Option<Intersection<'_>> {
        let accel = self.accelerated();
        let hit = accel.bvh.intersect(&accel.objects, ray)?;
        let object = accel.objects[hit.primitive].as_ref();

        Some(Intersection::new(
            ray,
            hit.t,
            hit.hit.point,
            hit.hit.normal,
            hit.hit.uv,
            object,
            hit.primitive,
        ))
    }

    /// Whether anything is hit before `ray.t_max`.
    ///
    /// # Panics
    /// If the acceleration structure has not been built.
    pub fn intersect_any(&self, ray: &Ray) -> bool {
        let accel = self.accelerated();
        accel.bvh.intersect_any(&accel.objects, ray)
    }

    /// Whether next-event estimation is possible.
    pub fn can_sample_light(&self) -> bool {
        self.accel.as_ref().is_some_and(|a| !a.emitters.is_empty())
    }

    /// Pick an emitter uniformly by count, then a point on it uniformly by area.
    pub fn sample_surface_light(&self, sampler: &mut Sampler) -> Option<LightSample<'_>> {
        let accel = self.accel.as_ref()?;
        let &object_index = sampler.select(&accel.emitters)?;
        let object = accel.objects[object_index].as_ref();
        let sample = object.shape().sample_surface(sampler);

        Some(LightSample {
            point: sample.point,
            normal: sample.normal,
            pdf: sample.pdf / accel.emitters.len() as f32,
            object,
            object_index,
        })
    }

    /// Area density with which [`Scene::sample_surface_light`] produces points
    /// on `object_index`. Zero for non-emitters.
    pub fn surface_pdf(&self, object_index: usize) -> f32 {
        let Some(accel) = self.accel.as_ref() else {
            return 0.0;
        };
        let object = &accel.objects[object_index];
        if !object.is_emissive() || accel.emitters.is_empty() {
            return 0.0;
        }

        let area = object.shape().surface_area();
        if area <= 0.0 {
            return 0.0;
        }
        1.0 / (accel.emitters.len() as f32 * area)
    }
}
