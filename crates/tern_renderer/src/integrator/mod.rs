//! Radiance estimators.
//!
//! An integrator turns one camera ray into one Monte Carlo estimate of the
//! radiance arriving along it. Implementations are stateless apart from
//! their configuration and are shared between render threads.

mod debug;
mod naive;
mod standard;

pub use debug::{DebugIntegrator, DebugMode};
pub use naive::NaiveIntegrator;
pub use standard::StandardIntegrator;

use serde::{Deserialize, Serialize};

use crate::{Color, Sampler, Scene};
use tern_math::{Ray, Vec3};

/// Path termination and ray offsetting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Paths shorter than this are never terminated by Russian roulette
    pub min_path_length: u32,
    /// Probability of continuing a path once Russian roulette applies
    pub survival_probability: f32,
    /// Distance new rays are pushed off a surface along their direction
    pub ray_epsilon: f32,
    pub russian_roulette: bool,
    /// Hard cap on path length, `None` for unbounded
    pub max_path_length: Option<u32>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            min_path_length: 5,
            survival_probability: 0.9,
            ray_epsilon: 1e-5,
            russian_roulette: true,
            max_path_length: None,
        }
    }
}

impl IntegratorConfig {
    /// Decides whether the path continues to vertex `path_length`, dividing
    /// `weight` by the survival probability when Russian roulette applies.
    pub(crate) fn continue_path(
        &self,
        path_length: u32,
        weight: &mut Color,
        sampler: &mut Sampler,
    ) -> bool {
        if self.max_path_length.is_some_and(|max| path_length > max) {
            return false;
        }

        if self.russian_roulette && path_length > self.min_path_length {
            debug_assert!(self.survival_probability > 0.0);
            if sampler.randf() >= self.survival_probability {
                return false;
            }
            *weight /= self.survival_probability;
        }

        true
    }
}

/// One radiance estimate plus first-hit feature buffers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadianceSample {
    pub radiance: Color,
    /// Albedo of the first surface hit, zero on a miss
    pub albedo: Color,
    /// Shading normal facing the camera at the first hit, zero on a miss
    pub normal: Vec3,
}

impl RadianceSample {
    /// Replaces a non-finite radiance with zero.
    pub(crate) fn sanitized(mut self) -> Self {
        if !self.radiance.is_finite() {
            log::warn!("Discarding non-finite radiance sample {:?}", self.radiance);
            self.radiance = Color::ZERO;
        }
        self
    }
}

/// Estimates radiance along camera rays.
pub trait Integrator: Send + Sync {
    fn sample(&self, scene: &Scene, ray: Ray, sampler: &mut Sampler) -> RadianceSample;
}

#[cfg(test)]
pub(crate) mod test_scenes {
    //! Scenes shared by the integrator tests.

    use std::sync::Arc;

    use crate::{Camera, DiffuseLight, Lambertian, Material, Object, Quad, Scene};
    use tern_math::Vec3;

    /// Open-fronted unit box with a small light in the ceiling, camera
    /// looking in from +Z.
    pub fn cornell_box() -> Scene {
        let white: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::splat(0.73)));
        let red: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::new(0.65, 0.05, 0.05)));
        let green: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::new(0.12, 0.45, 0.15)));
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Vec3::splat(15.0)));

        let mut scene = Scene::new();
        scene
            // floor y=0, facing up
            .add(Object::new(
                Quad::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 0.0)),
                white.clone(),
            ))
            // ceiling y=2, facing down
            .add(Object::new(
                Quad::new(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0)),
                white.clone(),
            ))
            // back wall z=-1, facing +Z
            .add(Object::new(
                Quad::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)),
                white,
            ))
            // left wall x=-1
            .add(Object::new(
                Quad::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 0.0, 2.0)),
                red,
            ))
            // right wall x=1
            .add(Object::new(
                Quad::new(Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 2.0, 0.0)),
                green,
            ))
            // light just below the ceiling, facing down
            .add(Object::new(
                Quad::new(Vec3::new(-0.25, 1.999, -0.25), Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.5)),
                light,
            ));

        scene.set_camera(
            Camera::new()
                .with_position(Vec3::new(0.0, 1.0, 3.5), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
                .with_lens(40.0, 0.0, 1.0),
        );
        scene
    }
}
