//! Path tracer with next-event estimation and multiple importance sampling.

use super::{Integrator, IntegratorConfig, RadianceSample};
use crate::mis::power_heuristic;
use crate::{Color, Intersection, Material, Pdf, Sampler, Scene};
use tern_math::{Ray, Vec3};

/// Unidirectional path tracer that samples emitters directly at every
/// non-specular vertex and combines that with BSDF sampling using the power
/// heuristic.
#[derive(Debug, Clone, Default)]
pub struct StandardIntegrator {
    pub config: IntegratorConfig,
}

impl StandardIntegrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Self { config }
    }

    /// MIS-weighted contribution of one emitter sample at `it`, before the
    /// path throughput is applied.
    fn sample_direct(
        &self,
        scene: &Scene,
        it: &Intersection,
        material: &dyn Material,
        sampler: &mut Sampler,
    ) -> Color {
        let Some(light) = scene.sample_surface_light(sampler) else {
            return Color::ZERO;
        };

        let to_light = light.point - it.position;
        let dist2 = to_light.length_squared();
        let dist = dist2.sqrt();
        let epsilon = self.config.ray_epsilon;
        if dist <= 2.0 * epsilon {
            return Color::ZERO;
        }
        let wi = to_light / dist;

        let cos_light = light.normal.dot(-wi).abs();
        if cos_light <= 0.0 {
            return Color::ZERO;
        }

        let le = light.object.material().emission(-wi, light.normal, light.normal);
        if le == Color::ZERO {
            return Color::ZERO;
        }

        let f = material.bsdf_cos(it, sampler, wi);
        if f == Color::ZERO {
            return Color::ZERO;
        }

        // Stops short of the emitter so the light itself is not an occluder
        let shadow = Ray::segment(it.position + wi * epsilon, wi, dist - 2.0 * epsilon);
        if scene.intersect_any(&shadow) {
            return Color::ZERO;
        }

        let p_light = light.pdf * dist2 / cos_light;
        let p_bsdf = material.pdf(it, wi);
        let w_light = power_heuristic(p_light, p_bsdf);

        f * le * (w_light / p_light)
    }

    /// MIS weight for emission found by following a BSDF sample.
    fn emission_weight(&self, scene: &Scene, ray: &Ray, it: &Intersection, prev_pdf: Pdf) -> f32 {
        let p_bsdf = match prev_pdf {
            Pdf::Specular => return 1.0,
            Pdf::Finite(p) => p,
        };
        if !scene.can_sample_light() {
            return 1.0;
        }

        let surface_pdf = scene.surface_pdf(it.object_index);
        if surface_pdf <= 0.0 {
            return 1.0;
        }

        let dist2 = (it.position - ray.origin()).length_squared();
        let cos_light = it.normal.dot(it.wo).abs();
        let p_light = surface_pdf * dist2 / cos_light;
        power_heuristic(p_bsdf, p_light)
    }
}

impl Integrator for StandardIntegrator {
    fn sample(&self, scene: &Scene, mut ray: Ray, sampler: &mut Sampler) -> RadianceSample {
        let config = &self.config;
        let mut radiance = Color::ZERO;
        let mut weight = Color::ONE;
        let mut albedo = Color::ZERO;
        let mut normal = Vec3::ZERO;
        // Camera rays count as specular: emission seen directly is unweighted
        let mut prev_pdf = Pdf::Specular;
        let mut path_length = 1;

        while config.continue_path(path_length, &mut weight, sampler) {
            let Some(it) = scene.intersect(&mut ray) else {
                if let Some(environment) = scene.environment() {
                    radiance += weight * environment.radiance(ray.direction());
                }
                break;
            };

            let material = it.material();
            if path_length == 1 {
                albedo = material.albedo();
                normal = it.facing_frame().normal;
            }

            let emission = material.emission(it.wo, it.normal, it.shading.normal);
            if emission != Color::ZERO {
                radiance += weight * emission * self.emission_weight(scene, &ray, &it, prev_pdf);
            }

            if !material.is_specular() && scene.can_sample_light() {
                radiance += weight * self.sample_direct(scene, &it, material, sampler);
            }

            let bs = material.eval_and_sample(&it, sampler);
            weight *= bs.weight;
            if weight == Color::ZERO {
                break;
            }

            prev_pdf = bs.pdf;
            ray = it.spawn_ray(bs.wi, config.ray_epsilon).with_depth(path_length);
            path_length += 1;
        }

        RadianceSample {
            radiance,
            albedo,
            normal,
        }
        .sanitized()
    }
}
