//! Pure BSDF-sampling path tracer.

use super::{Integrator, IntegratorConfig, RadianceSample};
use crate::{Color, Sampler, Scene};
use tern_math::{Ray, Vec3};

/// Unidirectional path tracer that only finds light by hitting it.
///
/// Unbiased but noisy for small emitters; serves as the reference the
/// [`StandardIntegrator`](super::StandardIntegrator) is checked against.
#[derive(Debug, Clone, Default)]
pub struct NaiveIntegrator {
    pub config: IntegratorConfig,
}

impl NaiveIntegrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Self { config }
    }
}

impl Integrator for NaiveIntegrator {
    fn sample(&self, scene: &Scene, mut ray: Ray, sampler: &mut Sampler) -> RadianceSample {
        let config = &self.config;
        let mut radiance = Color::ZERO;
        let mut weight = Color::ONE;
        let mut albedo = Color::ZERO;
        let mut normal = Vec3::ZERO;
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

            radiance += weight * material.emission(it.wo, it.normal, it.shading.normal);

            let bs = material.eval_and_sample(&it, sampler);
            weight *= bs.weight;
            if weight == Color::ZERO {
                break;
            }

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstantSky, DiffuseLight, Lambertian, Material, Object, Sphere};
    use std::sync::Arc;

    #[test]
    fn test_miss_returns_environment() {
        let mut scene = Scene::new().with_environment(ConstantSky::new(Color::new(0.1, 0.2, 0.3)));
        scene.add(Object::new(
            Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0),
            Arc::new(Lambertian::new(Color::splat(0.5))),
        ));
        scene.build_acceleration_structure().unwrap();

        let integrator = NaiveIntegrator::default();
        let mut sampler = Sampler::new(0);
        let s = integrator.sample(&scene, Ray::new(Vec3::ZERO, Vec3::Z), &mut sampler);
        assert_eq!(s.radiance, Color::new(0.1, 0.2, 0.3));
        assert_eq!(s.albedo, Color::ZERO);
    }

    #[test]
    fn test_direct_view_of_light() {
        let mut scene = Scene::new();
        scene.add(Object::new(
            Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0),
            Arc::new(DiffuseLight::new(Color::splat(3.0))),
        ));
        scene.build_acceleration_structure().unwrap();

        let integrator = NaiveIntegrator::default();
        let mut sampler = Sampler::new(0);
        let s = integrator.sample(&scene, Ray::new(Vec3::ZERO, -Vec3::Z), &mut sampler);
        assert_eq!(s.radiance, Color::splat(3.0));
        assert!((s.normal - Vec3::Z).length() < 1e-5);
    }

    /// Camera inside a closed Lambertian sphere that also emits `le`.
    /// Every path bounces forever, so the expected radiance is the geometric
    /// series `le / (1 - rho)`.
    #[test]
    fn test_closed_diffuse_energy_bound() {
        let _ = env_logger::builder().is_test(true).try_init();

        struct GlowingDiffuse {
            inner: Lambertian,
            le: Color,
        }

        impl Material for GlowingDiffuse {
            fn bsdf_cos(&self, it: &crate::Intersection, s: &mut Sampler, wi: Vec3) -> Color {
                self.inner.bsdf_cos(it, s, wi)
            }
            fn eval_and_sample(&self, it: &crate::Intersection, s: &mut Sampler) -> crate::BsdfSample {
                self.inner.eval_and_sample(it, s)
            }
            fn pdf(&self, it: &crate::Intersection, wi: Vec3) -> f32 {
                self.inner.pdf(it, wi)
            }
            fn emission(&self, _wo: Vec3, _n: Vec3, _shading_n: Vec3) -> Color {
                self.le
            }
            fn albedo(&self) -> Color {
                self.inner.albedo()
            }
        }

        let rho = 0.5;
        let le = 1.0;
        let mut scene = Scene::new();
        scene.add(Object::new(
            Sphere::new(Vec3::ZERO, 2.0),
            Arc::new(GlowingDiffuse {
                inner: Lambertian::new(Color::splat(rho)),
                le: Color::splat(le),
            }),
        ));
        scene.build_acceleration_structure().unwrap();

        let integrator = NaiveIntegrator::default();
        let mut sampler = Sampler::new(42);
        let n = 4000;
        let mut sum = 0.0;
        for _ in 0..n {
            let dir = crate::sampling::uniform_sample_sphere(sampler.rand_vec2());
            let s = integrator.sample(&scene, Ray::new(Vec3::ZERO, dir), &mut sampler);
            assert!(s.radiance.min_element() >= 0.0);
            sum += s.radiance.x;
        }

        let mean = sum / n as f32;
        let bound = le / (1.0 - rho);
        assert!(mean <= bound * 1.05, "mean {} exceeds bound {}", mean, bound);
        assert!(mean > bound * 0.9, "mean {} far below {}", mean, bound);
    }
}
