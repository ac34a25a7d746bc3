//! Progressive tile-parallel rendering into an accumulation target.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::integrator::{Integrator, RadianceSample};
use crate::{Color, Sampler, Scene, SceneError};
use tern_math::{Ray, Vec2, Vec3};

/// Errors that can occur when starting a render.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Render target has zero size")]
    EmptyTarget,
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Base seed; every bucket and pass derives its own stream from it
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

/// Running per-pixel sums of radiance, albedo and normal samples.
///
/// Accumulation is commutative: bucket results may be added in any order.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    radiance: Vec<Color>,
    albedo: Vec<Color>,
    normal: Vec<Vec3>,
    sample_counts: Vec<u32>,
    passes: u32,
}

impl RenderTarget {
    /// Create an empty target.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        Self {
            width,
            height,
            radiance: vec![Color::ZERO; len],
            albedo: vec![Color::ZERO; len],
            normal: vec![Vec3::ZERO; len],
            sample_counts: vec![0; len],
            passes: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of completed render passes.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Samples accumulated at (x, y).
    pub fn sample_count(&self, x: u32, y: u32) -> u32 {
        self.sample_counts[self.index(x, y)]
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Mean of the samples at (x, y). Zero before any sample landed there.
    pub fn pixel(&self, x: u32, y: u32) -> RadianceSample {
        let i = self.index(x, y);
        let count = self.sample_counts[i];
        if count == 0 {
            return RadianceSample::default();
        }

        let scale = 1.0 / count as f32;
        RadianceSample {
            radiance: self.radiance[i] * scale,
            albedo: self.albedo[i] * scale,
            normal: self.normal[i] * scale,
        }
    }

    /// Add the sample sums of one bucket.
    pub fn accumulate(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        debug_assert!(bucket.x + bucket.width <= self.width);
        debug_assert!(bucket.y + bucket.height <= self.height);

        for (local, sum) in result.pixels.iter().enumerate() {
            let local = local as u32;
            let x = bucket.x + local % bucket.width;
            let y = bucket.y + local / bucket.width;
            let i = self.index(x, y);

            self.radiance[i] += sum.radiance;
            self.albedo[i] += sum.albedo;
            self.normal[i] += sum.normal;
            self.sample_counts[i] += result.samples_per_pixel;
        }
    }

    /// Discard everything accumulated so far.
    pub fn clear(&mut self) {
        self.radiance.fill(Color::ZERO);
        self.albedo.fill(Color::ZERO);
        self.normal.fill(Vec3::ZERO);
        self.sample_counts.fill(0);
        self.passes = 0;
    }

    /// Mean radiance as 8-bit RGBA, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                bytes.extend_from_slice(&color_to_rgba(self.pixel(x, y).radiance));
            }
        }
        bytes
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Render one progressive pass of `samples_per_pixel` samples with an
/// integrator.
pub fn render(
    scene: &Scene,
    integrator: &dyn Integrator,
    target: &mut RenderTarget,
    samples_per_pixel: u32,
    config: &RenderConfig,
) -> RenderResult<()> {
    render_with(scene, target, samples_per_pixel, config, |ray, sampler| {
        integrator.sample(scene, ray, sampler)
    })
}

/// Render one progressive pass, estimating each camera ray with `per_sample`.
///
/// Buckets run in parallel. Each owns a sampler derived from the seed, its
/// index and the pass number, so a pass is reproducible regardless of
/// thread scheduling.
pub fn render_with<F>(
    scene: &Scene,
    target: &mut RenderTarget,
    samples_per_pixel: u32,
    config: &RenderConfig,
    per_sample: F,
) -> RenderResult<()>
where
    F: Fn(Ray, &mut Sampler) -> RadianceSample + Send + Sync,
{
    if !scene.is_built() {
        return Err(SceneError::AccelerationStructureNotBuilt.into());
    }
    let camera = scene.camera().ok_or(SceneError::MissingCamera)?;
    let (width, height) = (target.width(), target.height());
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyTarget);
    }

    if scene.needs_rebuild() {
        log::warn!("Rendering a stale scene snapshot; objects were added after the last build");
    }
    let aspect = width as f32 / height as f32;
    if (camera.aspect_ratio() - aspect).abs() > 1e-3 {
        log::warn!(
            "Camera aspect ratio {:.3} does not match target {}x{}",
            camera.aspect_ratio(),
            width,
            height
        );
    }

    let buckets = generate_buckets(width, height, config.bucket_size.max(1));
    let pass = target.passes();
    let start = Instant::now();
    log::info!(
        "Render pass {}: {} buckets, {} spp, {}x{}",
        pass,
        buckets.len(),
        samples_per_pixel,
        width,
        height
    );

    let shade = |film: Vec2, sampler: &mut Sampler| {
        let ray = camera.generate_ray(film, sampler);
        per_sample(ray, sampler)
    };

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut sampler = Sampler::for_tile(config.seed, bucket.index, pass);
            render_bucket(bucket, width, height, samples_per_pixel, &mut sampler, &shade)
        })
        .collect();

    for result in &results {
        target.accumulate(result);
    }
    target.passes += 1;

    log::info!("Render pass {} finished in {:.2?}", pass, start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::test_scenes::cornell_box;
    use crate::{Camera, ConstantSky, DebugIntegrator, DebugMode, Lambertian, Object, Sphere, StandardIntegrator};
    use std::sync::Arc;

    fn sky_scene() -> Scene {
        let mut scene = Scene::new()
            .with_camera(Camera::new().with_aspect_ratio(2.0))
            .with_environment(ConstantSky::new(Color::splat(0.5)));
        scene.add(Object::new(
            Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0),
            Arc::new(Lambertian::new(Color::splat(0.5))),
        ));
        scene
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
        assert_eq!(color_to_rgba(Color::new(2.0, 0.25, -1.0)), [255, 127, 0, 255]);
    }

    #[test]
    fn test_render_requires_built_scene() {
        let scene = sky_scene();
        let mut target = RenderTarget::new(8, 4);
        let err = render(&scene, &DebugIntegrator::default(), &mut target, 1, &RenderConfig::default())
            .unwrap_err();
        assert_eq!(err, RenderError::Scene(SceneError::AccelerationStructureNotBuilt));
        assert_eq!(target.passes(), 0);
    }

    #[test]
    fn test_render_requires_camera() {
        let mut scene = Scene::new();
        scene.add(Object::new(Sphere::new(Vec3::ZERO, 1.0), Arc::new(Lambertian::new(Color::ONE))));
        scene.build_acceleration_structure().unwrap();

        let mut target = RenderTarget::new(4, 4);
        let err = render(&scene, &DebugIntegrator::default(), &mut target, 1, &RenderConfig::default())
            .unwrap_err();
        assert_eq!(err, RenderError::Scene(SceneError::MissingCamera));
    }

    #[test]
    fn test_passes_accumulate_samples() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut scene = sky_scene();
        scene.build_acceleration_structure().unwrap();

        let config = RenderConfig {
            bucket_size: 5,
            seed: 3,
        };
        let mut target = RenderTarget::new(24, 12);
        let integrator = StandardIntegrator::default();

        render(&scene, &integrator, &mut target, 2, &config).unwrap();
        render(&scene, &integrator, &mut target, 3, &config).unwrap();

        assert_eq!(target.passes(), 2);
        for y in 0..12 {
            for x in 0..24 {
                assert_eq!(target.sample_count(x, y), 5);
            }
        }

        // Corners see only sky
        assert_eq!(target.pixel(0, 0).radiance, Color::splat(0.5));
        assert_eq!(target.pixel(0, 0).albedo, Color::ZERO);
        // The center sees the diffuse sphere lit by a dimmer-than-sky bounce
        let center = target.pixel(12, 6);
        assert_eq!(center.albedo, Color::splat(0.5));
        assert!(center.radiance.x > 0.0 && center.radiance.x < 0.5);

        target.clear();
        assert_eq!(target.passes(), 0);
        assert_eq!(target.pixel(12, 6), RadianceSample::default());
    }

    #[test]
    fn test_render_is_deterministic_per_seed() {
        let mut scene = cornell_box();
        scene.build_acceleration_structure().unwrap();
        let integrator = StandardIntegrator::default();
        let config = RenderConfig::default();

        let mut a = RenderTarget::new(20, 20);
        let mut b = RenderTarget::new(20, 20);
        render(&scene, &integrator, &mut a, 2, &config).unwrap();
        render(&scene, &integrator, &mut b, 2, &config).unwrap();

        assert_eq!(a.to_rgba(), b.to_rgba());
        assert!(a.to_rgba().iter().any(|&v| v > 0 && v < 255));
    }

    #[test]
    fn test_render_with_custom_estimator() {
        let mut scene = sky_scene();
        scene.build_acceleration_structure().unwrap();
        let mut target = RenderTarget::new(16, 8);

        render_with(&scene, &mut target, 1, &RenderConfig::default(), |ray, _sampler| RadianceSample {
            radiance: ray.direction(),
            ..Default::default()
        })
        .unwrap();

        // Left half of the image looks towards -X
        assert!(target.pixel(0, 4).radiance.x < 0.0);
        assert!(target.pixel(15, 4).radiance.x > 0.0);

        let mut debug = RenderTarget::new(16, 8);
        render(&scene, &DebugIntegrator::new(DebugMode::Albedo), &mut debug, 1, &RenderConfig::default())
            .unwrap();
        assert_eq!(debug.pixel(8, 4).radiance, Color::splat(0.5));
    }
}
