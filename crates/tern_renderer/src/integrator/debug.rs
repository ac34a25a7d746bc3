//! Single-bounce visualizations for inspecting scenes and the BVH.

use serde::{Deserialize, Serialize};

use super::{Integrator, RadianceSample};
use crate::{Color, Sampler, Scene};
use tern_math::Ray;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebugMode {
    /// Camera-facing shading normal mapped from [-1, 1] to [0, 1]
    #[default]
    ShadingNormal,
    Albedo,
    /// Depth of the hit primitive's leaf, divided by the tree's max depth
    BvhDepth,
    /// Hit distance, divided by `max_distance`
    HitDistance,
}

/// Shows one property of the first hit instead of lighting.
#[derive(Debug, Clone)]
pub struct DebugIntegrator {
    pub mode: DebugMode,
    pub max_distance: f32,
}

impl DebugIntegrator {
    pub fn new(mode: DebugMode) -> Self {
        Self {
            mode,
            max_distance: 10.0,
        }
    }
}

impl Default for DebugIntegrator {
    fn default() -> Self {
        Self::new(DebugMode::default())
    }
}

impl Integrator for DebugIntegrator {
    fn sample(&self, scene: &Scene, mut ray: Ray, _sampler: &mut Sampler) -> RadianceSample {
        let Some(it) = scene.intersect(&mut ray) else {
            return RadianceSample::default();
        };

        let normal = it.facing_frame().normal;
        let albedo = it.material().albedo();

        let radiance = match self.mode {
            DebugMode::ShadingNormal => 0.5 * (normal + Color::ONE),
            DebugMode::Albedo => albedo,
            DebugMode::BvhDepth => {
                let bvh = scene.bvh();
                let depth = bvh.node(bvh.leaf_of(it.object_index)).depth;
                Color::splat(depth as f32 / bvh.max_depth().max(1) as f32)
            }
            DebugMode::HitDistance => Color::splat((it.t / self.max_distance).min(1.0)),
        };

        RadianceSample {
            radiance,
            albedo,
            normal,
        }
    }
}
