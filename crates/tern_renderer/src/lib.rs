//! Tern renderer - CPU path tracing core
//!
//! A SAH bounding volume hierarchy, a material contract and two Monte Carlo
//! path integrators (pure BSDF sampling, and next-event estimation combined
//! with BSDF sampling by multiple importance sampling), rendered tile by
//! tile in parallel into a progressive accumulation target.

mod bucket;
mod bvh;
mod camera;
mod environment;
pub mod integrator;
mod interaction;
mod material;
pub mod mis;
mod object;
mod quad;
mod renderer;
mod sampler;
pub mod sampling;
mod scene;
mod shape;
mod sphere;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhHit, BvhNode, BvhNodeKind, Primitive};
pub use camera::Camera;
pub use environment::{ConstantSky, Environment, GradientSky};
pub use integrator::{
    DebugIntegrator, DebugMode, Integrator, IntegratorConfig, NaiveIntegrator, RadianceSample,
    StandardIntegrator,
};
pub use interaction::Intersection;
pub use material::{
    BsdfSample, Color, Dielectric, DiffuseLight, Glossy, Lambertian, Material, Mirror, Pdf,
};
pub use object::Object;
pub use quad::Quad;
pub use renderer::{
    color_to_rgba, linear_to_gamma, render, render_with, RenderConfig, RenderError, RenderResult,
    RenderTarget,
};
pub use sampler::Sampler;
pub use scene::{LightSample, Scene, SceneError, SceneResult};
pub use shape::{Shape, ShapeHit, SurfaceSample};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export common math types from tern_math
pub use tern_math::{Aabb, Frame, Interval, Ray, Vec2, Vec3};
