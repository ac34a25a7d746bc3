//! Tern math - geometry types shared by the renderer.
//!
//! Re-exports glam and adds the ray tracing primitives the BVH and
//! integrators are written against.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod frame;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use frame::Frame;
pub use interval::Interval;
pub use ray::Ray;
