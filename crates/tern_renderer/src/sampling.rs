//! Warping functions from the unit square to directions.
//!
//! All directions are in a local frame with +Z as the surface normal.

use std::f32::consts::{FRAC_1_PI, FRAC_PI_4, PI};

use tern_math::{Vec2, Vec3};

/// Maps the unit square to the unit disk (Shirley-Chiu concentric mapping).
pub fn square_to_disk(u: Vec2) -> Vec2 {
    let x = 2.0 * u.x - 1.0;
    let y = 2.0 * u.y - 1.0;

    if x == 0.0 && y == 0.0 {
        return Vec2::ZERO;
    }

    let (radius, angle) = if x.abs() > y.abs() {
        (x, FRAC_PI_4 * (y / x))
    } else {
        (y, 2.0 * FRAC_PI_4 - FRAC_PI_4 * (x / y))
    };

    Vec2::new(radius * angle.cos(), radius * angle.sin())
}

/// Cosine-weighted direction on the +Z hemisphere.
pub fn cosine_sample_hemisphere(u: Vec2) -> Vec3 {
    let d = square_to_disk(u);
    let z = (1.0 - d.length_squared()).max(0.0).sqrt();
    Vec3::new(d.x, d.y, z)
}

/// Density of [`cosine_sample_hemisphere`] for a direction with the given cosine.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: f32) -> f32 {
    if cos_theta <= 0.0 {
        0.0
    } else {
        cos_theta * FRAC_1_PI
    }
}

/// Uniform direction on the unit sphere.
pub fn uniform_sample_sphere(u: Vec2) -> Vec3 {
    let z = 1.0 - 2.0 * u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Direction around +Z distributed proportionally to `cos^exponent`.
pub fn power_cosine_sample(u: Vec2, exponent: f32) -> Vec3 {
    let cos_theta = u.x.powf(1.0 / (exponent + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Density of [`power_cosine_sample`].
#[inline]
pub fn power_cosine_pdf(cos_theta: f32, exponent: f32) -> f32 {
    if cos_theta <= 0.0 {
        0.0
    } else {
        (exponent + 1.0) * 0.5 * FRAC_1_PI * cos_theta.powf(exponent)
    }
}
