//! Distant lighting returned for rays that escape the scene.

use crate::Color;
use tern_math::Vec3;

/// Radiance arriving from infinitely far away along a direction.
pub trait Environment: Send + Sync {
    fn radiance(&self, direction: Vec3) -> Color;
}

/// Uniform radiance in every direction.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSky {
    pub color: Color,
}

impl ConstantSky {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Environment for ConstantSky {
    fn radiance(&self, _direction: Vec3) -> Color {
        self.color
    }
}

/// Vertical blend from `horizon` (looking down) to `zenith` (looking up).
#[derive(Debug, Clone, Copy)]
pub struct GradientSky {
    pub horizon: Color,
    pub zenith: Color,
}

impl GradientSky {
    pub fn new(horizon: Color, zenith: Color) -> Self {
        Self { horizon, zenith }
    }
}

impl Default for GradientSky {
    /// White to light blue.
    fn default() -> Self {
        Self::new(Color::ONE, Color::new(0.5, 0.7, 1.0))
    }
}

impl Environment for GradientSky {
    fn radiance(&self, direction: Vec3) -> Color {
        let unit = direction.normalize_or_zero();
        let a = 0.5 * (unit.y + 1.0);
        (1.0 - a) * self.horizon + a * self.zenith
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_sky() {
        let sky = ConstantSky::new(Color::splat(0.25));
        assert_eq!(sky.radiance(Vec3::X), Color::splat(0.25));
        assert_eq!(sky.radiance(-Vec3::Y), Color::splat(0.25));
    }

    #[test]
    fn test_gradient_sky_endpoints() {
        let sky = GradientSky::default();
        assert!((sky.radiance(Vec3::Y) - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((sky.radiance(-Vec3::Y) - Color::ONE).length() < 1e-6);

        // Unnormalized directions give the same answer
        assert_eq!(sky.radiance(Vec3::new(0.0, 5.0, 0.0)), sky.radiance(Vec3::Y));
    }
}
