use crate::Vec3;

/// A ray in 3D space.
///
/// `t_max` bounds the valid parameter range `(0, t_max)`. Closest-hit
/// queries narrow it as nearer intersections are found, so a ray that has
/// been traced carries the distance to its hit. The reciprocal direction is
/// cached for the slab test; zero components become signed infinities.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
    /// Upper bound of the parameter range
    pub t_max: f32,
    /// Number of bounces that led to this ray (0 for camera rays)
    pub depth: u32,
}

impl Ray {
    /// Create a new unbounded ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
            t_max: f32::INFINITY,
            depth: 0,
        }
    }

    /// Create a ray bounded by `t_max`.
    pub fn segment(origin: Vec3, direction: Vec3, t_max: f32) -> Self {
        Self {
            t_max,
            ..Self::new(origin, direction)
        }
    }

    /// Set the bounce depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Componentwise reciprocal of the direction.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Y);

        assert_eq!(ray.at(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.at(2.0), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_new_ray_is_unbounded() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.t_max, f32::INFINITY);
        assert_eq!(ray.depth, 0);
    }

    #[test]
    fn test_inverse_direction_handles_zero_components() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, -0.0));
        let inv = ray.inv_direction();

        assert_eq!(inv.x, 0.5);
        assert_eq!(inv.y, f32::INFINITY);
        assert_eq!(inv.z, f32::NEG_INFINITY);
    }

    #[test]
    fn test_segment_and_depth() {
        let ray = Ray::segment(Vec3::ZERO, Vec3::Z, 3.0).with_depth(4);

        assert_eq!(ray.t_max, 3.0);
        assert_eq!(ray.depth, 4);
        assert_eq!(ray.direction(), Vec3::Z);
    }
}
