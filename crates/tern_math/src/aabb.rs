use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// [`Aabb::EMPTY`] has `min = +inf` and `max = -inf` on every axis, so merging
/// it with any box yields that box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points.
    ///
    /// Axes thinner than the padding threshold are widened so that flat
    /// geometry (axis-aligned quads) still has a hittable box.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));

        Self::new(x, y, z)
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Grow this box to also enclose `other`.
    #[inline]
    pub fn merge(&mut self, other: &Aabb) {
        *self = Aabb::surrounding(self, other);
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    #[inline]
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Returns true if the box encloses no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Total area of the six faces. Zero for an empty box.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let (dx, dy, dz) = (self.x.size(), self.y.size(), self.z.size());
        2.0 * (dx * dy + dy * dz + dz * dx)
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(self.x.center(), self.y.center(), self.z.center())
    }

    /// Test if a ray intersects this AABB within the given interval.
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        self.intersect(r, ray_t).is_some()
    }

    /// Slab test returning the parametric entry distance, clamped to
    /// `ray_t.min` when the origin is inside the box.
    ///
    /// Uses the ray's cached reciprocal direction. A zero direction component
    /// gives a reciprocal of +-inf; when the origin also lies exactly on that
    /// slab plane the product is NaN, which `f32::max`/`f32::min` discard, so
    /// the axis neither accepts nor rejects on its own.
    pub fn intersect(&self, r: &Ray, mut ray_t: Interval) -> Option<f32> {
        let origin = r.origin();
        let inv_dir = r.inv_direction();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = inv_dir[axis];
            let mut t0 = (slab.min - origin[axis]) * adinv;
            let mut t1 = (slab.max - origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return None;
            }
        }

        Some(ray_t.min)
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    /// The empty box, identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let b = Aabb::from_points(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));

        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &b), b);

        let mut acc = Aabb::EMPTY;
        acc.merge(&b);
        assert_eq!(acc, b);
        assert!(Aabb::EMPTY.is_empty());
        assert_eq!(Aabb::EMPTY.surface_area(), 0.0);
    }

    #[test]
    fn test_surface_area() {
        let b = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert!((b.surface_area() - 22.0).abs() < 1e-5);
        assert!((unit_box().surface_area() - 24.0).abs() < 1e-5);
    }

    #[test]
    fn test_flat_box_is_padded() {
        let flat = Aabb::from_points(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 2.0));
        assert!(flat.y.size() > 0.0);

        let ray = Ray::new(Vec3::new(1.0, 5.0, 1.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(flat.hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_intersect_reports_entry_distance() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let t = unit_box()
            .intersect(&ray, Interval::new(0.0, f32::INFINITY))
            .unwrap();
        assert!((t - 4.0).abs() < 1e-6);

        // Origin inside: entry clamps to the interval start
        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        let t = unit_box().intersect(&inside, Interval::new(0.0, 10.0)).unwrap();
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_intersect_respects_interval() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        assert!(!unit_box().hit(&ray, Interval::new(0.0, 3.0)));
        assert!(!unit_box().hit(&ray, Interval::new(6.5, 10.0)));
    }

    #[test]
    fn test_zero_direction_components() {
        // Parallel to x and y slabs while inside them
        let ray = Ray::new(Vec3::new(0.5, -0.5, -3.0), Vec3::Z);
        assert!(unit_box().hit(&ray, Interval::UNIVERSE));

        // Parallel but outside the y slab
        let ray = Ray::new(Vec3::new(0.0, 1.5, -3.0), Vec3::Z);
        assert!(!unit_box().hit(&ray, Interval::new(0.0, f32::INFINITY)));

        // Negative zero direction component
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(-0.0, 0.0, 1.0));
        assert!(unit_box().hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_origin_on_slab_plane() {
        // 0 * inf on the x slab boundary must not reject the box
        let ray = Ray::new(Vec3::new(1.0, 0.0, -3.0), Vec3::Z);
        assert!(unit_box().hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_empty_box_is_never_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        assert!(!Aabb::EMPTY.hit(&ray, Interval::UNIVERSE));
    }

    #[test]
    fn test_aabb_centroid_and_corners() {
        let b = Aabb::from_points(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 10.0, 4.0));

        assert_eq!(b.centroid(), Vec3::new(5.0, 5.0, 2.0));
        assert_eq!(b.min(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(b.max(), Vec3::new(10.0, 10.0, 4.0));
    }
}
