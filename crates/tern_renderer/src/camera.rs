//! Camera for primary ray generation.

use crate::{sampling, Sampler};
use tern_math::{Ray, Vec2, Vec3};

/// Thin-lens camera. A zero defocus angle gives a pinhole.
///
/// Film coordinates run over `[0, 1]²` with `(0, 0)` at the top-left corner
/// of the image.
#[derive(Debug, Clone)]
pub struct Camera {
    // Positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens
    vfov: f32,          // Vertical field of view in degrees
    defocus_angle: f32, // Cone angle of rays through each film point
    focus_dist: f32,    // Distance from camera to plane of perfect focus
    aspect_ratio: f32,  // width / height

    // Derived, recomputed by every builder method
    upper_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Camera at the origin looking down -Z with a 90 degree square view.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 1.0,
            aspect_ratio: 1.0,
            upper_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
        };
        camera.update();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.update();
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        debug_assert!(focus_dist > 0.0);
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self.update();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        debug_assert!(aspect_ratio > 0.0);
        self.aspect_ratio = aspect_ratio;
        self.update();
        self
    }

    pub fn position(&self) -> Vec3 {
        self.look_from
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        -self.w
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    fn update(&mut self) {
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * self.aspect_ratio;

        self.w = (self.look_from - self.look_at).normalize_or_zero();
        self.u = self.vup.cross(self.w).normalize_or_zero();
        self.v = self.w.cross(self.u);

        // Film v grows downwards
        self.horizontal = viewport_width * self.u;
        self.vertical = -viewport_height * self.v;
        self.upper_left =
            self.look_from - self.focus_dist * self.w - self.horizontal / 2.0 - self.vertical / 2.0;

        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;
    }

    /// Primary ray through `film`, with a unit direction.
    ///
    /// The sampler is only consumed when the lens has a nonzero aperture.
    pub fn generate_ray(&self, film: Vec2, sampler: &mut Sampler) -> Ray {
        let target = self.upper_left + film.x * self.horizontal + film.y * self.vertical;

        let origin = if self.defocus_angle <= 0.0 {
            self.look_from
        } else {
            let p = sampling::square_to_disk(sampler.rand_vec2());
            self.look_from + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
        };

        Ray::new(origin, (target - origin).normalize())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
