//! Material trait for surface scattering.
//!
//! Materials hold only immutable parameters, so evaluation is safe from any
//! number of render threads. Every evaluation returns zero rather than
//! failing when a direction carries no contribution.

use std::f32::consts::FRAC_1_PI;

use crate::{sampling, Intersection, Sampler};
use tern_math::{Frame, Vec3};

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// Density attached to a sampled direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pdf {
    /// Solid-angle density of a finite distribution.
    Finite(f32),
    /// Dirac delta lobe; light sampling can never produce this direction.
    Specular,
}

impl Pdf {
    #[inline]
    pub fn is_specular(&self) -> bool {
        matches!(self, Pdf::Specular)
    }

    /// The finite density, or `None` for a delta lobe.
    #[inline]
    pub fn value(&self) -> Option<f32> {
        match *self {
            Pdf::Finite(pdf) => Some(pdf),
            Pdf::Specular => None,
        }
    }
}

/// Result of importance sampling a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BsdfSample {
    /// Sampled incident direction (world space, unit length)
    pub wi: Vec3,
    /// `bsdf(wo, wi) * |cos(theta_i)| / pdf(wi)`; zero when absorbed
    pub weight: Color,
    pub pdf: Pdf,
}

impl BsdfSample {
    /// A sample that carries no energy.
    pub fn absorbed(wi: Vec3) -> Self {
        Self {
            wi,
            weight: Color::ZERO,
            pdf: Pdf::Finite(0.0),
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// `bsdf(wo, wi) * |cos(theta_i)|` for an explicitly chosen direction.
    fn bsdf_cos(&self, it: &Intersection, sampler: &mut Sampler, wi: Vec3) -> Color;

    /// Importance sample an incident direction.
    fn eval_and_sample(&self, it: &Intersection, sampler: &mut Sampler) -> BsdfSample;

    /// Solid-angle density `eval_and_sample` would assign to `wi`.
    fn pdf(&self, it: &Intersection, wi: Vec3) -> f32;

    /// Radiance emitted towards `wo`. One-sided: zero when `dot(wo, n) <= 0`.
    fn emission(&self, _wo: Vec3, _n: Vec3, _shading_n: Vec3) -> Color {
        Color::ZERO
    }

    /// Direction-independent reflectance, used for auxiliary outputs only.
    fn albedo(&self) -> Color;

    /// True if the material is a pure delta distribution (mirror, glass)
    fn is_specular(&self) -> bool {
        false
    }

    /// True if the material emits light
    fn is_emissive(&self) -> bool {
        false
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn bsdf_cos(&self, it: &Intersection, _sampler: &mut Sampler, wi: Vec3) -> Color {
        let cos_i = it.facing_frame().to_local(wi).z;
        if cos_i <= 0.0 {
            return Color::ZERO;
        }
        self.albedo * FRAC_1_PI * cos_i
    }

    fn eval_and_sample(&self, it: &Intersection, sampler: &mut Sampler) -> BsdfSample {
        let frame = it.facing_frame();
        let local = sampling::cosine_sample_hemisphere(sampler.rand_vec2());
        let wi = frame.to_world(local);

        // Catch degenerate grazing samples
        let pdf = sampling::cosine_hemisphere_pdf(local.z);
        if pdf <= 0.0 {
            return BsdfSample::absorbed(wi);
        }

        BsdfSample {
            wi,
            weight: self.albedo,
            pdf: Pdf::Finite(pdf),
        }
    }

    fn pdf(&self, it: &Intersection, wi: Vec3) -> f32 {
        sampling::cosine_hemisphere_pdf(it.facing_frame().to_local(wi).z)
    }

    fn albedo(&self) -> Color {
        self.albedo
    }
}

/// Glossy reflector using a normalized Phong lobe around the mirror direction.
#[derive(Debug, Clone)]
pub struct Glossy {
    albedo: Color,
    exponent: f32,
}

impl Glossy {
    /// - `albedo`: Reflectance at the lobe peak
    /// - `exponent`: Phong exponent, higher = sharper highlight
    pub fn new(albedo: Color, exponent: f32) -> Self {
        Self {
            albedo,
            exponent: exponent.max(0.0),
        }
    }

    /// Map a perceptual roughness in (0, 1] to a Phong exponent.
    pub fn from_roughness(albedo: Color, roughness: f32) -> Self {
        let r = roughness.clamp(1e-3, 1.0);
        Self::new(albedo, (2.0 / (r * r) - 2.0).max(0.0))
    }

    pub fn exponent(&self) -> f32 {
        self.exponent
    }

    fn lobe_frame(frame: &Frame, wo: Vec3) -> Frame {
        let wo_local = frame.to_local(wo);
        let mirror_local = Vec3::new(-wo_local.x, -wo_local.y, wo_local.z);
        Frame::from_normal(frame.to_world(mirror_local).normalize())
    }
}

impl Material for Glossy {
    fn bsdf_cos(&self, it: &Intersection, _sampler: &mut Sampler, wi: Vec3) -> Color {
        let frame = it.facing_frame();
        let cos_i = frame.to_local(wi).z;
        if cos_i <= 0.0 {
            return Color::ZERO;
        }
        let cos_alpha = Self::lobe_frame(&frame, it.wo).normal.dot(wi);
        if cos_alpha <= 0.0 {
            return Color::ZERO;
        }
        let norm = (self.exponent + 2.0) * 0.5 * FRAC_1_PI;
        self.albedo * norm * cos_alpha.powf(self.exponent) * cos_i
    }

    fn eval_and_sample(&self, it: &Intersection, sampler: &mut Sampler) -> BsdfSample {
        let frame = it.facing_frame();
        let lobe = Self::lobe_frame(&frame, it.wo);
        let local = sampling::power_cosine_sample(sampler.rand_vec2(), self.exponent);
        let wi = lobe.to_world(local);

        let pdf = sampling::power_cosine_pdf(local.z, self.exponent);
        let cos_i = frame.to_local(wi).z;
        if pdf <= 0.0 || cos_i <= 0.0 {
            // Lobe sample ended up below the surface
            return BsdfSample {
                wi,
                weight: Color::ZERO,
                pdf: Pdf::Finite(pdf),
            };
        }

        let weight = self.albedo * ((self.exponent + 2.0) / (self.exponent + 1.0)) * cos_i;
        BsdfSample {
            wi,
            weight,
            pdf: Pdf::Finite(pdf),
        }
    }

    fn pdf(&self, it: &Intersection, wi: Vec3) -> f32 {
        let lobe = Self::lobe_frame(&it.facing_frame(), it.wo);
        sampling::power_cosine_pdf(lobe.normal.dot(wi), self.exponent)
    }

    fn albedo(&self) -> Color {
        self.albedo
    }
}

/// Perfect mirror ("metallic") with a reflectance tint.
#[derive(Debug, Clone)]
pub struct Mirror {
    tint: Color,
}

impl Mirror {
    pub fn new(tint: Color) -> Self {
        Self { tint }
    }
}

impl Material for Mirror {
    fn bsdf_cos(&self, _it: &Intersection, _sampler: &mut Sampler, _wi: Vec3) -> Color {
        // A delta lobe has no value for an explicitly chosen direction
        Color::ZERO
    }

    fn eval_and_sample(&self, it: &Intersection, _sampler: &mut Sampler) -> BsdfSample {
        let n = it.facing_frame().normal;
        BsdfSample {
            wi: reflect(-it.wo, n),
            weight: self.tint,
            pdf: Pdf::Specular,
        }
    }

    fn pdf(&self, _it: &Intersection, _wi: Vec3) -> f32 {
        unimplemented!("Mirror is a delta distribution and has no finite pdf")
    }

    fn albedo(&self) -> Color {
        self.tint
    }

    fn is_specular(&self) -> bool {
        true
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn bsdf_cos(&self, _it: &Intersection, _sampler: &mut Sampler, _wi: Vec3) -> Color {
        Color::ZERO
    }

    fn eval_and_sample(&self, it: &Intersection, sampler: &mut Sampler) -> BsdfSample {
        let refraction_ratio = if it.front_face { 1.0 / self.ior } else { self.ior };
        let n = it.facing_frame().normal;

        let unit_direction = -it.wo;
        let cos_theta = it.wo.dot(n).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let wi = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > sampler.randf()
        {
            reflect(unit_direction, n)
        } else {
            refract(unit_direction, n, refraction_ratio)
        };

        BsdfSample {
            wi: wi.normalize_or_zero(),
            weight: Color::ONE,
            pdf: Pdf::Specular,
        }
    }

    fn pdf(&self, _it: &Intersection, _wi: Vec3) -> f32 {
        unimplemented!("Dielectric is a delta distribution and has no finite pdf")
    }

    fn albedo(&self) -> Color {
        Color::ONE
    }

    fn is_specular(&self) -> bool {
        true
    }
}

/// One-sided diffuse light emitter. Does not reflect.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn bsdf_cos(&self, _it: &Intersection, _sampler: &mut Sampler, _wi: Vec3) -> Color {
        Color::ZERO
    }

    fn eval_and_sample(&self, it: &Intersection, _sampler: &mut Sampler) -> BsdfSample {
        // Lights don't scatter rays
        BsdfSample::absorbed(it.normal)
    }

    fn pdf(&self, _it: &Intersection, _wi: Vec3) -> f32 {
        0.0
    }

    fn emission(&self, wo: Vec3, n: Vec3, _shading_n: Vec3) -> Color {
        if wo.dot(n) <= 0.0 {
            Color::ZERO
        } else {
            self.emit
        }
    }

    fn albedo(&self) -> Color {
        Color::ZERO
    }

    fn is_emissive(&self) -> bool {
        self.emit.max_element() > 0.0
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a vector through a surface.
#[inline]
pub(crate) fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Object, Quad};
    use std::sync::Arc;
    use tern_math::{Ray, Vec2};

    /// Unit floor quad at y=0 facing +Y carrying `material`.
    fn floor(material: Arc<dyn Material>) -> Object {
        Object::new(
            Quad::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 0.0)),
            material,
        )
    }

    fn hit_from_above<'a>(object: &'a Object, dir: Vec3) -> Intersection<'a> {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0) - dir, dir);
        Intersection::new(&ray, 1.0, Vec3::ZERO, Vec3::Y, Vec2::ZERO, object, 0)
    }

    #[test]
    fn test_lambertian_sample_matches_eval() {
        let object = floor(Arc::new(Lambertian::new(Color::new(0.8, 0.5, 0.2))));
        let it = hit_from_above(&object, Vec3::new(0.3, -1.0, 0.1).normalize());
        let material = it.material();
        let mut sampler = Sampler::new(13);

        for _ in 0..100 {
            let s = material.eval_and_sample(&it, &mut sampler);
            let pdf = s.pdf.value().unwrap();
            assert!(s.wi.y > 0.0);
            assert!((material.pdf(&it, s.wi) - pdf).abs() < 1e-4);

            // weight == bsdf_cos / pdf
            let f = material.bsdf_cos(&it, &mut sampler, s.wi);
            assert!((f / pdf - s.weight).length() < 1e-3);
        }
    }

    #[test]
    fn test_lambertian_zero_below_surface() {
        let object = floor(Arc::new(Lambertian::new(Color::ONE)));
        let it = hit_from_above(&object, -Vec3::Y);
        let mut sampler = Sampler::new(1);

        assert_eq!(it.material().bsdf_cos(&it, &mut sampler, -Vec3::Y), Color::ZERO);
        assert_eq!(it.material().pdf(&it, -Vec3::Y), 0.0);
    }

    #[test]
    fn test_lambertian_is_two_sided() {
        let object = floor(Arc::new(Lambertian::new(Color::ONE)));
        // Seen from below the floor
        let ray = Ray::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        let it = Intersection::new(&ray, 1.0, Vec3::ZERO, Vec3::Y, Vec2::ZERO, &object, 0);
        let mut sampler = Sampler::new(2);

        assert!(!it.front_face);
        assert!(it.material().bsdf_cos(&it, &mut sampler, -Vec3::Y).x > 0.0);
        let s = it.material().eval_and_sample(&it, &mut sampler);
        assert!(s.wi.y < 0.0);
    }

    #[test]
    fn test_glossy_sample_matches_eval() {
        let object = floor(Arc::new(Glossy::new(Color::splat(0.9), 30.0)));
        let it = hit_from_above(&object, Vec3::new(0.5, -1.0, 0.0).normalize());
        let material = it.material();
        let mut sampler = Sampler::new(17);

        for _ in 0..200 {
            let s = material.eval_and_sample(&it, &mut sampler);
            let pdf = s.pdf.value().unwrap();
            assert!((material.pdf(&it, s.wi) - pdf).abs() < 1e-2 * pdf.max(1.0));
            if s.weight == Color::ZERO {
                continue;
            }
            let f = material.bsdf_cos(&it, &mut sampler, s.wi);
            assert!((f / pdf - s.weight).length() < 1e-2);
        }
    }

    #[test]
    fn test_glossy_roughness_mapping() {
        assert!(Glossy::from_roughness(Color::ONE, 0.1).exponent() > 100.0);
        assert_eq!(Glossy::from_roughness(Color::ONE, 1.0).exponent(), 0.0);
    }

    #[test]
    fn test_mirror_reflects_with_specular_pdf() {
        let object = floor(Arc::new(Mirror::new(Color::splat(0.9))));
        let dir = Vec3::new(1.0, -1.0, 0.0).normalize();
        let it = hit_from_above(&object, dir);
        let mut sampler = Sampler::new(3);

        let s = it.material().eval_and_sample(&it, &mut sampler);
        assert!(s.pdf.is_specular());
        assert!((s.wi - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-5);
        assert_eq!(it.material().bsdf_cos(&it, &mut sampler, s.wi), Color::ZERO);
        assert!(it.material().is_specular());
    }

    #[test]
    #[should_panic]
    fn test_mirror_pdf_is_not_implemented() {
        let object = floor(Arc::new(Mirror::new(Color::ONE)));
        let it = hit_from_above(&object, -Vec3::Y);
        it.material().pdf(&it, Vec3::Y);
    }

    #[test]
    fn test_dielectric_transmits_or_reflects() {
        let object = floor(Arc::new(Dielectric::new(1.5)));
        let it = hit_from_above(&object, -Vec3::Y);
        let mut sampler = Sampler::new(4);

        let mut transmitted = 0;
        for _ in 0..100 {
            let s = it.material().eval_and_sample(&it, &mut sampler);
            assert!(s.pdf.is_specular());
            assert!((s.wi.length() - 1.0).abs() < 1e-4);
            if s.wi.y < 0.0 {
                transmitted += 1;
            }
        }
        // Normal incidence reflects about 4% of the time
        assert!(transmitted > 80);
    }

    #[test]
    fn test_diffuse_light_is_one_sided() {
        let light = DiffuseLight::new(Color::splat(4.0));

        assert_eq!(light.emission(Vec3::Y, Vec3::Y, Vec3::Y), Color::splat(4.0));
        assert_eq!(light.emission(-Vec3::Y, Vec3::Y, Vec3::Y), Color::ZERO);
        assert!(light.is_emissive());
        assert!(!DiffuseLight::new(Color::ZERO).is_emissive());
    }

    #[test]
    fn test_pdf_enum() {
        assert_eq!(Pdf::Finite(0.5).value(), Some(0.5));
        assert_eq!(Pdf::Specular.value(), None);
        assert!(!Pdf::Finite(1.0).is_specular());
    }
}
