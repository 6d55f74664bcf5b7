//! Material system.
//!
//! Implements three material types: Lambertian (diffuse), Metal (specular),
//! and Dielectric (transparent). Scattering is resolved by matching on the
//! variant, so adding a material means adding a variant here.

use crate::hittable::HitRecord;
use crate::ray::Ray;
use crate::sampling::{near_zero, random_unit_vector, unit_vector};
use glam::Vec3A;
use rand::Rng;

/// RGB color with linear components, reusing the SIMD vector type.
pub type Color = Vec3A;

/// Surface material attached to scene objects.
///
/// A plain `Copy` value so hit records can carry it without indirection.
#[derive(Debug, Clone, Copy)]
pub enum Material {
    /// Lambertian diffuse material for matte surfaces.
    Lambertian {
        /// Surface reflectance per channel.
        albedo: Color,
    },

    /// Metallic material with specular reflection.
    Metal {
        /// Metal tint.
        albedo: Color,
        /// Surface roughness, `0.0` mirror to `1.0` rough.
        fuzz: f32,
    },

    /// Dielectric (transparent) material with refraction.
    Dielectric {
        /// Index of refraction: `1.0` air, `1.5` glass.
        refraction_index: f32,
    },
}

impl Material {
    /// Matte surface with the given reflectance.
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian { albedo }
    }

    /// Reflective surface; `fuzz` is clamped into `[0, 1]`.
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Transparent surface with the given index of refraction.
    pub fn dielectric(refraction_index: f32) -> Self {
        Material::Dielectric { refraction_index }
    }

    /// Resolve how an incoming ray continues after hitting this material.
    ///
    /// Returns the per-channel attenuation and the scattered ray, or `None`
    /// when the surface absorbs the ray.
    pub fn scatter<R: Rng>(
        &self,
        r_in: &Ray,
        rec: &HitRecord,
        rng: &mut R,
    ) -> Option<(Color, Ray)> {
        match *self {
            Material::Lambertian { albedo } => self.scatter_lambertian(albedo, rec, rng),
            Material::Metal { albedo, fuzz } => self.scatter_metal(albedo, fuzz, r_in, rec, rng),
            Material::Dielectric { refraction_index } => {
                self.scatter_dielectric(refraction_index, r_in, rec, rng)
            }
        }
    }

    /// Diffuse bounce biased toward the normal, cosine-weighted.
    fn scatter_lambertian<R: Rng>(
        &self,
        albedo: Color,
        rec: &HitRecord,
        rng: &mut R,
    ) -> Option<(Color, Ray)> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // The random vector can cancel the normal almost exactly; fall back
        // to the normal itself rather than scatter a degenerate ray.
        if near_zero(scatter_direction) {
            scatter_direction = rec.normal;
        }

        Some((albedo, Ray::new(rec.p, scatter_direction)))
    }

    /// Mirror reflection, perturbed by `fuzz` times a random unit vector.
    fn scatter_metal<R: Rng>(
        &self,
        albedo: Color,
        fuzz: f32,
        r_in: &Ray,
        rec: &HitRecord,
        rng: &mut R,
    ) -> Option<(Color, Ray)> {
        let reflected = reflect(r_in.direction, rec.normal);
        let direction = unit_vector(reflected) + fuzz * random_unit_vector(rng);
        let scattered = Ray::new(rec.p, direction);

        // Fuzzing can push the bounce below the surface; treat that as
        // absorption.
        if scattered.direction.dot(rec.normal) > 0.0 {
            Some((albedo, scattered))
        } else {
            None
        }
    }

    /// Refraction with Snell's law, falling back to reflection at total
    /// internal reflection and probabilistically per Schlick's reflectance.
    fn scatter_dielectric<R: Rng>(
        &self,
        refraction_index: f32,
        r_in: &Ray,
        rec: &HitRecord,
        rng: &mut R,
    ) -> Option<(Color, Ray)> {
        let ri = if rec.front_face {
            1.0 / refraction_index
        } else {
            refraction_index
        };

        let unit_direction = unit_vector(r_in.direction);
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = ri * sin_theta > 1.0;
        let direction = if cannot_refract || reflectance(cos_theta, ri) > rng.random() {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, ri)
        };

        // Glass carries the full ray energy.
        Some((Color::ONE, Ray::new(rec.p, direction)))
    }
}

/// Reflect `v` off a surface with normal `n`.
fn reflect(v: Vec3A, n: Vec3A) -> Vec3A {
    v - 2.0 * v.dot(n) * n
}

/// Refract unit vector `uv` through an interface using Snell's law.
fn refract(uv: Vec3A, n: Vec3A, etai_over_etat: f32) -> Vec3A {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's polynomial approximation of Fresnel reflectance.
fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
    let r0 = (1.0 - refraction_index) / (1.0 + refraction_index);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};

    /// Hands out a fixed sequence of `[0, 1)` draws, panicking when a test
    /// consumes more randomness than it accounted for.
    struct SequenceRng {
        words: Vec<u32>,
        next: usize,
    }

    impl SequenceRng {
        /// Encode each value as the u32 word the float samplers map back to
        /// that value. Exact for dyadic fractions such as 0.25 and 0.5.
        fn new(values: &[f32]) -> Self {
            let words = values
                .iter()
                .map(|v| ((v * 16_777_216.0) as u32) << 8)
                .collect();
            Self { words, next: 0 }
        }
    }

    impl RngCore for SequenceRng {
        fn next_u32(&mut self) -> u32 {
            let word = self.words.get(self.next).copied();
            self.next += 1;
            word.expect("test draw sequence exhausted")
        }

        fn next_u64(&mut self) -> u64 {
            (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(4) {
                let word = self.next_u32().to_le_bytes();
                chunk.copy_from_slice(&word[..chunk.len()]);
            }
        }
    }

    fn record_with(normal: Vec3A, front_face: bool, material: Material) -> HitRecord {
        HitRecord {
            p: Vec3A::ZERO,
            normal,
            t: 1.0,
            front_face,
            material,
        }
    }

    #[test]
    fn metal_constructor_clamps_fuzz() {
        match Material::metal(Color::ONE, 7.0) {
            Material::Metal { fuzz, .. } => assert_eq!(fuzz, 1.0),
            other => panic!("unexpected variant {other:?}"),
        }
        match Material::metal(Color::ONE, -1.0) {
            Material::Metal { fuzz, .. } => assert_eq!(fuzz, 0.0),
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn lambertian_attenuates_by_its_albedo() {
        let albedo = Color::new(0.8, 0.4, 0.2);
        let material = Material::lambertian(albedo);
        let rec = record_with(Vec3A::Y, true, material);
        let r_in = Ray::new(Vec3A::new(0.0, 1.0, 0.0), Vec3A::NEG_Y);

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        let (attenuation, scattered) = material.scatter(&r_in, &rec, &mut rng).unwrap();

        assert_eq!(attenuation, albedo);
        // The bounce must leave the surface on the normal's side.
        assert!(scattered.direction.dot(rec.normal) > 0.0);
        assert_eq!(scattered.origin, rec.p);
    }

    #[test]
    fn lambertian_degenerate_direction_falls_back_to_the_normal() {
        let material = Material::lambertian(Color::ONE);
        let rec = record_with(Vec3A::Z, true, material);
        let r_in = Ray::new(Vec3A::Z, Vec3A::NEG_Z);

        // Three component draws produce the unit vector (0, 0, -1), which
        // cancels the +Z normal exactly.
        let mut rng = SequenceRng::new(&[0.5, 0.5, 0.25]);
        let (_, scattered) = material.scatter(&r_in, &rec, &mut rng).unwrap();

        assert_eq!(scattered.direction, Vec3A::Z);
    }

    #[test]
    fn polished_metal_reflects_exactly() {
        let material = Material::metal(Color::ONE, 0.0);
        let rec = record_with(Vec3A::Y, true, material);
        let incoming = Vec3A::new(1.0, -1.0, 0.0);
        let r_in = Ray::new(Vec3A::new(-1.0, 1.0, 0.0), incoming);

        let mut rng = SequenceRng::new(&[0.5, 0.5, 0.25]);
        let (attenuation, scattered) = material.scatter(&r_in, &rec, &mut rng).unwrap();

        assert_eq!(attenuation, Color::ONE);
        let expected = unit_vector(Vec3A::new(1.0, 1.0, 0.0));
        assert!((scattered.direction - expected).length() < 1e-6);
    }

    #[test]
    fn fuzzed_metal_absorbs_rays_pushed_below_the_surface() {
        let material = Material::metal(Color::ONE, 1.0);
        let rec = record_with(Vec3A::Y, true, material);
        // Grazing ray reflects along itself; the forced fuzz vector
        // (0, 0, -1) leaves the bounce with no component along the normal.
        let r_in = Ray::new(Vec3A::ZERO, Vec3A::X);

        let mut rng = SequenceRng::new(&[0.5, 0.5, 0.25]);
        assert!(material.scatter(&r_in, &rec, &mut rng).is_none());
    }

    #[test]
    fn dielectric_never_attenuates() {
        let material = Material::dielectric(1.5);
        let rec = record_with(Vec3A::Y, true, material);
        let r_in = Ray::new(Vec3A::Y, Vec3A::NEG_Y);

        let mut rng = SequenceRng::new(&[0.5]);
        let (attenuation, _) = material.scatter(&r_in, &rec, &mut rng).unwrap();
        assert_eq!(attenuation, Color::ONE);
    }

    #[test]
    fn glancing_exit_totally_reflects_without_drawing() {
        let material = Material::dielectric(1.5);
        // Back-face hit from inside the glass at 45 degrees; 1.5 * sin(45)
        // exceeds 1, so refraction is impossible.
        let rec = record_with(Vec3A::NEG_Y, false, material);
        let r_in = Ray::new(Vec3A::ZERO, Vec3A::new(1.0, 1.0, 0.0));

        // An empty sequence proves the reflectance draw is skipped.
        let mut rng = SequenceRng::new(&[]);
        let (_, scattered) = material.scatter(&r_in, &rec, &mut rng).unwrap();

        let expected = unit_vector(Vec3A::new(1.0, -1.0, 0.0));
        assert!((scattered.direction - expected).length() < 1e-6);
    }

    #[test]
    fn low_reflectance_draw_forces_a_reflection() {
        let material = Material::dielectric(1.5);
        let rec = record_with(Vec3A::Y, true, material);
        let r_in = Ray::new(Vec3A::ZERO, Vec3A::new(1.0, -1.0, 0.0));

        // Draw below the Schlick reflectance, so the interface mirrors.
        let mut rng = SequenceRng::new(&[0.0]);
        let (_, scattered) = material.scatter(&r_in, &rec, &mut rng).unwrap();

        let expected = unit_vector(Vec3A::new(1.0, 1.0, 0.0));
        assert!((scattered.direction - expected).length() < 1e-6);
    }

    #[test]
    fn high_draw_lets_the_ray_refract_and_bend() {
        let material = Material::dielectric(1.5);
        let rec = record_with(Vec3A::Y, true, material);
        let r_in = Ray::new(Vec3A::ZERO, Vec3A::new(1.0, -1.0, 0.0));

        // Largest representable draw comfortably exceeds the ~4% Schlick
        // reflectance at this angle.
        let mut rng = SequenceRng::new(&[0.999_999_94]);
        let (_, scattered) = material.scatter(&r_in, &rec, &mut rng).unwrap();

        // Snell: the transverse component shrinks by the index ratio.
        let sin_in = std::f32::consts::FRAC_1_SQRT_2;
        assert!((scattered.direction.x - sin_in / 1.5).abs() < 1e-5);
        assert!(scattered.direction.y < 0.0);
        assert!((scattered.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn reflect_mirrors_across_the_normal() {
        let reflected = reflect(Vec3A::new(1.0, -1.0, 0.0), Vec3A::Y);
        assert_eq!(reflected, Vec3A::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn refract_preserves_unit_length() {
        let uv = unit_vector(Vec3A::new(1.0, -1.0, 0.0));
        let out = refract(uv, Vec3A::Y, 1.0 / 1.5);
        assert!((out.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn refract_with_matched_indices_passes_straight_through() {
        let uv = unit_vector(Vec3A::new(1.0, -2.0, 0.5));
        let out = refract(uv, Vec3A::Y, 1.0);
        assert!((out - uv).length() < 1e-6);
    }

    #[test]
    fn attenuation_products_commute_and_associate() {
        let a = Color::new(0.5, 0.25, 1.0);
        let b = Color::new(0.25, 0.5, 0.5);
        let c = Color::new(1.0, 0.5, 0.25);

        assert_eq!(a * b, b * a);
        assert_eq!((a * b) * c, a * (b * c));
    }

    #[test]
    fn schlick_endpoints() {
        // Head-on against glass: the classic 4% Fresnel term.
        assert!((reflectance(1.0, 1.5) - 0.04).abs() < 1e-3);
        // Grazing incidence reflects everything.
        assert!((reflectance(0.0, 1.5) - 1.0).abs() < 1e-6);
    }
}
