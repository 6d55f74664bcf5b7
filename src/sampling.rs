//! Random sampling and small vector helpers.
//!
//! Every generator takes an explicit `&mut impl Rng` handle instead of
//! reaching for a global source. The renderer keys one ChaCha stream per
//! pixel ([`pixel_rng`]), which makes an image a pure function of the scene,
//! the camera configuration, and the seed, independent of thread scheduling.

use glam::Vec3A;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Acceptance floor (on squared length) for rejection-sampled unit vectors.
///
/// Candidates shorter than this are discarded before normalizing: they carry
/// too few significant bits to give an unbiased direction. The value is tied
/// to f32 precision; a wider float would use a smaller floor.
const UNIT_SPHERE_MIN_LEN_SQ: f32 = 1e-18;

/// Component magnitude below which a vector counts as zero.
const NEAR_ZERO_EPS: f32 = 1e-8;

/// Normalize `v` to unit length.
///
/// # Panics
///
/// Panics if `v` has zero length; asking for the direction of a null vector
/// is a programming error, not a recoverable condition.
pub fn unit_vector(v: Vec3A) -> Vec3A {
    assert!(
        v.length_squared() > 0.0,
        "unit_vector called on a zero-length vector"
    );
    v.normalize()
}

/// True when every component magnitude is below `1e-8`.
///
/// Used to catch degenerate scatter directions before they become rays that
/// go nowhere.
pub fn near_zero(v: Vec3A) -> bool {
    v.abs().max_element() < NEAR_ZERO_EPS
}

/// The deterministic draw stream owned by pixel `(x, y)` under `seed`.
///
/// The pixel index is mixed through a SplitMix64 step so neighboring pixels
/// land on unrelated streams, then folded into the seed. Re-keying a small
/// ChaCha per pixel is cheap and keeps the render reproducible for any
/// thread count.
pub fn pixel_rng(seed: u64, x: u32, y: u32) -> ChaCha8Rng {
    let pixel = (u64::from(y) << 32) | u64::from(x);
    ChaCha8Rng::seed_from_u64(seed ^ splitmix(pixel))
}

fn splitmix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Vector with each component uniform in `[0, 1)`.
pub fn random_vec3<R: Rng>(rng: &mut R) -> Vec3A {
    Vec3A::new(rng.random(), rng.random(), rng.random())
}

/// Vector with each component uniform in `[min, max)`.
pub fn random_vec3_range<R: Rng>(rng: &mut R, min: f32, max: f32) -> Vec3A {
    Vec3A::new(
        rng.random_range(min..max),
        rng.random_range(min..max),
        rng.random_range(min..max),
    )
}

/// Uniformly distributed unit vector, by rejection sampling.
///
/// Draws candidates in `[-1, 1]³` and keeps the first whose squared length
/// lies in `(UNIT_SPHERE_MIN_LEN_SQ, 1]`; accepting the whole ball and then
/// normalizing is what makes the directions uniform.
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3A {
    loop {
        let p = random_vec3_range(rng, -1.0, 1.0);
        let len_sq = p.length_squared();
        if UNIT_SPHERE_MIN_LEN_SQ < len_sq && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Uniform unit vector on the hemisphere around `normal`.
pub fn random_on_hemisphere<R: Rng>(rng: &mut R, normal: Vec3A) -> Vec3A {
    let on_sphere = random_unit_vector(rng);
    if on_sphere.dot(normal) > 0.0 {
        on_sphere
    } else {
        -on_sphere
    }
}

/// Uniform point inside the unit disk on the z = 0 plane.
///
/// Feeds the camera's defocus sampling.
pub fn random_in_unit_disk<R: Rng>(rng: &mut R) -> Vec3A {
    loop {
        let p = Vec3A::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            0.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn unit_vector_normalizes() {
        let v = unit_vector(Vec3A::new(3.0, 0.0, 4.0));

        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v - Vec3A::new(0.6, 0.0, 0.8)).length() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "zero-length")]
    fn unit_vector_rejects_the_zero_vector() {
        unit_vector(Vec3A::ZERO);
    }

    #[test]
    fn near_zero_thresholds() {
        assert!(near_zero(Vec3A::ZERO));
        assert!(near_zero(Vec3A::splat(1e-9)));
        assert!(!near_zero(Vec3A::new(1e-9, 1e-9, 1e-7)));
        assert!(!near_zero(Vec3A::X));
    }

    #[test]
    fn pixel_streams_are_reproducible() {
        let mut a = pixel_rng(42, 10, 20);
        let mut b = pixel_rng(42, 10, 20);

        for _ in 0..16 {
            assert_eq!(a.random::<f32>(), b.random::<f32>());
        }
    }

    #[test]
    fn pixel_streams_differ_between_pixels_and_seeds() {
        let first = |mut r: ChaCha8Rng| r.random::<u64>();

        let base = first(pixel_rng(42, 10, 20));
        assert_ne!(base, first(pixel_rng(42, 11, 20)));
        assert_ne!(base, first(pixel_rng(42, 10, 21)));
        // Transposed coordinates must not collide either.
        assert_ne!(base, first(pixel_rng(42, 20, 10)));
        assert_ne!(base, first(pixel_rng(43, 10, 20)));
    }

    #[test]
    fn random_vec3_stays_in_the_unit_cube() {
        let mut rng = rng();
        for _ in 0..100 {
            let v = random_vec3(&mut rng);
            for c in v.to_array() {
                assert!((0.0..1.0).contains(&c));
            }
        }
    }

    #[test]
    fn random_vec3_range_respects_the_bounds() {
        let mut rng = rng();
        for _ in 0..100 {
            let v = random_vec3_range(&mut rng, -2.0, 3.0);
            for c in v.to_array() {
                assert!((-2.0..3.0).contains(&c));
            }
        }
    }

    #[test]
    fn random_unit_vectors_have_unit_length() {
        let mut rng = rng();
        for _ in 0..200 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn hemisphere_samples_face_the_normal() {
        let mut rng = rng();
        let normal = unit_vector(Vec3A::new(0.3, 0.8, -0.2));
        for _ in 0..200 {
            let v = random_on_hemisphere(&mut rng, normal);
            assert!(v.dot(normal) >= 0.0);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn disk_samples_lie_flat_inside_the_disk() {
        let mut rng = rng();
        for _ in 0..200 {
            let p = random_in_unit_disk(&mut rng);
            assert_eq!(p.z, 0.0);
            assert!(p.length_squared() < 1.0);
        }
    }
}
