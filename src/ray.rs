//! Ray primitive.
//!
//! A ray is the parameterized point set `origin + t * direction`. Everything
//! the tracer does starts with one of these: camera rays, bounce rays,
//! refraction rays.

use glam::Vec3A;

/// A ray in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Starting point: the camera center for primary rays, a surface point
    /// for scattered rays.
    pub origin: Vec3A,
    /// Direction of travel. Not required to be unit length; intersection math
    /// works with the raw vector and normalizes only where the physics needs
    /// angles.
    pub direction: Vec3A,
}

impl Ray {
    /// Create a ray from an origin and a direction.
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self { origin, direction }
    }

    /// The point at parameter `t`.
    ///
    /// `t` may be any real, including negative (behind the origin); callers
    /// restrict acceptable parameters through an [`Interval`].
    ///
    /// [`Interval`]: crate::interval::Interval
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + t * self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_walks_along_the_direction() {
        let r = Ray::new(Vec3A::new(1.0, 2.0, 3.0), Vec3A::new(0.0, 0.0, -2.0));

        assert_eq!(r.at(0.0), r.origin);
        assert_eq!(r.at(1.0), Vec3A::new(1.0, 2.0, 1.0));
        assert_eq!(r.at(0.5), Vec3A::new(1.0, 2.0, 2.0));
    }

    #[test]
    fn at_accepts_negative_parameters() {
        let r = Ray::new(Vec3A::ZERO, Vec3A::X);

        assert_eq!(r.at(-3.0), Vec3A::new(-3.0, 0.0, 0.0));
    }

    #[test]
    fn rays_are_plain_values() {
        let a = Ray::new(Vec3A::ZERO, Vec3A::Y);
        let b = a;

        assert_eq!(a, b);
        assert_eq!(a.at(2.0), b.at(2.0));
    }
}
