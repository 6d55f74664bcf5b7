//! Ray-object intersection system.
//!
//! Defines the [`Hittable`] trait for geometric primitives and [`HitRecord`]
//! for carrying intersection data to the shading code.

use crate::interval::Interval;
use crate::material::Material;
use crate::ray::Ray;
use glam::Vec3A;

/// Ray-object intersection information.
///
/// Contains the intersection point, the oriented surface normal, the ray
/// parameter, and the material needed for shading.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Point where the ray intersects the object.
    pub p: Vec3A,
    /// Unit surface normal, always facing against the incident ray.
    pub normal: Vec3A,
    /// Ray parameter at the intersection point.
    pub t: f32,
    /// True when the ray struck the outside of the surface.
    pub front_face: bool,
    /// Material of the object at the hit point.
    pub material: Material,
}

impl HitRecord {
    /// Build a record from the geometric outward normal.
    ///
    /// `outward_normal` must be unit length. The stored normal is flipped so
    /// it always opposes the incident ray, and `front_face` remembers which
    /// side was struck.
    pub fn new(r: &Ray, p: Vec3A, outward_normal: Vec3A, t: f32, material: Material) -> Self {
        let front_face = r.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        Self {
            p,
            normal,
            t,
            front_face,
            material,
        }
    }
}

/// Trait for objects that can be intersected by rays.
///
/// Implementations must be `Sync + Send` so scenes can be shared across the
/// render worker threads.
pub trait Hittable: Sync + Send {
    /// Test for the nearest intersection with ray parameter inside `ray_t`.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord>;
}

/// Collection of objects forming a scene.
///
/// Uses linear search for intersection testing. Supports polymorphic objects
/// through `Box<dyn Hittable>`.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Remove every object from the scene.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Number of objects in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the scene holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Hittable for HittableList {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        // Shrink the search window as nearer hits are found so later objects
        // only win if they are closer still.
        for object in &self.objects {
            if let Some(rec) = object.hit(r, Interval::new(ray_t.min, closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }
}
