//! Camera for ray generation and scene rendering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use glam::Vec3A;
use image::{ImageBuffer, Rgb};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::Rng;
use rayon::prelude::*;

use crate::hittable::Hittable;
use crate::interval::Interval;
use crate::material::Color;
use crate::ray::Ray;
use crate::sampling::{pixel_rng, random_in_unit_disk, unit_vector};

/// HDR render target with linear f32 RGB values.
pub type LinearImage = ImageBuffer<Rgb<f32>, Vec<f32>>;

/// User-facing camera knobs.
///
/// A plain value: build one, tweak the fields, hand it to [`Camera::new`].
/// Everything the renderer derives from these settings lives in [`Camera`].
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Rendered image width in pixels.
    pub image_width: u32,
    /// Ratio of image width over height.
    pub aspect_ratio: f32,
    /// Number of random samples per pixel for anti-aliasing.
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces.
    pub max_depth: u32,
    /// Vertical field of view in degrees.
    pub vfov: f32,
    /// Point the camera looks from.
    pub lookfrom: Vec3A,
    /// Point the camera looks at.
    pub lookat: Vec3A,
    /// Camera-relative up direction.
    pub vup: Vec3A,
    /// Variation angle of rays through each pixel, in degrees.
    pub defocus_angle: f32,
    /// Distance from `lookfrom` to the plane of perfect focus.
    pub focus_dist: f32,
    /// Seed for the per-pixel draw streams.
    pub seed: u64,
    /// Probabilistically terminate dim paths after the first two bounces.
    pub russian_roulette: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            vfov: 90.0,
            lookfrom: Vec3A::ZERO,
            lookat: Vec3A::new(0.0, 0.0, -1.0),
            vup: Vec3A::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            seed: 0,
            russian_roulette: false,
        }
    }
}

/// Camera with derived viewport geometry, ready to render.
///
/// All fields are computed once in [`Camera::new`] as a pure function of the
/// configuration; rendering never mutates the camera.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    defocus_angle: f32,
    seed: u64,
    russian_roulette: bool,

    /// Camera position in world space.
    center: Vec3A,
    /// World position of the center of pixel (0, 0).
    pixel00_loc: Vec3A,
    /// Step from one pixel center to the next, to the right.
    pixel_delta_u: Vec3A,
    /// Step from one pixel center to the next, downward.
    pixel_delta_v: Vec3A,
    /// Scale factor averaging the per-pixel sample sum.
    pixel_samples_scale: f32,
    /// Defocus disk horizontal radius vector.
    defocus_disk_u: Vec3A,
    /// Defocus disk vertical radius vector.
    defocus_disk_v: Vec3A,
}

impl Camera {
    /// Derive the viewport geometry from a configuration.
    ///
    /// The image height follows from the width and aspect ratio and is never
    /// smaller than one pixel. At least one sample per pixel is always taken.
    ///
    /// # Panics
    ///
    /// Panics when `lookfrom` equals `lookat` or when `vup` is parallel to
    /// the view direction; neither orientation has a usable camera frame.
    pub fn new(config: &CameraConfig) -> Self {
        let image_height = ((config.image_width as f32 / config.aspect_ratio) as u32).max(1);
        let samples_per_pixel = config.samples_per_pixel.max(1);
        let pixel_samples_scale = 1.0 / samples_per_pixel as f32;

        let center = config.lookfrom;

        let theta = config.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (config.image_width as f32 / image_height as f32);

        // Right-handed orthonormal frame: w looks backward, u right, v up.
        let w = unit_vector(config.lookfrom - config.lookat);
        let u = unit_vector(config.vup.cross(w));
        let v = w.cross(u);

        // Viewport edges run rightward and downward in image order.
        let viewport_u = viewport_width * u;
        let viewport_v = viewport_height * -v;

        let pixel_delta_u = viewport_u / config.image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left =
            center - (config.focus_dist * w) - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = config.focus_dist * (config.defocus_angle.to_radians() / 2.0).tan();
        let defocus_disk_u = u * defocus_radius;
        let defocus_disk_v = v * defocus_radius;

        Self {
            image_width: config.image_width,
            image_height,
            samples_per_pixel,
            max_depth: config.max_depth,
            defocus_angle: config.defocus_angle,
            seed: config.seed,
            russian_roulette: config.russian_roulette,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            pixel_samples_scale,
            defocus_disk_u,
            defocus_disk_v,
        }
    }

    /// Rendered image width in pixels.
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Rendered image height in pixels.
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Render the scene in parallel across all CPU cores.
    pub fn render(&self, world: &dyn Hittable) -> LinearImage {
        self.render_with_cancel(world, &AtomicBool::new(false))
    }

    /// Render the scene, checking `cancel` between pixels.
    ///
    /// Pixels not yet rendered when the flag flips stay black. The result is
    /// identical for any thread count because every pixel owns its draw
    /// stream.
    pub fn render_with_cancel(&self, world: &dyn Hittable, cancel: &AtomicBool) -> LinearImage {
        let mut image: LinearImage = ImageBuffer::new(self.image_width, self.image_height);

        info!(
            "rendering {}x{} at {} samples/pixel on {} threads",
            self.image_width,
            self.image_height,
            self.samples_per_pixel,
            rayon::current_num_threads()
        );
        let started = Instant::now();
        let pb = ProgressBar::new(u64::from(self.image_width) * u64::from(self.image_height));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40} {pos}/{len} ETA: {eta}")
                .unwrap(),
        );

        image.enumerate_pixels_mut().par_bridge().for_each(|(x, y, pixel)| {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            let color = self.render_pixel(world, x, y);
            *pixel = Rgb([color.x, color.y, color.z]);
            pb.inc(1);
        });
        pb.finish();

        if cancel.load(Ordering::Relaxed) {
            warn!("render cancelled after {:.2?}, unfinished pixels left black", started.elapsed());
        } else {
            info!("render finished in {:.2?}", started.elapsed());
        }

        image
    }

    /// Render the scene on the calling thread only.
    ///
    /// Produces the same pixels as [`Camera::render`]; exists for the
    /// benchmark mode and as the determinism baseline.
    pub fn render_serial(&self, world: &dyn Hittable) -> LinearImage {
        let mut image: LinearImage = ImageBuffer::new(self.image_width, self.image_height);

        info!(
            "rendering {}x{} at {} samples/pixel on one thread",
            self.image_width, self.image_height, self.samples_per_pixel
        );
        let started = Instant::now();

        for y in 0..self.image_height {
            for x in 0..self.image_width {
                let color = self.render_pixel(world, x, y);
                image.put_pixel(x, y, Rgb([color.x, color.y, color.z]));
            }
        }

        info!("render finished in {:.2?}", started.elapsed());
        image
    }

    /// Average the anti-aliasing samples for a single pixel.
    ///
    /// The pixel's draw stream is re-keyed from the seed and coordinates, so
    /// the same pixel always integrates the same sample set.
    pub fn render_pixel(&self, world: &dyn Hittable, x: u32, y: u32) -> Color {
        let mut rng = pixel_rng(self.seed, x, y);
        let mut pixel_color = Color::ZERO;

        for _ in 0..self.samples_per_pixel {
            let r = self.get_ray(x, y, &mut rng);
            pixel_color += self.ray_color(&r, world, self.max_depth, &mut rng);
        }

        pixel_color * self.pixel_samples_scale
    }

    /// Ray from the camera through a jittered point inside pixel `(x, y)`.
    ///
    /// With a positive defocus angle the origin moves onto the lens disk,
    /// which is what blurs geometry away from the focus plane.
    fn get_ray<R: Rng>(&self, x: u32, y: u32, rng: &mut R) -> Ray {
        let offset = sample_square(rng);
        let pixel_sample = self.pixel00_loc
            + ((x as f32 + offset.x) * self.pixel_delta_u)
            + ((y as f32 + offset.y) * self.pixel_delta_v);

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };
        let ray_direction = pixel_sample - ray_origin;

        Ray::new(ray_origin, ray_direction)
    }

    /// Random point on the camera lens disk.
    fn defocus_disk_sample<R: Rng>(&self, rng: &mut R) -> Vec3A {
        let p = random_in_unit_disk(rng);
        self.center + (p.x * self.defocus_disk_u) + (p.y * self.defocus_disk_v)
    }

    /// Trace a ray and compute its color contribution.
    ///
    /// Recursively follows bounces until the scene misses (sky), a surface
    /// absorbs the ray, or the depth budget runs out.
    fn ray_color<R: Rng>(&self, r: &Ray, world: &dyn Hittable, depth: u32, rng: &mut R) -> Color {
        if depth == 0 {
            return Color::ZERO;
        }

        // Start the window just above zero so a bounce cannot re-hit the
        // surface it left.
        if let Some(rec) = world.hit(r, Interval::new(0.001, f32::INFINITY)) {
            if let Some((mut attenuation, scattered)) = rec.material.scatter(r, &rec, rng) {
                if self.russian_roulette && depth + 2 <= self.max_depth {
                    // Kill dim paths with probability matching the energy
                    // they could still carry; survivors are rescaled so the
                    // estimate stays unbiased.
                    let p_term = (1.0 - attenuation.max_element()).max(0.0);
                    if p_term > 0.0 {
                        if rng.random::<f32>() < p_term {
                            return Color::ZERO;
                        }
                        attenuation /= 1.0 - p_term;
                    }
                }
                return attenuation * self.ray_color(&scattered, world, depth - 1, rng);
            }
            return Color::ZERO;
        }

        background(r)
    }
}

/// Sky gradient for rays that escape the scene, white down to soft blue up.
fn background(r: &Ray) -> Color {
    let unit_direction = unit_vector(r.direction);
    let a = 0.5 * (unit_direction.y + 1.0);
    (1.0 - a) * Color::ONE + a * Color::new(0.5, 0.7, 1.0)
}

/// Random offset in the `[-0.5, 0.5)` square around a pixel center.
fn sample_square<R: Rng>(rng: &mut R) -> Vec3A {
    Vec3A::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5, 0.0)
}
