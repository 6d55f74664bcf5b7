//! Edge-preserving denoising for rendered images.
//!
//! Monte Carlo renders at low sample counts carry high-frequency noise. The
//! bilateral filter here averages each pixel with its neighborhood, weighting
//! neighbors down both by distance and by color difference, so smooth regions
//! clean up while material and silhouette edges stay sharp.

use std::time::Instant;

use glam::Vec3A;
use image::{ImageBuffer, Rgb};
use log::{info, warn};
use rayon::prelude::*;

use crate::camera::LinearImage;

/// Apply a bilateral filter and return the denoised image.
///
/// `spatial_sigma` controls the neighborhood size (the window radius is three
/// sigmas), `range_sigma` how much color difference a neighbor may have and
/// still contribute. Non-positive sigmas disable the filter; the input is
/// returned unchanged.
pub fn bilateral_filter(image: &LinearImage, spatial_sigma: f32, range_sigma: f32) -> LinearImage {
    if spatial_sigma <= 0.0 || range_sigma <= 0.0 {
        warn!(
            "skipping denoise, sigmas must be positive (spatial {spatial_sigma}, range {range_sigma})"
        );
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let radius = (3.0 * spatial_sigma).ceil() as i64;
    let spatial_denom = 2.0 * spatial_sigma * spatial_sigma;
    let range_denom = 2.0 * range_sigma * range_sigma;

    info!("denoising {width}x{height}, window radius {radius}");
    let started = Instant::now();

    let mut output: LinearImage = ImageBuffer::new(width, height);
    output.enumerate_pixels_mut().par_bridge().for_each(|(x, y, pixel)| {
        let center = pixel_vec(image, x, y);
        let mut sum = Vec3A::ZERO;
        let mut weight_sum = 0.0f32;

        for dy in -radius..=radius {
            let ny = i64::from(y) + dy;
            if ny < 0 || ny >= i64::from(height) {
                continue;
            }
            for dx in -radius..=radius {
                let nx = i64::from(x) + dx;
                if nx < 0 || nx >= i64::from(width) {
                    continue;
                }

                let neighbor = pixel_vec(image, nx as u32, ny as u32);
                let spatial_sq = (dx * dx + dy * dy) as f32;
                let range_sq = (neighbor - center).length_squared();
                let weight = (-spatial_sq / spatial_denom - range_sq / range_denom).exp();

                sum += weight * neighbor;
                weight_sum += weight;
            }
        }

        // The center contributes weight 1, so the sum never degenerates.
        let filtered = sum / weight_sum;
        *pixel = Rgb([filtered.x, filtered.y, filtered.z]);
    });

    info!("denoise finished in {:.2?}", started.elapsed());
    output
}

fn pixel_vec(image: &LinearImage, x: u32, y: u32) -> Vec3A {
    let c = image.get_pixel(x, y).0;
    Vec3A::new(c[0], c[1], c[2])
}
