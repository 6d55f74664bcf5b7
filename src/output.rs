//! Image sinks.
//!
//! The renderer produces linear f32 RGB; this module gets that image out of
//! the process:
//!
//! - PNG export with gamma-2 encoding for standard displays
//! - EXR export preserving the full linear HDR data
//! - live display in a running tev viewer over TCP
//!
//! Sink failures are reported through the log and never abort the program;
//! by the time a sink runs the render already succeeded.

use std::net::TcpStream;
use std::time::Instant;

use exr::prelude::*;
use image::{ImageBuffer, Rgb};
use log::{debug, info, warn};
use tev_client::{PacketCreateImage, PacketUpdateImage, TevClient};

use crate::camera::LinearImage;
use crate::interval::Interval;

/// Name under which renders appear in the tev image list.
const IMAGE_NAME: &str = "lumapath_render";

/// Displayable component range; anything outside is clipped.
const INTENSITY: Interval = Interval::new(0.0, 1.0);

/// Map one linear component to an 8-bit display value.
///
/// Clamps into [`INTENSITY`], applies gamma 2 (square root), and scales to
/// `[0, 255]`, truncating toward zero.
pub fn gamma_encode(linear: f32) -> u8 {
    let gamma = linear_to_gamma(INTENSITY.clamp(linear));
    (gamma * 255.0) as u8
}

fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Save a linear image as an 8-bit PNG.
///
/// Each component goes through [`gamma_encode`]; overexposed areas saturate
/// to white. I/O failures are logged as warnings.
pub fn save_png(image: &LinearImage, output_path: &str) {
    let (width, height) = image.dimensions();
    let ldr: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
        let pixel = image.get_pixel(x, y);
        Rgb([
            gamma_encode(pixel[0]),
            gamma_encode(pixel[1]),
            gamma_encode(pixel[2]),
        ])
    });

    match ldr.save(output_path) {
        Ok(_) => info!("Image saved as {output_path}"),
        Err(e) => warn!("Failed to save image {output_path}: {e}"),
    }
}

/// Save a linear image as a 32-bit OpenEXR file.
///
/// No tone mapping or gamma is applied; the file carries the raw linear
/// values for HDR viewers and post-processing. I/O failures are logged as
/// warnings.
pub fn save_exr(image: &LinearImage, output_path: &str) {
    let (width, height) = image.dimensions();
    let result = write_rgb_file(output_path, width as usize, height as usize, |x, y| {
        let pixel = image.get_pixel(x as u32, y as u32);
        (pixel[0], pixel[1], pixel[2])
    });

    match result {
        Ok(_) => info!("HDR image saved as {output_path}"),
        Err(e) => warn!("Failed to save EXR image {output_path}: {e}"),
    }
}

/// Display a linear image in a running tev viewer.
///
/// Connects over TCP (appending tev's default port 14158 when the address
/// has none), creates the image, and streams the pixel data in tev's planar
/// channel layout. Every failure path logs a warning and returns; a missing
/// viewer must not kill a finished render.
pub fn send_to_tev(image: &LinearImage, tev_address: &str) {
    let tev_address = if tev_address.contains(':') {
        tev_address.to_string()
    } else {
        format!("{tev_address}:14158")
    };

    debug!("Connecting to tev at {tev_address}");
    let stream = match TcpStream::connect(&tev_address) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to connect to tev on {tev_address}: {e}");
            return;
        }
    };
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Failed to set TCP_NODELAY: {e}");
    }
    let mut client = TevClient::wrap(stream);

    let (width, height) = image.dimensions();
    let create = PacketCreateImage {
        image_name: IMAGE_NAME,
        width,
        height,
        channel_names: &["R", "G", "B"],
        grab_focus: true,
    };
    if let Err(e) = client.send(create) {
        warn!("Failed to create image in tev: {e}");
        return;
    }

    let data = planar_channels(image);
    let pixel_count = u64::from(width) * u64::from(height);
    let started = Instant::now();

    let update = PacketUpdateImage {
        image_name: IMAGE_NAME,
        grab_focus: false,
        channel_names: &["R", "G", "B"],
        x: 0,
        y: 0,
        width,
        height,
        channel_offsets: &[0, pixel_count, 2 * pixel_count],
        channel_strides: &[1, 1, 1],
        data: &data,
    };
    match client.send(update) {
        Ok(_) => info!(
            "Image sent to tev at {tev_address} in {:.2?}",
            started.elapsed()
        ),
        Err(e) => warn!("Failed to send image data to tev: {e}"),
    }
}

/// Reorder interleaved RGB into tev's planar layout, all R then G then B.
fn planar_channels(image: &LinearImage) -> Vec<f32> {
    let (width, height) = image.dimensions();
    let pixel_count = (width as usize) * (height as usize);
    let mut data = Vec::with_capacity(pixel_count * 3);

    for channel in 0..3 {
        for pixel in image.pixels() {
            data.push(pixel[channel]);
        }
    }
    data
}
