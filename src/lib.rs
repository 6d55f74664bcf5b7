//! lumapath path tracer
//!
//! A recursive CPU path tracer with spheres, three material models, depth of
//! field, and deterministic per-pixel sampling. Renders in parallel to a
//! linear HDR buffer; PNG, EXR, and tev sinks live in [`output`].

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod camera;
pub mod denoise;
pub mod hittable;
pub mod interval;
pub mod material;
pub mod output;
pub mod ray;
pub mod sampling;
pub mod sphere;
