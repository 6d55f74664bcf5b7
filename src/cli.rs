//! Command line interface.

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in demo scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenePreset {
    /// Random field of small spheres around three showcase materials.
    Cover,
    /// Deterministic scene with a ground sphere and three matte spheres.
    Triad,
}

/// Command line arguments, parsed with clap's derive interface.
#[derive(Parser)]
#[command(name = "lumapath")]
#[command(about = "A recursive CPU path tracer")]
pub struct Args {
    /// Image width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Width over height of the output image
    #[arg(long, default_value_t = 16.0 / 9.0)]
    pub aspect_ratio: f32,

    /// Number of samples per pixel
    #[arg(long, short = 's', default_value = "100")]
    pub samples_per_pixel: u32,

    /// Maximum ray bounce depth
    #[arg(long, default_value = "50")]
    pub max_depth: u32,

    /// Vertical field of view in degrees
    #[arg(long, default_value = "20")]
    pub vfov: f32,

    /// Defocus blur angle in degrees, 0 disables depth of field
    #[arg(long, default_value = "0.6")]
    pub defocus_angle: f32,

    /// Distance from the camera to the plane of perfect focus
    #[arg(long, default_value = "10.0")]
    pub focus_dist: f32,

    /// Seed for the per-pixel sample streams
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Terminate dim ray paths early (Russian roulette)
    #[arg(long)]
    pub russian_roulette: bool,

    /// Scene to render
    #[arg(long, value_enum, default_value = "cover")]
    pub scene: ScenePreset,

    /// Output file path (.png for 8-bit with gamma correction, .exr for HDR linear)
    #[arg(short, long, default_value = "render.png")]
    pub output: String,

    /// Send the image to a running tev viewer
    #[arg(long)]
    pub tev: bool,

    /// tev address as host or host:port (automatically enables --tev)
    #[arg(long)]
    pub tev_address: Option<String>,

    /// Render on a single thread
    #[arg(long)]
    pub serial: bool,

    /// Apply a bilateral denoise pass before output
    #[arg(long)]
    pub denoise: bool,

    /// Denoiser spatial sigma in pixels
    #[arg(long, default_value = "2.0")]
    pub denoise_spatial: f32,

    /// Denoiser range sigma in linear color units
    #[arg(long, default_value = "0.1")]
    pub denoise_range: f32,

    /// Time single-threaded against parallel rendering of the scene
    #[arg(long)]
    pub bench: bool,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub debug_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_parse() {
        let args = Args::try_parse_from(["lumapath"]).unwrap();
        assert_eq!(args.width, 800);
        assert_eq!(args.samples_per_pixel, 100);
        assert_eq!(args.max_depth, 50);
        assert_eq!(args.scene, ScenePreset::Cover);
        assert_eq!(args.output, "render.png");
        assert_eq!(args.seed, 0);
        assert!(!args.russian_roulette);
        assert!(!args.serial);
    }

    #[test]
    fn scene_and_sampling_flags_parse() {
        let args =
            Args::try_parse_from(["lumapath", "--scene", "triad", "-s", "8", "--denoise"])
                .unwrap();
        assert_eq!(args.scene, ScenePreset::Triad);
        assert_eq!(args.samples_per_pixel, 8);
        assert!(args.denoise);
    }
}
