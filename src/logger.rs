//! Logging setup.

use log::{debug, LevelFilter};

/// Initialize global logging at the given base level.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
    debug!("logging initialized at {level}");
}
