//! Configuration loading
//!
//! The configuration is compiled in from `frame.toml` and parsed by a small
//! no_std TOML subset parser. A file that fails to parse falls back to the
//! built-in defaults.

pub mod toml;

use defmt::*;
use stormframe_core::config::AppConfig;

pub use toml::{parse_config, ParseError};

/// Embedded configuration (compiled into firmware)
/// Edit frame.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../frame.toml");

/// Parse the embedded configuration, falling back to defaults
pub fn load() -> AppConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            log_config_summary(&config);
            config
        }
        Err(e) => {
            warn!("frame.toml parse error: {:?}, using defaults", e);
            AppConfig::default()
        }
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &AppConfig) {
    info!("Configuration loaded successfully");
    debug!("  feed: {}", config.feed.url.as_str());
    debug!("  converter: {}", config.conversion.endpoint.as_str());
    debug!("  {} static images", config.static_images.len());
    debug!("  {} update times", config.schedule.update_times.len());
    debug!("  rotation every {} ms", config.schedule.rotation_interval_ms);
}
