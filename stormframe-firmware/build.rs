//! Build script for stormframe-firmware
//!
//! - Passes the esp-hal and defmt linker scripts
//! - Validates frame.toml at compile time

use std::path::Path;
use std::{env, fs};

/// Must match `stormframe_core::config::MAX_IMAGES`
const MAX_IMAGES: usize = 10;

fn main() {
    setup_linker();
    validate_config();
}

/// Linker scripts for the xtensa target
fn setup_linker() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds (IDE checks) have no use for the target scripts
    if env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("xtensa") {
        println!("cargo:rustc-link-arg=-Tlinkall.x");
        println!("cargo:rustc-link-arg=-Tdefmt.x");
    }
}

/// Validate frame.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=frame.toml");

    let config_path = Path::new("frame.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: frame.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds frame.toml as its configuration.            ║\n\
            ║  Please create one in the stormframe-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read frame.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in frame.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_urls(&config, &mut errors);
    validate_images(&config, &mut errors);
    validate_crops(&config, &mut errors);
    validate_schedule(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in frame.toml                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=frame.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_http_url(value: &toml::Value) -> bool {
    value
        .as_str()
        .is_some_and(|url| url.starts_with("http://") || url.starts_with("https://"))
}

/// Every endpoint must be an http(s) URL
fn validate_urls(config: &toml::Value, errors: &mut Vec<String>) {
    for (section, key) in [
        ("feed", "url"),
        ("conversion", "endpoint"),
        ("time_sync", "url"),
    ] {
        if let Some(value) = config.get(section).and_then(|s| s.get(key)) {
            if !is_http_url(value) {
                errors.push(format!("[{}] {} must be an http(s) URL", section, key));
            }
        }
    }
}

/// Static images need a URL and a name, and must fit the slot store
fn validate_images(config: &toml::Value, errors: &mut Vec<String>) {
    let images = match config.get("image") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[image.*] entries must be tables".to_string());
            return;
        }
        None => return,
    };

    if images.len() > MAX_IMAGES {
        errors.push(format!("at most {} [image.*] entries fit", MAX_IMAGES));
    }

    for (name, image) in images {
        match image.get("url") {
            Some(url) if is_http_url(url) => {}
            Some(_) => errors.push(format!("[image.{}] url must be an http(s) URL", name)),
            None => errors.push(format!("[image.{}] missing 'url'", name)),
        }
        if image.get("name").and_then(|n| n.as_str()).is_none() {
            errors.push(format!("[image.{}] missing 'name'", name));
        }
    }
}

/// Crop margins are u16 pixel counts; top and bottom are required
fn validate_crops(config: &toml::Value, errors: &mut Vec<String>) {
    let conversion = match config.get("conversion") {
        Some(c) => c,
        None => return,
    };

    for crop in ["outlook_crop", "default_crop"] {
        let Some(table) = conversion.get(crop) else {
            continue;
        };
        for key in ["top", "bottom"] {
            if table.get(key).is_none() {
                errors.push(format!("[conversion.{}] missing '{}'", crop, key));
            }
        }
        for key in ["top", "bottom", "left", "right"] {
            if let Some(toml::Value::Integer(v)) = table.get(key) {
                if *v < 0 || *v > i64::from(u16::MAX) {
                    errors.push(format!("[conversion.{}] {} out of range", crop, key));
                }
            }
        }
    }
}

/// Update times must be "HH:MM" strings
fn validate_schedule(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(schedule) = config.get("schedule") else {
        return;
    };

    match schedule.get("update_times") {
        Some(toml::Value::Array(times)) => {
            for time in times {
                let valid = time.as_str().is_some_and(|t| {
                    let parts: Vec<&str> = t.split(':').collect();
                    parts.len() == 2
                        && parts.iter().all(|p| p.len() == 2 && p.bytes().all(|b| b.is_ascii_digit()))
                        && parts[0].parse::<u8>().is_ok_and(|h| h < 24)
                        && parts[1].parse::<u8>().is_ok_and(|m| m < 60)
                });
                if !valid {
                    errors.push(format!("[schedule] invalid update time {}", time));
                }
            }
            if times.len() > 24 {
                errors.push("[schedule] at most 24 update_times".to_string());
            }
        }
        Some(_) => errors.push("[schedule] update_times must be an array".to_string()),
        None => {}
    }

    if let Some(toml::Value::Integer(ms)) = schedule.get("rotation_interval_ms") {
        if *ms < 1000 {
            errors.push("[schedule] rotation_interval_ms must be at least 1000".to_string());
        }
    }
}
