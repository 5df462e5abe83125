//! Simple TOML parser for the frame configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! Stormframe configuration. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Single-line string arrays: update_times = ["00:10", "03:10"]
//! - [section] and [section.subsection] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Escapes inside strings
//! - Inline tables, datetime values

use alloc::string::String;
use heapless::Vec;

use stormframe_core::config::{
    truncated, AppConfig, CropProfile, Label, StaticImage, UpdateTime, MAX_LABEL_LEN,
    MAX_UPDATE_TIMES,
};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Malformed "HH:MM" time
    InvalidTime,
}

/// Current parsing context
#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Root,
    Feed,
    Conversion,
    OutlookCrop,
    DefaultCrop,
    Image(Label),
    Schedule,
    Backlight,
    TimeSync,
}

/// Static image under construction
#[derive(Default)]
struct PendingImage {
    url: Option<String>,
    name: Option<String>,
}

/// Parse TOML configuration into AppConfig
///
/// Sections and keys that are absent keep their defaults. Static images come
/// only from `[image.*]` sections, in file order.
pub fn parse_config(input: &str) -> Result<AppConfig, ParseError> {
    let mut config = AppConfig::empty();
    let mut section = Section::Root;
    let mut image: Option<PendingImage> = None;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            save_image(&mut config, &mut image)?;

            section = parse_section_header(&line[1..line.len() - 1])?;
            if let Section::Image(_) = section {
                image = Some(PendingImage::default());
            }
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(&section, key, value, &mut config, &mut image)?;
        }
    }

    save_image(&mut config, &mut image)?;
    Ok(config)
}

/// Parse section header like "feed", "conversion.outlook_crop" or "image.cone"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        return match (kind, name) {
            ("conversion", "outlook_crop") => Ok(Section::OutlookCrop),
            ("conversion", "default_crop") => Ok(Section::DefaultCrop),
            ("image", name) if !name.is_empty() && name.len() <= MAX_LABEL_LEN => {
                Ok(Section::Image(truncated(name)))
            }
            _ => Err(ParseError::InvalidSection),
        };
    }

    match header {
        "feed" => Ok(Section::Feed),
        "conversion" => Ok(Section::Conversion),
        "schedule" => Ok(Section::Schedule),
        "backlight" => Ok(Section::Backlight),
        "time_sync" => Ok(Section::TimeSync),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.rfind('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a label, rejecting values that would not fit
fn parse_label(value: &str) -> Result<Label, ParseError> {
    let value = parse_string(value)?;
    if value.len() > MAX_LABEL_LEN {
        return Err(ParseError::InvalidValue);
    }
    Ok(truncated(value))
}

/// Parse `["00:10", "03:10"]`
fn parse_times(value: &str) -> Result<Vec<UpdateTime, MAX_UPDATE_TIMES>, ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut times = Vec::new();
    for item in inner.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let time = UpdateTime::parse(parse_string(item)?).ok_or(ParseError::InvalidTime)?;
        times.push(time).map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(times)
}

fn apply_crop(crop: &mut CropProfile, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "top" => crop.top = parse_int(value)?,
        "bottom" => crop.bottom = parse_int(value)?,
        "left" => crop.left = Some(parse_int(value)?),
        "right" => crop.right = Some(parse_int(value)?),
        _ => {}
    }
    Ok(())
}

/// Apply one key to the current section; unknown keys are ignored
fn apply_value(
    section: &Section,
    key: &str,
    value: &str,
    config: &mut AppConfig,
    image: &mut Option<PendingImage>,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Feed => {
            let feed = &mut config.feed;
            match key {
                "url" => feed.url = String::from(parse_string(value)?),
                "marker" => feed.marker = parse_label(value)?,
                "name_prefix" => feed.name_prefix = parse_label(value)?,
                "timeout_ms" => feed.timeout_ms = parse_int(value)?,
                "max_bytes" => feed.max_bytes = parse_int(value)?,
                _ => {}
            }
        }
        Section::Conversion => {
            let conversion = &mut config.conversion;
            match key {
                "endpoint" => conversion.endpoint = String::from(parse_string(value)?),
                "color_format" => conversion.color_format = parse_label(value)?,
                "dither" => conversion.dither = parse_bool(value)?,
                "output" => conversion.output = parse_label(value)?,
                "big_endian" => conversion.big_endian = parse_bool(value)?,
                "max_width" => conversion.max_width = parse_int(value)?,
                "max_height" => conversion.max_height = parse_int(value)?,
                "timeout_ms" => conversion.timeout_ms = parse_int(value)?,
                "max_bytes" => conversion.max_bytes = parse_int(value)?,
                _ => {}
            }
        }
        Section::OutlookCrop => apply_crop(&mut config.conversion.outlook_crop, key, value)?,
        Section::DefaultCrop => apply_crop(&mut config.conversion.default_crop, key, value)?,
        Section::Image(_) => {
            if let Some(image) = image.as_mut() {
                match key {
                    "url" => image.url = Some(String::from(parse_string(value)?)),
                    "name" => image.name = Some(String::from(parse_string(value)?)),
                    _ => {}
                }
            }
        }
        Section::Schedule => {
            let schedule = &mut config.schedule;
            match key {
                "update_times" => schedule.update_times = parse_times(value)?,
                "poll_interval_s" => schedule.poll_interval_s = parse_int(value)?,
                "rotation_interval_ms" => schedule.rotation_interval_ms = parse_int(value)?,
                "network_settle_ms" => schedule.network_settle_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Backlight => {
            if key == "timeout_ms" {
                config.backlight.timeout_ms = parse_int(value)?;
            }
        }
        Section::TimeSync => {
            let sync = &mut config.time_sync;
            match key {
                "url" => sync.url = String::from(parse_string(value)?),
                "attempts" => sync.attempts = parse_int(value)?,
                "retry_delay_ms" => sync.retry_delay_ms = parse_int(value)?,
                "timeout_ms" => sync.timeout_ms = parse_int(value)?,
                _ => {}
            }
        }
    }
    Ok(())
}

/// Append the finished `[image.*]` section, if any
fn save_image(config: &mut AppConfig, image: &mut Option<PendingImage>) -> Result<(), ParseError> {
    let Some(pending) = image.take() else {
        return Ok(());
    };
    let (Some(url), Some(name)) = (pending.url, pending.name) else {
        return Err(ParseError::InvalidValue);
    };
    config
        .static_images
        .push(StaticImage::new(&url, &name))
        .map_err(|_| ParseError::TooManyItems)
}
