//! Configuration type definitions
//!
//! Defaults reproduce the stock National Hurricane Center setup: two
//! Atlantic outlook images, cone graphics from the Atlantic index feed, and
//! refreshes ten minutes after each three-hourly advisory.

use alloc::string::String;
use heapless::{String as HString, Vec};

/// Number of image slots
pub const MAX_IMAGES: usize = 10;

/// Responses shorter than this are never handed to the decoder
pub const MIN_VALID_IMAGE_SIZE: usize = 100;

/// Maximum display name length
pub const MAX_NAME_LEN: usize = 64;

/// Maximum feed marker / name prefix length
pub const MAX_LABEL_LEN: usize = 32;

/// Maximum number of scheduled refresh times
pub const MAX_UPDATE_TIMES: usize = 24;

/// Display name string
pub type Name = HString<MAX_NAME_LEN>;

/// Short label string
pub type Label = HString<MAX_LABEL_LEN>;

/// Wall-clock time of day in UTC, minute resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdateTime {
    pub hour: u8,
    pub minute: u8,
}

impl UpdateTime {
    /// Create a time, `None` if out of range
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Parse "HH:MM"
    pub fn parse(s: &str) -> Option<Self> {
        let (hour, minute) = s.trim().split_once(':')?;
        let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(hour) || !two_digits(minute) {
            return None;
        }
        Self::new(hour.parse().ok()?, minute.parse().ok()?)
    }
}

/// Crop margins sent to the conversion endpoint, in source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CropProfile {
    pub top: u16,
    pub bottom: u16,
    pub left: Option<u16>,
    pub right: Option<u16>,
}

/// An image that is always shown, ahead of feed-derived images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticImage {
    pub url: String,
    pub name: Name,
}

impl StaticImage {
    /// Create a static image entry, truncating the name to [`MAX_NAME_LEN`]
    pub fn new(url: &str, name: &str) -> Self {
        Self {
            url: String::from(url),
            name: truncated(name),
        }
    }
}

/// Feed source settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Feed document URL
    pub url: String,
    /// Items whose title contains this keyword are inspected for images
    pub marker: Label,
    /// Feed images are named "<prefix> <n>", n counting from 1
    pub name_prefix: Label,
    /// Request timeout
    pub timeout_ms: u32,
    /// Upper bound on the downloaded document size
    pub max_bytes: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::from("https://www.nhc.noaa.gov/index-at.xml"),
            marker: truncated("Graphics"),
            name_prefix: truncated("Hurricane Cone"),
            timeout_ms: 15_000,
            max_bytes: 512 * 1024,
        }
    }
}

/// Conversion endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Endpoint that turns a remote image into a pixel container
    pub endpoint: String,
    /// Requested color format name
    pub color_format: Label,
    pub dither: bool,
    /// Requested output container kind
    pub output: Label,
    pub big_endian: bool,
    pub max_width: u16,
    pub max_height: u16,
    /// Crop used for URLs that match a static image
    pub outlook_crop: CropProfile,
    /// Crop used for every other URL
    pub default_crop: CropProfile,
    /// Request timeout
    pub timeout_ms: u32,
    /// Upper bound on a single converted image
    pub max_bytes: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://converter.local:8080/convert"),
            color_format: truncated("RGB565"),
            dither: true,
            output: truncated("bin"),
            big_endian: false,
            max_width: 800,
            max_height: 420,
            outlook_crop: CropProfile {
                top: 65,
                bottom: 70,
                left: None,
                right: None,
            },
            default_crop: CropProfile {
                top: 50,
                bottom: 40,
                left: Some(7),
                right: Some(7),
            },
            timeout_ms: 30_000,
            max_bytes: 1024 * 1024,
        }
    }
}

/// Refresh and rotation timing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduleConfig {
    /// UTC times at which a refresh cycle runs
    pub update_times: Vec<UpdateTime, MAX_UPDATE_TIMES>,
    /// How often the wall clock is compared against `update_times`
    pub poll_interval_s: u32,
    /// Time each image stays on screen
    pub rotation_interval_ms: u32,
    /// Delay after the network comes up before the first cycle
    pub network_settle_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let mut update_times = Vec::new();
        for hour in (0..24).step_by(3) {
            if let Some(time) = UpdateTime::new(hour, 10) {
                let _ = update_times.push(time);
            }
        }
        Self {
            update_times,
            poll_interval_s: 60,
            rotation_interval_ms: 10_000,
            network_settle_ms: 3_000,
        }
    }
}

/// Backlight power saving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightConfig {
    /// Inactivity time before the backlight is switched off
    pub timeout_ms: u32,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self { timeout_ms: 60_000 }
    }
}

/// Wall-clock synchronization settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSyncConfig {
    /// Endpoint answering with a JSON object carrying `unixtime`
    pub url: String,
    pub attempts: u8,
    pub retry_delay_ms: u32,
    pub timeout_ms: u32,
}

impl Default for TimeSyncConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://worldtimeapi.org/api/timezone/Etc/UTC"),
            attempts: 10,
            retry_delay_ms: 5_000,
            timeout_ms: 10_000,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub conversion: ConversionConfig,
    /// Always-shown images, in display order
    pub static_images: Vec<StaticImage, MAX_IMAGES>,
    pub schedule: ScheduleConfig,
    pub backlight: BacklightConfig,
    pub time_sync: TimeSyncConfig,
}

impl AppConfig {
    /// Configuration with no static images and default sections
    pub fn empty() -> Self {
        Self {
            feed: FeedConfig::default(),
            conversion: ConversionConfig::default(),
            static_images: Vec::new(),
            schedule: ScheduleConfig::default(),
            backlight: BacklightConfig::default(),
            time_sync: TimeSyncConfig::default(),
        }
    }

    /// Check whether `url` is one of the static images
    pub fn is_static_url(&self, url: &str) -> bool {
        self.static_images.iter().any(|image| image.url == url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut config = Self::empty();
        let _ = config.static_images.push(StaticImage::new(
            "https://www.nhc.noaa.gov/xgtwo/two_atl_7d0.png",
            "Atlantic 7-Day Outlook",
        ));
        let _ = config.static_images.push(StaticImage::new(
            "https://www.nhc.noaa.gov/xgtwo/two_atl_2d0.png",
            "Atlantic 2-Day Outlook",
        ));
        config
    }
}

/// Copy `s` into a bounded string, dropping whatever does not fit
pub fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut out = HString::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
