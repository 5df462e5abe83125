//! Conversion endpoint request body

use alloc::vec::Vec;
use core::fmt::Write;

use heapless::String;
use serde::{Serialize, Serializer};

use crate::config::{AppConfig, CropProfile};

/// Errors building a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// JSON encoding failed (allocation or formatting)
    Encode,
}

/// Crop margins as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Crop {
    pub top: u16,
    pub bottom: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<u16>,
}

impl From<CropProfile> for Crop {
    fn from(profile: CropProfile) -> Self {
        Self {
            top: profile.top,
            bottom: profile.bottom,
            left: profile.left,
            right: profile.right,
        }
    }
}

/// Bounding box serialized as "WxH"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxSize {
    pub width: u16,
    pub height: u16,
}

impl Serialize for MaxSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut text = String::<12>::new();
        // Two u16 values and a separator always fit
        let _ = write!(text, "{}x{}", self.width, self.height);
        serializer.serialize_str(&text)
    }
}

/// The endpoint expects the dither flag as a string
fn flag_as_str<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "true" } else { "false" })
}

/// JSON body asking the endpoint to fetch and convert one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionRequest<'a> {
    pub url: &'a str,
    pub cf: &'a str,
    #[serde(serialize_with = "flag_as_str")]
    pub dither: bool,
    pub output: &'a str,
    #[serde(rename = "bigEndian")]
    pub big_endian: bool,
    #[serde(rename = "maxSize")]
    pub max_size: MaxSize,
    pub crop: Crop,
}

impl<'a> ConversionRequest<'a> {
    /// Build the request for `url`
    ///
    /// URLs equal to a static image get the outlook crop, everything else the
    /// default crop.
    pub fn for_url(url: &'a str, config: &'a AppConfig) -> Self {
        let conversion = &config.conversion;
        let crop = if config.is_static_url(url) {
            conversion.outlook_crop
        } else {
            conversion.default_crop
        };
        Self {
            url,
            cf: &conversion.color_format,
            dither: conversion.dither,
            output: &conversion.output,
            big_endian: conversion.big_endian,
            max_size: MaxSize {
                width: conversion.max_width,
                height: conversion.max_height,
            },
            crop: crop.into(),
        }
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<Vec<u8>, RequestError> {
        serde_json::to_vec(self).map_err(|_| RequestError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outlook_request_body() {
        let config = AppConfig::default();
        let url = "https://www.nhc.noaa.gov/xgtwo/two_atl_7d0.png";
        let body = ConversionRequest::for_url(url, &config).to_json().unwrap();
        assert_eq!(
            core::str::from_utf8(&body).unwrap(),
            r#"{"url":"https://www.nhc.noaa.gov/xgtwo/two_atl_7d0.png","cf":"RGB565","dither":"true","output":"bin","bigEndian":false,"maxSize":"800x420","crop":{"top":65,"bottom":70}}"#
        );
    }

    #[test]
    fn test_default_crop_for_feed_url() {
        let config = AppConfig::default();
        let body = ConversionRequest::for_url("http://x/cone.png", &config)
            .to_json()
            .unwrap();
        let text = core::str::from_utf8(&body).unwrap();
        assert!(text.ends_with(r#""crop":{"top":50,"bottom":40,"left":7,"right":7}}"#));
    }

    #[test]
    fn test_url_is_escaped() {
        let config = AppConfig::default();
        let body = ConversionRequest::for_url("http://x/a\"b.png", &config)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["url"], "http://x/a\"b.png");
    }
}
