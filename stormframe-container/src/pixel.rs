//! Pixel format tags
//!
//! The container carries a one-byte color format code. Codes follow the
//! LVGL v9 color format numbering used by the conversion endpoint.

/// Pixel layout of a container payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// 8-bit luminance
    L8,
    /// 8-bit alpha only
    A8,
    /// 16-bit RGB 5-6-5
    Rgb565,
    /// 24-bit RGB
    Rgb888,
    /// 32-bit ARGB
    Argb8888,
    /// 32-bit RGB with an ignored padding byte
    Xrgb8888,
    /// RGB565 with a separate 8-bit alpha plane
    Rgb565A8,
    /// 24-bit ARGB with 16-bit color
    Argb8565,
}

/// Every recognized format, in code order
pub const KNOWN_FORMATS: [PixelFormat; 8] = [
    PixelFormat::L8,
    PixelFormat::A8,
    PixelFormat::Rgb888,
    PixelFormat::Argb8888,
    PixelFormat::Xrgb8888,
    PixelFormat::Rgb565,
    PixelFormat::Argb8565,
    PixelFormat::Rgb565A8,
];

impl PixelFormat {
    /// Format assumed for unrecognized codes
    pub const DEFAULT: PixelFormat = PixelFormat::Rgb565;

    /// Look up a format code, `None` if the code is not recognized
    pub const fn lookup(code: u8) -> Option<Self> {
        match code {
            0x06 => Some(PixelFormat::L8),
            0x0E => Some(PixelFormat::A8),
            0x0F => Some(PixelFormat::Rgb888),
            0x10 => Some(PixelFormat::Argb8888),
            0x11 => Some(PixelFormat::Xrgb8888),
            0x12 => Some(PixelFormat::Rgb565),
            0x13 => Some(PixelFormat::Argb8565),
            0x14 => Some(PixelFormat::Rgb565A8),
            _ => None,
        }
    }

    /// Total mapping from code to format
    ///
    /// Unknown codes map to [`PixelFormat::DEFAULT`].
    pub const fn from_code(code: u8) -> Self {
        match Self::lookup(code) {
            Some(format) => format,
            None => Self::DEFAULT,
        }
    }

    /// Wire code for this format
    pub const fn code(self) -> u8 {
        match self {
            PixelFormat::L8 => 0x06,
            PixelFormat::A8 => 0x0E,
            PixelFormat::Rgb888 => 0x0F,
            PixelFormat::Argb8888 => 0x10,
            PixelFormat::Xrgb8888 => 0x11,
            PixelFormat::Rgb565 => 0x12,
            PixelFormat::Argb8565 => 0x13,
            PixelFormat::Rgb565A8 => 0x14,
        }
    }

    /// Payload bytes per pixel
    ///
    /// For [`PixelFormat::Rgb565A8`] this includes the trailing alpha plane.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::L8 | PixelFormat::A8 => 1,
            PixelFormat::Rgb565 => 2,
            PixelFormat::Rgb888 | PixelFormat::Rgb565A8 | PixelFormat::Argb8565 => 3,
            PixelFormat::Argb8888 | PixelFormat::Xrgb8888 => 4,
        }
    }

    /// Short name used in logs and conversion requests
    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::L8 => "L8",
            PixelFormat::A8 => "A8",
            PixelFormat::Rgb565 => "RGB565",
            PixelFormat::Rgb888 => "RGB888",
            PixelFormat::Argb8888 => "ARGB8888",
            PixelFormat::Xrgb8888 => "XRGB8888",
            PixelFormat::Rgb565A8 => "RGB565A8",
            PixelFormat::Argb8565 => "ARGB8565",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_roundtrip() {
        for format in KNOWN_FORMATS {
            assert_eq!(PixelFormat::lookup(format.code()), Some(format));
        }
    }

    #[test]
    fn test_unknown_code_defaults_to_rgb565() {
        assert_eq!(PixelFormat::lookup(0x00), None);
        assert_eq!(PixelFormat::from_code(0x00), PixelFormat::Rgb565);
        assert_eq!(PixelFormat::from_code(0xFF), PixelFormat::Rgb565);
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Rgb888.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Argb8888.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::L8.bytes_per_pixel(), 1);
    }
}
