//! Fixed 12-byte container header
//!
//! Header format:
//! - MAGIC (1 byte): 0x19
//! - FORMAT (1 byte): color format code, see [`PixelFormat`]
//! - FLAGS (2 bytes): opaque, carried through
//! - WIDTH (2 bytes)
//! - HEIGHT (2 bytes)
//! - STRIDE (2 bytes): bytes per row, carried through
//! - RESERVED (2 bytes)

use crate::pixel::PixelFormat;

/// Header size in bytes
pub const HEADER_SIZE: usize = 12;

/// Inputs shorter than this are rejected before the header is examined
pub const MIN_CONTAINER_SIZE: usize = 8;

/// Expected first byte of every container
pub const CONTAINER_MAGIC: u8 = 0x19;

/// Largest accepted width or height
pub const MAX_DIMENSION: u16 = 4096;

/// Raw header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContainerHeader {
    pub magic: u8,
    pub format_code: u8,
    pub flags: u16,
    pub width: u16,
    pub height: u16,
    pub stride: u16,
    pub reserved: u16,
}

impl ContainerHeader {
    /// Build a header for a tightly packed image of the given format
    pub const fn new(format: PixelFormat, width: u16, height: u16) -> Self {
        Self {
            magic: CONTAINER_MAGIC,
            format_code: format.code(),
            flags: 0,
            width,
            height,
            stride: width.wrapping_mul(format.bytes_per_pixel() as u16),
            reserved: 0,
        }
    }

    /// Read header fields from the first [`HEADER_SIZE`] bytes
    ///
    /// Returns `None` if `bytes` is shorter than a header.
    pub fn read(bytes: &[u8]) -> Option<Self> {
        let raw: &[u8; HEADER_SIZE] = bytes.get(..HEADER_SIZE)?.try_into().ok()?;
        Some(Self::from_bytes(raw))
    }

    /// Read header fields from an exact header array
    pub const fn from_bytes(raw: &[u8; HEADER_SIZE]) -> Self {
        Self {
            magic: raw[0],
            format_code: raw[1],
            flags: u16::from_le_bytes([raw[2], raw[3]]),
            width: u16::from_le_bytes([raw[4], raw[5]]),
            height: u16::from_le_bytes([raw[6], raw[7]]),
            stride: u16::from_le_bytes([raw[8], raw[9]]),
            reserved: u16::from_le_bytes([raw[10], raw[11]]),
        }
    }

    /// Encode the header into its wire form
    pub const fn encode(&self) -> [u8; HEADER_SIZE] {
        let flags = self.flags.to_le_bytes();
        let width = self.width.to_le_bytes();
        let height = self.height.to_le_bytes();
        let stride = self.stride.to_le_bytes();
        let reserved = self.reserved.to_le_bytes();
        [
            self.magic,
            self.format_code,
            flags[0],
            flags[1],
            width[0],
            width[1],
            height[0],
            height[1],
            stride[0],
            stride[1],
            reserved[0],
            reserved[1],
        ]
    }

    /// Payload size implied by the header, using the resolved format
    pub fn payload_len(&self) -> usize {
        self.width as usize
            * self.height as usize
            * PixelFormat::from_code(self.format_code).bytes_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_known_bytes() {
        let raw = [
            0x19, 0x12, 0x00, 0x00, 0x20, 0x03, 0xA4, 0x01, 0x40, 0x06, 0x00, 0x00,
        ];
        let header = ContainerHeader::read(&raw).unwrap();

        assert_eq!(header.magic, CONTAINER_MAGIC);
        assert_eq!(header.format_code, 0x12);
        assert_eq!(header.width, 800);
        assert_eq!(header.height, 420);
        assert_eq!(header.stride, 1600);
        assert_eq!(header.payload_len(), 800 * 420 * 2);
    }

    #[test]
    fn test_read_short_input() {
        assert_eq!(ContainerHeader::read(&[0x19; 11]), None);
    }

    #[test]
    fn test_encode_matches_read() {
        let header = ContainerHeader::new(PixelFormat::Rgb888, 3, 2);
        let raw = header.encode();
        assert_eq!(raw[0], CONTAINER_MAGIC);
        assert_eq!(raw[1], 0x0F);
        assert_eq!(ContainerHeader::read(&raw), Some(header));
        assert_eq!(header.stride, 9);
    }
}
