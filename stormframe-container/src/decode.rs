//! Container validation and descriptor extraction

use heapless::Vec;

use crate::header::{ContainerHeader, CONTAINER_MAGIC, HEADER_SIZE, MAX_DIMENSION, MIN_CONTAINER_SIZE};
use crate::pixel::PixelFormat;

/// Hard decode failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Input shorter than [`MIN_CONTAINER_SIZE`]
    TooSmall { len: usize },
    /// Input long enough to look like a container but shorter than a header
    HeaderTruncated { len: usize },
    /// Width or height is zero or above [`MAX_DIMENSION`]
    InvalidDimensions { width: u16, height: u16 },
    /// Input does not hold the full payload declared by the header
    Truncated { expected: usize, actual: usize },
}

/// Non-fatal findings while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeWarning {
    /// First byte was not [`CONTAINER_MAGIC`]
    BadMagic(u8),
    /// Format code not recognized, payload treated as [`PixelFormat::DEFAULT`]
    UnknownFormat(u8),
}

/// Warnings collected by a single decode (at most one of each kind)
pub type Warnings = Vec<DecodeWarning, 2>;

/// Everything the renderer needs to draw a decoded container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageDescriptor {
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
    pub stride: u16,
    pub flags: u16,
    /// Offset of the first pixel byte, always [`HEADER_SIZE`]
    pub payload_offset: usize,
    /// Pixel bytes following the header
    pub payload_len: usize,
}

impl ImageDescriptor {
    /// Borrow the pixel payload out of the bytes this descriptor was decoded from
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> Option<&'a [u8]> {
        bytes.get(self.payload_offset..self.payload_offset + self.payload_len)
    }
}

/// Successful decode result
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoded {
    pub descriptor: ImageDescriptor,
    pub warnings: Warnings,
}

/// Validate a container and describe its payload
///
/// Never reads past the end of `bytes`. Trailing bytes after the declared
/// payload are ignored.
pub fn decode(bytes: &[u8]) -> Result<Decoded, DecodeError> {
    let len = bytes.len();
    if len < MIN_CONTAINER_SIZE {
        return Err(DecodeError::TooSmall { len });
    }
    let header = ContainerHeader::read(bytes).ok_or(DecodeError::HeaderTruncated { len })?;

    let mut warnings = Warnings::new();

    if header.magic != CONTAINER_MAGIC {
        // Capacity covers both warning kinds
        let _ = warnings.push(DecodeWarning::BadMagic(header.magic));
    }

    let (width, height) = (header.width, header.height);
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    let format = match PixelFormat::lookup(header.format_code) {
        Some(format) => format,
        None => {
            let _ = warnings.push(DecodeWarning::UnknownFormat(header.format_code));
            PixelFormat::DEFAULT
        }
    };

    let payload_len = width as usize * height as usize * format.bytes_per_pixel();
    let expected = payload_len + HEADER_SIZE;
    if len < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: len,
        });
    }

    Ok(Decoded {
        descriptor: ImageDescriptor {
            width,
            height,
            format,
            stride: header.stride,
            flags: header.flags,
            payload_offset: HEADER_SIZE,
            payload_len,
        },
        warnings,
    })
}
