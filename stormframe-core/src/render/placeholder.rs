//! Built-in fallback image
//!
//! Shown whenever no slot holds a valid image. It is a regular container
//! baked into flash at compile time, so it can never fail to decode.

use stormframe_container::{ContainerHeader, ImageDescriptor, PixelFormat, HEADER_SIZE};

use super::Frame;

pub const PLACEHOLDER_WIDTH: u16 = 96;
pub const PLACEHOLDER_HEIGHT: u16 = 64;

const STRIPE_WIDTH: usize = 8;
const AMBER: u16 = 0xFD20;
const SLATE: u16 = 0x2945;

const PAYLOAD_LEN: usize = PLACEHOLDER_WIDTH as usize * PLACEHOLDER_HEIGHT as usize * 2;
const CONTAINER_LEN: usize = HEADER_SIZE + PAYLOAD_LEN;

/// Diagonal hazard stripes, little-endian RGB565
pub static PLACEHOLDER_CONTAINER: [u8; CONTAINER_LEN] = build();

const PLACEHOLDER_DESCRIPTOR: ImageDescriptor = ImageDescriptor {
    width: PLACEHOLDER_WIDTH,
    height: PLACEHOLDER_HEIGHT,
    format: PixelFormat::Rgb565,
    stride: PLACEHOLDER_WIDTH * 2,
    flags: 0,
    payload_offset: HEADER_SIZE,
    payload_len: PAYLOAD_LEN,
};

const fn build() -> [u8; CONTAINER_LEN] {
    let header = ContainerHeader::new(PixelFormat::Rgb565, PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT)
        .encode();
    let mut out = [0u8; CONTAINER_LEN];

    let mut i = 0;
    while i < HEADER_SIZE {
        out[i] = header[i];
        i += 1;
    }

    let width = PLACEHOLDER_WIDTH as usize;
    let mut y = 0;
    while y < PLACEHOLDER_HEIGHT as usize {
        let mut x = 0;
        while x < width {
            let color = if ((x + y) / STRIPE_WIDTH) % 2 == 0 {
                AMBER
            } else {
                SLATE
            };
            let at = HEADER_SIZE + (y * width + x) * 2;
            let bytes = color.to_le_bytes();
            out[at] = bytes[0];
            out[at + 1] = bytes[1];
            x += 1;
        }
        y += 1;
    }
    out
}

/// Frame for the built-in placeholder
pub fn placeholder() -> Frame<'static> {
    Frame {
        descriptor: PLACEHOLDER_DESCRIPTOR,
        pixels: &PLACEHOLDER_CONTAINER[HEADER_SIZE..],
        name: "",
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormframe_container::decode;

    #[test]
    fn test_placeholder_decodes_cleanly() {
        let decoded = decode(&PLACEHOLDER_CONTAINER).unwrap();
        assert!(decoded.warnings.is_empty());
        assert_eq!(decoded.descriptor, PLACEHOLDER_DESCRIPTOR);
    }

    #[test]
    fn test_placeholder_frame() {
        let frame = placeholder();
        assert_eq!(frame.pixels.len(), frame.descriptor.payload_len);
        assert_eq!(&frame.pixels[..2], &AMBER.to_le_bytes());
    }
}
