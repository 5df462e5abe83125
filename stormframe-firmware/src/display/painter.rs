//! Frame layout and drawing
//!
//! ```text
//! ┌──────────────────────────────┐
//! │                              │
//! │      image, centered         │  IMAGE_HEIGHT
//! │                              │
//! ├──────────────────────────────┤
//! │  Name                        │  CAPTION_HEIGHT
//! │  Last updated: ...           │
//! └──────────────────────────────┘
//! ```

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};

use stormframe_container::PixelFormat;
use stormframe_core::render::Frame;

pub const WIDTH: usize = 800;
pub const HEIGHT: usize = 480;
/// Two caption lines of FONT_10X20 plus padding
pub const CAPTION_HEIGHT: usize = 48;
pub const IMAGE_HEIGHT: usize = HEIGHT - CAPTION_HEIGHT;
/// RGB565, two bytes per pixel
pub const FRAME_BYTES: usize = WIDTH * HEIGHT * 2;

/// RGB565 little-endian framebuffer
pub struct Canvas<'a> {
    bytes: &'a mut [u8],
}

impl<'a> Canvas<'a> {
    /// `bytes` must hold at least [`FRAME_BYTES`]
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    fn put(&mut self, x: usize, y: usize, color: Rgb565) {
        let offset = (y * WIDTH + x) * 2;
        if let Some(dst) = self.bytes.get_mut(offset..offset + 2) {
            dst.copy_from_slice(&RawU16::from(color).into_inner().to_le_bytes());
        }
    }
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                if x < WIDTH && y < HEIGHT {
                    self.put(x, y, color);
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let [lo, hi] = RawU16::from(color).into_inner().to_le_bytes();
        for pair in self.bytes[..FRAME_BYTES].chunks_exact_mut(2) {
            pair[0] = lo;
            pair[1] = hi;
        }
        Ok(())
    }
}

/// Draw an image with its caption
///
/// Images larger than the image area are clipped around their center.
pub fn paint_frame(canvas: &mut Canvas<'_>, frame: &Frame<'_>, caption: &str, big_endian: bool) {
    let _ = canvas.clear(Rgb565::BLACK);
    blit(canvas, frame, big_endian);
    draw_caption(canvas, caption);
}

/// Full-screen status text, e.g. while the first cycle runs
pub fn paint_message(canvas: &mut Canvas<'_>, text: &str) {
    let _ = canvas.clear(Rgb565::BLACK);
    let style = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
    let center = Point::new(WIDTH as i32 / 2, HEIGHT as i32 / 2);
    let _ = Text::with_alignment(text, center, style, Alignment::Center).draw(canvas);
}

fn draw_caption(canvas: &mut Canvas<'_>, caption: &str) {
    let style = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
    // Baseline of the first line
    let origin = Point::new(WIDTH as i32 / 2, IMAGE_HEIGHT as i32 + 18);
    let _ = Text::with_alignment(caption, origin, style, Alignment::Center).draw(canvas);
}

fn blit(canvas: &mut Canvas<'_>, frame: &Frame<'_>, big_endian: bool) {
    let width = frame.descriptor.width as usize;
    let height = frame.descriptor.height as usize;
    let format = frame.descriptor.format;

    let (src_x, dst_x, cols) = center(width, WIDTH);
    let (src_y, dst_y, rows) = center(height, IMAGE_HEIGHT);

    for row in 0..rows {
        for col in 0..cols {
            let index = (src_y + row) * width + src_x + col;
            if let Some(color) = sample(format, frame.pixels, index, big_endian) {
                canvas.put(dst_x + col, dst_y + row, color);
            }
        }
    }
}

/// (source offset, destination offset, visible length) for one axis
fn center(len: usize, room: usize) -> (usize, usize, usize) {
    if len <= room {
        (0, (room - len) / 2, len)
    } else {
        ((len - room) / 2, 0, room)
    }
}

/// Color of pixel `index` in a packed payload
///
/// Multi-byte colors are stored blue first. Planar RGB565A8 keeps its color
/// plane ahead of the alpha plane; alpha is ignored everywhere.
fn sample(format: PixelFormat, pixels: &[u8], index: usize, big_endian: bool) -> Option<Rgb565> {
    let at = |offset: usize, len: usize| pixels.get(offset..offset + len);
    let color = match format {
        PixelFormat::L8 | PixelFormat::A8 => {
            let v = *pixels.get(index)?;
            Rgb565::new(v >> 3, v >> 2, v >> 3)
        }
        PixelFormat::Rgb565 | PixelFormat::Rgb565A8 => {
            let b = at(index * 2, 2)?;
            rgb565_from(b[0], b[1], big_endian)
        }
        PixelFormat::Argb8565 => {
            let b = at(index * 3, 2)?;
            rgb565_from(b[0], b[1], big_endian)
        }
        PixelFormat::Rgb888 => {
            let b = at(index * 3, 3)?;
            Rgb565::new(b[2] >> 3, b[1] >> 2, b[0] >> 3)
        }
        PixelFormat::Argb8888 | PixelFormat::Xrgb8888 => {
            let b = at(index * 4, 3)?;
            Rgb565::new(b[2] >> 3, b[1] >> 2, b[0] >> 3)
        }
    };
    Some(color)
}

fn rgb565_from(first: u8, second: u8, big_endian: bool) -> Rgb565 {
    let raw = if big_endian {
        u16::from_be_bytes([first, second])
    } else {
        u16::from_le_bytes([first, second])
    };
    RawU16::new(raw).into()
}
