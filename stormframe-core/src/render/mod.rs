//! Render boundary
//!
//! The pipeline hands the painter a [`Frame`]: a decoded descriptor, the
//! pixel bytes it describes, and the text shown beneath the image. Layout and
//! drawing belong to the painter.

pub mod caption;
pub mod placeholder;

use stormframe_container::ImageDescriptor;

pub use caption::{caption, Caption, FALLBACK_NAME};
pub use placeholder::{placeholder, PLACEHOLDER_CONTAINER};

/// Next image to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub descriptor: ImageDescriptor,
    /// Exactly `descriptor.payload_len` bytes
    pub pixels: &'a [u8],
    /// Display name, empty for the placeholder
    pub name: &'a str,
    /// Unix time of the decode that produced this frame
    pub updated_at: Option<i64>,
}

impl Frame<'_> {
    /// Caption text for this frame
    ///
    /// Falls back to `now` when the frame carries no timestamp.
    pub fn caption(&self, now: Option<i64>) -> Caption {
        caption(self.name, self.updated_at.or(now))
    }
}
