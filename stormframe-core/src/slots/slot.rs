//! A single image slot

use alloc::string::String;

use stormframe_container::ImageDescriptor;

use super::buffer::DownloadBuffer;
use crate::config::Name;

/// Where a slot's image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub url: String,
    pub name: Name,
}

/// Size and validity of a slot's download buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferInfo {
    /// Bytes written
    pub filled: usize,
    /// Bytes allocated
    pub allocated: usize,
    pub valid: bool,
}

/// One entry of the slot store
///
/// A slot is valid exactly when it holds a descriptor, and a descriptor is
/// only ever stored next to the buffer it was decoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSlot {
    pub(super) url: String,
    pub(super) name: Name,
    pub(super) buffer: Option<DownloadBuffer>,
    pub(super) descriptor: Option<ImageDescriptor>,
    pub(super) updated_at: Option<i64>,
}

impl ImageSlot {
    /// Source URL, empty when the slot is inactive
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a source is assigned
    pub fn is_active(&self) -> bool {
        !self.url.is_empty()
    }

    /// Whether the slot holds a decoded image
    pub fn is_valid(&self) -> bool {
        self.descriptor.is_some()
    }

    /// Raw container bytes, if any
    pub fn bytes(&self) -> Option<&[u8]> {
        self.buffer.as_ref().map(DownloadBuffer::as_slice)
    }

    /// Decoded descriptor, present only while valid
    pub fn descriptor(&self) -> Option<&ImageDescriptor> {
        self.descriptor.as_ref()
    }

    /// Unix time of the last successful decode
    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    /// Buffer size and validity
    pub fn buffer_info(&self) -> BufferInfo {
        match &self.buffer {
            Some(buffer) => BufferInfo {
                filled: buffer.len(),
                allocated: buffer.capacity(),
                valid: self.is_valid(),
            },
            None => BufferInfo::default(),
        }
    }

    /// Drop the buffer and any decode result
    pub(super) fn release(&mut self) {
        self.buffer = None;
        self.descriptor = None;
        self.updated_at = None;
    }
}
