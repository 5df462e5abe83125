//! Fixed-capacity slot store

use core::array;

use stormframe_container::{decode, DecodeError, Decoded};

use super::buffer::DownloadBuffer;
use super::slot::{BufferInfo, ImageSlot, ImageSource};
use crate::render::Frame;

/// Fixed-capacity collection of image slots
///
/// Indices are stable for a whole refresh cycle. Setters ignore out-of-range
/// indices and getters return `None` for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStore<const N: usize> {
    slots: [ImageSlot; N],
    active: usize,
}

impl<const N: usize> Default for SlotStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SlotStore<N> {
    /// Create a store with every slot empty
    pub fn new() -> Self {
        Self {
            slots: array::from_fn(|_| ImageSlot::default()),
            active: 0,
        }
    }

    /// Slot capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of slots with an assigned source
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Number of slots holding a decoded image
    pub fn valid_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_valid()).count()
    }

    /// Borrow a slot
    pub fn slot(&self, index: usize) -> Option<&ImageSlot> {
        self.slots.get(index)
    }

    /// Clear every source URL and display name
    pub fn clear_sources(&mut self) {
        for slot in &mut self.slots {
            slot.url.clear();
            slot.name.clear();
        }
        self.active = 0;
    }

    /// Replace all sources with `sources`, in order
    ///
    /// Sources beyond capacity are dropped; the number dropped is returned.
    /// Buffers are left alone.
    pub fn assign_sources<I>(&mut self, sources: I) -> usize
    where
        I: IntoIterator<Item = ImageSource>,
    {
        self.clear_sources();
        let mut dropped = 0;
        for source in sources {
            match self.slots.get_mut(self.active) {
                Some(slot) => {
                    slot.url = source.url;
                    slot.name = source.name;
                    self.active += 1;
                }
                None => dropped += 1,
            }
        }
        dropped
    }

    /// Buffer size and validity of a slot
    pub fn buffer_info(&self, index: usize) -> Option<BufferInfo> {
        self.slots.get(index).map(ImageSlot::buffer_info)
    }

    /// Install a downloaded buffer
    ///
    /// Any previous buffer and decode result is dropped first; the slot stays
    /// invalid until [`SlotStore::decode_slot`] succeeds.
    pub fn set_buffer(&mut self, index: usize, buffer: DownloadBuffer) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.release();
            slot.buffer = Some(buffer);
        }
    }

    /// Release a slot's buffer and invalidate it
    pub fn reset(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.release();
        }
    }

    /// Release every buffer
    pub fn reset_all(&mut self) {
        for slot in &mut self.slots {
            slot.release();
        }
    }

    /// Decode a slot's buffer
    ///
    /// Returns `None` when there is nothing to decode. On success the slot
    /// becomes valid and is stamped with `now`. On failure the buffer is
    /// released and the slot stays invalid.
    pub fn decode_slot(
        &mut self,
        index: usize,
        now: Option<i64>,
    ) -> Option<Result<Decoded, DecodeError>> {
        let slot = self.slots.get_mut(index)?;
        let bytes = slot.buffer.as_ref().filter(|b| !b.is_empty())?.as_slice();

        let result = decode(bytes);
        match &result {
            Ok(decoded) => {
                slot.descriptor = Some(decoded.descriptor);
                slot.updated_at = now;
            }
            Err(_) => slot.release(),
        }
        Some(result)
    }

    /// Render view of a valid slot
    pub fn frame(&self, index: usize) -> Option<Frame<'_>> {
        let slot = self.slots.get(index)?;
        let descriptor = slot.descriptor.as_ref()?;
        let pixels = descriptor.payload(slot.bytes()?)?;
        Some(Frame {
            descriptor: *descriptor,
            pixels,
            name: slot.name(),
            updated_at: slot.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::truncated;
    use alloc::string::String;
    use stormframe_container::{ContainerHeader, PixelFormat, HEADER_SIZE};

    fn source(url: &str, name: &str) -> ImageSource {
        ImageSource {
            url: String::from(url),
            name: truncated(name),
        }
    }

    fn container(width: u16, height: u16) -> DownloadBuffer {
        let header = ContainerHeader::new(PixelFormat::Rgb565, width, height);
        let mut bytes = header.encode().to_vec();
        bytes.resize(HEADER_SIZE + width as usize * height as usize * 2, 0xAB);
        DownloadBuffer::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_assign_sources_truncates_to_capacity() {
        let mut store = SlotStore::<3>::new();
        let dropped = store.assign_sources([
            source("a", "A"),
            source("b", "B"),
            source("c", "C"),
            source("d", "D"),
        ]);
        assert_eq!(dropped, 1);
        assert_eq!(store.active_count(), 3);
        assert_eq!(store.slot(2).unwrap().url(), "c");
    }

    #[test]
    fn test_reassign_clears_old_sources() {
        let mut store = SlotStore::<3>::new();
        store.assign_sources([source("a", "A"), source("b", "B"), source("c", "C")]);
        store.assign_sources([source("x", "X")]);
        assert_eq!(store.active_count(), 1);
        assert!(!store.slot(1).unwrap().is_active());
        assert_eq!(store.slot(1).unwrap().name(), "");
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut store = SlotStore::<2>::new();
        store.set_buffer(5, container(2, 2));
        store.reset(5);
        assert_eq!(store.buffer_info(5), None);
        assert!(store.decode_slot(5, None).is_none());
        assert!(store.slot(5).is_none());
    }

    #[test]
    fn test_decode_marks_valid() {
        let mut store = SlotStore::<2>::new();
        store.assign_sources([source("a", "Alpha")]);
        store.set_buffer(0, container(4, 2));

        let result = store.decode_slot(0, Some(1_700_000_000)).unwrap();
        assert!(result.is_ok());
        assert_eq!(store.valid_count(), 1);

        let info = store.buffer_info(0).unwrap();
        assert!(info.valid);
        assert_eq!(info.filled, HEADER_SIZE + 16);
        assert!(info.filled <= info.allocated);

        let frame = store.frame(0).unwrap();
        assert_eq!(frame.name, "Alpha");
        assert_eq!(frame.pixels.len(), 16);
        assert_eq!(frame.updated_at, Some(1_700_000_000));
    }

    #[test]
    fn test_decode_failure_releases_buffer() {
        let mut store = SlotStore::<1>::new();
        store.set_buffer(0, DownloadBuffer::from_bytes(&[0x19; 11]).unwrap());

        let result = store.decode_slot(0, None).unwrap();
        assert!(result.is_err());
        assert_eq!(store.buffer_info(0), Some(BufferInfo::default()));
    }

    #[test]
    fn test_reset_after_populate() {
        let mut store = SlotStore::<1>::new();
        store.set_buffer(0, container(2, 2));
        store.decode_slot(0, None);
        assert!(store.slot(0).unwrap().is_valid());

        store.reset(0);
        let info = store.buffer_info(0).unwrap();
        assert_eq!(info.filled, 0);
        assert!(!info.valid);
        assert!(store.slot(0).unwrap().bytes().is_none());

        // Second reset is harmless
        store.reset(0);
        assert!(store.frame(0).is_none());
    }

    #[test]
    fn test_set_buffer_invalidates() {
        let mut store = SlotStore::<1>::new();
        store.set_buffer(0, container(2, 2));
        store.decode_slot(0, None);
        store.set_buffer(0, container(3, 3));
        assert!(!store.slot(0).unwrap().is_valid());
    }

    #[test]
    fn test_empty_buffer_not_decoded() {
        let mut store = SlotStore::<1>::new();
        store.set_buffer(0, DownloadBuffer::new(64));
        assert!(store.decode_slot(0, None).is_none());
        assert!(!store.slot(0).unwrap().is_valid());
    }
}
