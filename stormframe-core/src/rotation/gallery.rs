//! Slot store paired with its rotation cursor
//!
//! The gallery is the unit handed between the display and update tasks.
//! Whoever holds it is the only reader or writer of the slots.

use super::scheduler::{RotationScheduler, Selection};
use crate::render::{placeholder, Frame};
use crate::slots::SlotStore;

#[derive(Debug, Default)]
pub struct Gallery<const N: usize> {
    store: SlotStore<N>,
    rotation: RotationScheduler,
}

impl<const N: usize> Gallery<N> {
    pub fn new() -> Self {
        Self {
            store: SlotStore::new(),
            rotation: RotationScheduler::new(),
        }
    }

    /// Mutable store access for a refresh cycle
    ///
    /// The rotation restarts from the first slot since indices change meaning.
    pub fn begin_refresh(&mut self) -> &mut SlotStore<N> {
        self.rotation.restart();
        &mut self.store
    }

    /// True when at least one slot can be shown
    pub fn has_images(&self) -> bool {
        self.store.valid_count() > 0
    }

    /// Frame at the rotation cursor, or the placeholder
    pub fn current_frame(&mut self) -> (Selection, Frame<'_>) {
        let selection = self.rotation.select(&self.store);
        let frame = match selection {
            Selection::Slot(index) => self.store.frame(index).unwrap_or_else(|| placeholder()),
            Selection::Placeholder => placeholder(),
        };
        (selection, frame)
    }

    /// Step past the frame just shown
    pub fn advance(&mut self) {
        self.rotation.advance(&self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::truncated;
    use crate::render::PLACEHOLDER_CONTAINER;
    use crate::slots::{DownloadBuffer, ImageSource};
    use alloc::string::String;
    use stormframe_container::{ContainerHeader, PixelFormat};

    #[test]
    fn test_empty_gallery_shows_placeholder() {
        let mut gallery = Gallery::<3>::new();
        let (selection, frame) = gallery.current_frame();
        assert_eq!(selection, Selection::Placeholder);
        assert_eq!(frame.pixels.as_ptr(), PLACEHOLDER_CONTAINER[12..].as_ptr());
        assert!(!gallery.has_images());
    }

    #[test]
    fn test_refresh_then_rotate() {
        let mut gallery = Gallery::<3>::new();
        let store = gallery.begin_refresh();
        store.assign_sources([
            ImageSource {
                url: String::from("http://x/a.png"),
                name: truncated("A"),
            },
            ImageSource {
                url: String::from("http://x/b.png"),
                name: truncated("B"),
            },
        ]);
        for i in 0..2 {
            let mut bytes = ContainerHeader::new(PixelFormat::Rgb565, 4, 4).encode().to_vec();
            bytes.resize(bytes.len() + 32, 0);
            store.set_buffer(i, DownloadBuffer::from_bytes(&bytes).unwrap());
            store.decode_slot(i, Some(0));
        }

        assert!(gallery.has_images());
        assert_eq!(gallery.current_frame().1.name, "A");
        gallery.advance();
        assert_eq!(gallery.current_frame().1.name, "B");
        gallery.advance();
        assert_eq!(gallery.current_frame().1.name, "A");
    }
}
