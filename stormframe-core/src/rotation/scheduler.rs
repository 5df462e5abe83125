//! Rotation scheduler

use crate::slots::SlotStore;

/// What to show next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Selection {
    /// Show this slot
    Slot(usize),
    /// No slot is valid
    Placeholder,
}

/// Round-robin cursor over the slot store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationScheduler {
    current: usize,
}

impl RotationScheduler {
    pub const fn new() -> Self {
        Self { current: 0 }
    }

    /// Index the next selection scan starts from
    pub fn current(&self) -> usize {
        self.current
    }

    /// Find the first valid slot at or after the cursor, wrapping once
    ///
    /// The found index becomes the cursor.
    pub fn select<const N: usize>(&mut self, store: &SlotStore<N>) -> Selection {
        let span = sweep(store);
        if span == 0 {
            return Selection::Placeholder;
        }

        for offset in 0..span {
            let index = (self.current + offset) % span;
            if store.slot(index).is_some_and(|slot| slot.is_valid()) {
                self.current = index;
                return Selection::Slot(index);
            }
        }
        Selection::Placeholder
    }

    /// Move past the slot that was just shown
    pub fn advance<const N: usize>(&mut self, store: &SlotStore<N>) {
        let span = sweep(store);
        self.current = if span == 0 { 0 } else { (self.current + 1) % span };
    }

    /// Start over from the first slot
    pub fn restart(&mut self) {
        self.current = 0;
    }
}

/// Slots considered by a sweep: the active ones, or all of them when no
/// source is assigned
fn sweep<const N: usize>(store: &SlotStore<N>) -> usize {
    match store.active_count() {
        0 => N,
        active => active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::truncated;
    use crate::slots::{DownloadBuffer, ImageSource};
    use alloc::vec::Vec;
    use stormframe_container::{ContainerHeader, PixelFormat};

    fn store_with(valid: &[bool]) -> SlotStore<4> {
        let mut store = SlotStore::new();
        store.assign_sources(valid.iter().enumerate().map(|(i, _)| ImageSource {
            url: alloc::format!("http://x/{i}.png"),
            name: truncated("img"),
        }));
        for (i, ok) in valid.iter().enumerate() {
            if *ok {
                let mut bytes = ContainerHeader::new(PixelFormat::L8, 2, 2).encode().to_vec();
                bytes.extend_from_slice(&[0; 4]);
                store.set_buffer(i, DownloadBuffer::from_bytes(&bytes).unwrap());
                store.decode_slot(i, None);
            }
        }
        store
    }

    fn visits(store: &SlotStore<4>, count: usize) -> Vec<Selection> {
        let mut rotation = RotationScheduler::new();
        (0..count)
            .map(|_| {
                let selection = rotation.select(store);
                rotation.advance(store);
                selection
            })
            .collect()
    }

    #[test]
    fn test_three_valid_slots_cycle() {
        let store = store_with(&[true, true, true]);
        let expected: Vec<_> = [0, 1, 2, 0, 1, 2].into_iter().map(Selection::Slot).collect();
        assert_eq!(visits(&store, 6), expected);
    }

    #[test]
    fn test_invalid_slots_skipped() {
        let store = store_with(&[false, true, false, true]);
        let expected: Vec<_> = [1, 3, 1, 3].into_iter().map(Selection::Slot).collect();
        assert_eq!(visits(&store, 4), expected);
    }

    #[test]
    fn test_nothing_valid_is_placeholder() {
        let store = store_with(&[false, false]);
        let mut rotation = RotationScheduler::new();
        assert_eq!(rotation.select(&store), Selection::Placeholder);
        assert_eq!(rotation.current(), 0);

        let empty = SlotStore::<4>::new();
        assert_eq!(rotation.select(&empty), Selection::Placeholder);
    }

    #[test]
    fn test_cursor_wraps_when_store_shrinks() {
        let mut rotation = RotationScheduler::new();
        let big = store_with(&[true, true, true, true]);
        for _ in 0..3 {
            rotation.select(&big);
            rotation.advance(&big);
        }
        assert_eq!(rotation.current(), 3);

        let small = store_with(&[true, true]);
        assert_eq!(rotation.select(&small), Selection::Slot(1));
    }
}
