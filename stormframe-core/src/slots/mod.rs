//! Image slot storage
//!
//! Slots are the single source of truth for which images exist and whether
//! they can be shown. The store is owned by one task at a time and moved
//! between tasks rather than shared.

pub mod buffer;
pub mod slot;
pub mod store;

pub use buffer::{BufferError, DownloadBuffer};
pub use slot::{BufferInfo, ImageSlot, ImageSource};
pub use store::SlotStore;
