//! Rotation through valid slots
//!
//! The scheduler only decides which slot comes next; the timer that drives
//! it lives in the firmware.

pub mod gallery;
pub mod scheduler;

pub use gallery::Gallery;
pub use scheduler::{RotationScheduler, Selection};
