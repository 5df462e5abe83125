//! Board-agnostic core logic for the Stormframe hazard display
//!
//! This crate contains everything that does not touch the radio, the panel
//! or the allocator setup:
//!
//! - Feed parsing (XML bytes to image URLs)
//! - Image slot store and download buffers
//! - Retrieval engine driving one refresh cycle
//! - Rotation scheduling and the update cadence
//! - Backlight power policy
//! - Wall-clock synchronization
//! - Render boundary types, caption text and the built-in placeholder
//! - Configuration types and collaborator traits

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod backlight;
pub mod cadence;
pub mod config;
pub mod feed;
pub mod render;
pub mod retrieval;
pub mod rotation;
pub mod slots;
pub mod timesync;
pub mod traits;
