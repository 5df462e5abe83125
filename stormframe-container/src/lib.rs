//! Pixel container format
//!
//! The conversion endpoint returns images as a fixed 12-byte header followed
//! by a raw pixel payload. This crate validates that header and produces a
//! descriptor the renderer can use directly against the downloaded bytes.
//!
//! # Container Layout
//!
//! All multi-byte fields are little-endian and read at fixed offsets:
//! ```text
//! ┌───────┬────────┬───────┬───────┬────────┬────────┬──────────┬─────────────┐
//! │ MAGIC │ FORMAT │ FLAGS │ WIDTH │ HEIGHT │ STRIDE │ RESERVED │ PAYLOAD     │
//! │ 1B    │ 1B     │ 2B    │ 2B    │ 2B     │ 2B     │ 2B       │ W × H × bpp │
//! └───────┴────────┴───────┴───────┴────────┴────────┴──────────┴─────────────┘
//! ```
//!
//! A wrong magic byte or an unknown format code is reported as a warning and
//! decoding continues. Size and dimension problems are hard errors.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod decode;
pub mod header;
pub mod pixel;

pub use decode::{decode, DecodeError, DecodeWarning, Decoded, ImageDescriptor, Warnings};
pub use header::{
    ContainerHeader, CONTAINER_MAGIC, HEADER_SIZE, MAX_DIMENSION, MIN_CONTAINER_SIZE,
};
pub use pixel::PixelFormat;
