//! Feed parsing
//!
//! Extracts image URLs from the hazard feed. Knows nothing about the network
//! or the slot store.

pub mod parser;
pub mod text;

pub use parser::{FeedError, FeedParser, FeedScan, MAX_DESCRIPTION_BYTES, MAX_TITLE_BYTES};
