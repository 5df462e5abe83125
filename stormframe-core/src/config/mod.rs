//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware fills these from its
//! embedded TOML file; every section has a working default.

pub mod types;

pub use types::*;
