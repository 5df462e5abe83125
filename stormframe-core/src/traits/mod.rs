//! Collaborator traits
//!
//! These traits define the interface between the pipeline and the
//! platform-specific network stack and clock.

pub mod clock;
pub mod http;

pub use clock::WallClock;
pub use http::{HttpClient, Method, Request, TransportError};
