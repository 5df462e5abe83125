//! Retrieval engine
//!
//! Drives one refresh cycle: feed download, source planning, image
//! conversion requests and batch decode. Network access goes through the
//! [`HttpClient`](crate::traits::HttpClient) trait.
//!
//! ```text
//!   feed GET ──► FeedParser ──► plan_sources ──► SlotStore::assign_sources
//!                                                     │
//!   per slot: ConversionRequest ──► POST ──► DownloadBuffer ──► set_buffer
//!                                                     │
//!                                            decode_slot (all slots)
//! ```

pub mod engine;
pub mod plan;
pub mod request;

pub use engine::{
    CycleObserver, CycleOutcome, CycleReport, FeedOutcome, FetchFailure, RetrievalEngine,
    SlotOutcome,
};
pub use plan::{plan_sources, SourcePlan};
pub use request::{ConversionRequest, Crop, MaxSize, RequestError};
