//! Wall-clock synchronization over HTTP
//!
//! One attempt fetches a JSON time document and reads its `unixtime` field.
//! Retrying and pacing belong to the caller.

use serde::Deserialize;

use crate::config::TimeSyncConfig;
use crate::slots::DownloadBuffer;
use crate::traits::{HttpClient, Request, TransportError};

/// Largest accepted time document
const MAX_RESPONSE_BYTES: usize = 4 * 1024;

/// Errors from a single synchronization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeSyncError {
    Transport(TransportError),
    /// Response status other than 200
    Status(u16),
    /// Body is not JSON or has no integer `unixtime`
    InvalidResponse,
}

impl From<TransportError> for TimeSyncError {
    fn from(e: TransportError) -> Self {
        TimeSyncError::Transport(e)
    }
}

#[derive(Deserialize)]
struct TimeDocument {
    unixtime: i64,
}

/// Extract `unixtime` from a time document
pub fn parse_time_response(body: &[u8]) -> Result<i64, TimeSyncError> {
    serde_json::from_slice::<TimeDocument>(body)
        .map(|doc| doc.unixtime)
        .map_err(|_| TimeSyncError::InvalidResponse)
}

/// Fetch the current Unix time once
pub async fn fetch_unix_time<H: HttpClient>(
    http: &mut H,
    config: &TimeSyncConfig,
) -> Result<i64, TimeSyncError> {
    let mut body = DownloadBuffer::new(MAX_RESPONSE_BYTES);
    let status = http
        .fetch(&Request::get(&config.url, config.timeout_ms), &mut body)
        .await?;
    if status != 200 {
        return Err(TimeSyncError::Status(status));
    }
    parse_time_response(body.as_slice())
}
