//! HTTP transport trait

use crate::slots::{BufferError, DownloadBuffer};

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
}

/// A single outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    pub url: &'a str,
    /// Request body, sent as `application/json` when present
    pub json_body: Option<&'a [u8]>,
    /// The whole exchange must finish within this time
    pub timeout_ms: u32,
}

impl<'a> Request<'a> {
    /// GET request
    pub fn get(url: &'a str, timeout_ms: u32) -> Self {
        Self {
            method: Method::Get,
            url,
            json_body: None,
            timeout_ms,
        }
    }

    /// POST request with a JSON body
    pub fn post_json(url: &'a str, body: &'a [u8], timeout_ms: u32) -> Self {
        Self {
            method: Method::Post,
            url,
            json_body: Some(body),
            timeout_ms,
        }
    }
}

/// Errors that can occur while performing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Request did not complete within its timeout
    Timeout,
    /// URL could not be parsed or uses an unsupported scheme
    InvalidUrl,
    /// Name resolution failed
    Dns,
    /// TCP or TLS connection failed
    Connect,
    /// Malformed response or broken connection mid-body
    Protocol,
    /// Response body did not fit the download buffer
    Buffer(BufferError),
}

impl From<BufferError> for TransportError {
    fn from(e: BufferError) -> Self {
        TransportError::Buffer(e)
    }
}

/// Trait for the network transport
///
/// Implementations stream the response body into `sink` with
/// [`DownloadBuffer::append`], calling [`DownloadBuffer::reserve_hint`] first
/// when the response declares its length. Every request must be bounded by
/// its `timeout_ms`; a timeout is reported as [`TransportError::Timeout`].
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    /// Perform `request` and return the response status code
    async fn fetch(
        &mut self,
        request: &Request<'_>,
        sink: &mut DownloadBuffer,
    ) -> Result<u16, TransportError>;
}
