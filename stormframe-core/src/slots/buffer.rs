//! Streaming download accumulator

use alloc::vec::Vec;

/// Errors that can occur while accumulating a download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// Data would exceed the buffer's byte limit
    LimitExceeded { limit: usize },
    /// The allocator could not provide the requested capacity
    OutOfMemory { requested: usize },
}

/// Growable byte buffer with a hard size limit
///
/// All growth goes through `try_reserve`, so allocation failure is an error
/// instead of an abort. Once an append fails the caller is expected to drop
/// the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadBuffer {
    data: Vec<u8>,
    limit: usize,
}

impl DownloadBuffer {
    /// Create an empty buffer that accepts at most `limit` bytes
    pub const fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// Create a buffer holding `bytes`, limited to exactly their length
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BufferError> {
        let mut buffer = Self::new(bytes.len());
        buffer.append(bytes)?;
        Ok(buffer)
    }

    /// Reserve room for a body of `total` bytes announced up front
    ///
    /// Fails without allocating if `total` is over the limit.
    pub fn reserve_hint(&mut self, total: usize) -> Result<(), BufferError> {
        if total > self.limit {
            return Err(BufferError::LimitExceeded { limit: self.limit });
        }
        let additional = total.saturating_sub(self.data.len());
        self.data
            .try_reserve_exact(additional)
            .map_err(|_| BufferError::OutOfMemory {
                requested: additional,
            })
    }

    /// Append a chunk of body bytes
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        if self.data.len() + bytes.len() > self.limit {
            return Err(BufferError::LimitExceeded { limit: self.limit });
        }
        self.data
            .try_reserve(bytes.len())
            .map_err(|_| BufferError::OutOfMemory {
                requested: bytes.len(),
            })?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes written
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Currently allocated capacity
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Discard contents and release the allocation
    pub fn release(&mut self) {
        self.data = Vec::new();
    }
}
