//! Seeded chunk content units.
//!
//! A chunk is the smallest content-addressed unit the fleet stores. Its
//! address is derived from its bytes: Keccak-256 over an 8-byte
//! little-endian span (the payload length) followed by the payload. The
//! addressing scheme must match what the storage network computes, since
//! address equality is how retrieval is verified.

use bytes::Bytes;
use rand::Rng;
use sha3::{Digest, Keccak256};

use crate::address::ContentAddress;
use crate::error::CoreError;

/// Maximum chunk payload size in bytes.
pub const MAX_CHUNK_PAYLOAD: usize = 4096;

/// A content-addressed chunk of test data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    data: Bytes,
}

impl Chunk {
    /// Creates a chunk from an existing payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is empty or exceeds
    /// [`MAX_CHUNK_PAYLOAD`].
    pub fn new(data: Bytes) -> Result<Self, CoreError> {
        if data.is_empty() {
            return Err(CoreError::EmptyChunk);
        }
        if data.len() > MAX_CHUNK_PAYLOAD {
            return Err(CoreError::ChunkTooLarge {
                actual: data.len(),
                max: MAX_CHUNK_PAYLOAD,
            });
        }
        Ok(Self { data })
    }

    /// Draws a chunk with a random size in `1..=MAX_CHUNK_PAYLOAD` and
    /// random payload bytes from the generator.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let size = rng.gen_range(1..=MAX_CHUNK_PAYLOAD);
        let mut data = vec![0u8; size];
        rng.fill(&mut data[..]);
        Self {
            data: Bytes::from(data),
        }
    }

    /// Returns the chunk payload.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Computes the chunk's content address.
    ///
    /// Keccak-256 over the 8-byte little-endian span followed by the
    /// payload bytes.
    #[must_use]
    pub fn address(&self) -> ContentAddress {
        content_address(&self.data)
    }
}

/// Computes the content address for a byte sequence.
///
/// Shared by [`Chunk`], [`crate::File`] and node client implementations
/// so every party derives the same address for the same bytes.
#[must_use]
pub fn content_address(data: &[u8]) -> ContentAddress {
    let span = (data.len() as u64).to_le_bytes();
    let mut hasher = Keccak256::new();
    hasher.update(span);
    hasher.update(data);
    ContentAddress::new(hasher.finalize().into())
}
