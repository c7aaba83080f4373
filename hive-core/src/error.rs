//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when constructing core data types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An address string was not valid hex of the expected length.
    #[error("invalid address '{input}': {reason}")]
    InvalidAddress {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A chunk payload exceeded the maximum size.
    #[error("chunk payload too large: {actual} bytes, max {max}")]
    ChunkTooLarge {
        /// The actual payload size.
        actual: usize,
        /// The maximum allowed payload size.
        max: usize,
    },

    /// A chunk payload was empty.
    #[error("chunk payload is empty")]
    EmptyChunk,
}
