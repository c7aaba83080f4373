//! Client error types.

use hive_core::ContentAddress;
use thiserror::Error;

/// Result type for node API operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by a node's API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The node's API returned a failure.
    #[error("api error: {message}")]
    Api {
        /// Error message from the node.
        message: String,
    },

    /// The requested content is not available on the node.
    #[error("content not found: {address}")]
    NotFound {
        /// The content address that was requested.
        address: ContentAddress,
    },

    /// No usable postage batch could be created or reused.
    #[error("postage batch unavailable: {message}")]
    BatchUnavailable {
        /// Why the batch could not be obtained.
        message: String,
    },

    /// Waiting for a tag to report synced timed out or failed.
    #[error("tag {tag} did not sync: {message}")]
    SyncFailed {
        /// The tag that was polled.
        tag: u64,
        /// Why the wait ended without sync.
        message: String,
    },

    /// A call exceeded its deadline.
    #[error("timeout: {operation}")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
    },
}

/// Result type for orchestration operations.
pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Errors surfaced by the orchestration platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    /// No orchestration backend is configured.
    ///
    /// This is a tolerable sentinel, not a failure: callers that consult
    /// stop/start state must treat it as "no stopped nodes known".
    #[error("orchestration client not set")]
    NotSet,

    /// The platform does not know the named node.
    #[error("node not found: {name}")]
    NodeNotFound {
        /// The node name that was requested.
        name: String,
    },

    /// The platform returned a failure.
    #[error("orchestration error: {message}")]
    Api {
        /// Error message from the platform.
        message: String,
    },
}

impl OrchestrationError {
    /// Returns true for the tolerable "not configured" sentinel.
    #[must_use]
    pub const fn is_not_set(&self) -> bool {
        matches!(self, Self::NotSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_set_is_distinguishable() {
        assert!(OrchestrationError::NotSet.is_not_set());
        assert!(!OrchestrationError::Api {
            message: "boom".to_string()
        }
        .is_not_set());
    }

    #[test]
    fn test_client_error_display_names_address() {
        let addr = ContentAddress::zero();
        let err = ClientError::NotFound { address: addr };
        assert!(format!("{err}").contains(&addr.to_string()));
    }
}
