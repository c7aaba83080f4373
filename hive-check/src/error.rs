//! Verification error types.
//!
//! Three tiers of failure exist. Configuration errors surface before any
//! network call. Per-unit errors are fatal in single-shot checks but
//! recorded-and-continued in the long-running simulation. Metrics push
//! failures are logged and never abort a run.

use hive_client::ClientError;
use hive_cluster::ClusterError;
use hive_core::ContentAddress;
use thiserror::Error;

/// Result type for verification runs.
pub type CheckResult<T> = Result<T, CheckError>;

/// Errors surfaced by a verification run.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The run options are unusable.
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// What was wrong with the options.
        reason: String,
    },

    /// A postage batch could not be created on the upload node.
    #[error("batch creation failed on {node}")]
    BatchCreationFailed {
        /// The upload node.
        node: String,
        /// The underlying API failure.
        source: ClientError,
    },

    /// An upload did not complete.
    #[error("upload failed on {node}")]
    UploadFailed {
        /// The upload node.
        node: String,
        /// The underlying API failure.
        source: ClientError,
    },

    /// The tagged upload never reported synced.
    #[error("sync did not complete on {node} for {address}")]
    SyncTimeout {
        /// The upload node whose tag was polled.
        node: String,
        /// The content that was waiting to sync.
        address: ContentAddress,
        /// The underlying API failure.
        source: ClientError,
    },

    /// A download did not complete.
    #[error("download failed on {node} for {address}")]
    DownloadFailed {
        /// The download node.
        node: String,
        /// The content address that was requested.
        address: ContentAddress,
        /// The underlying API failure.
        source: ClientError,
    },

    /// Downloaded content does not match what was uploaded.
    #[error(
        "content mismatch on {node} for {address}: uploaded {uploaded_size} bytes, downloaded {downloaded_size}"
    )]
    ContentMismatch {
        /// The download node that served the wrong bytes.
        node: String,
        /// The content address that was compared.
        address: ContentAddress,
        /// Size of the uploaded content.
        uploaded_size: u64,
        /// Size of the downloaded content.
        downloaded_size: u64,
    },

    /// The run was cancelled and the caller asked for the cause.
    #[error("run cancelled after {sweeps} sweeps")]
    Cancelled {
        /// Sweeps completed before cancellation.
        sweeps: u64,
    },

    /// A topology-level operation failed.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display_names_both_sizes() {
        let err = CheckError::ContentMismatch {
            node: "bee-1".to_string(),
            address: ContentAddress::zero(),
            uploaded_size: 4096,
            downloaded_size: 4095,
        };
        let rendered = format!("{err}");
        assert!(rendered.contains("4096"));
        assert!(rendered.contains("4095"));
        assert!(rendered.contains("bee-1"));
    }

    #[test]
    fn test_sync_timeout_names_node_and_address() {
        let address = ContentAddress::zero();
        let err = CheckError::SyncTimeout {
            node: "bee-0".to_string(),
            address,
            source: ClientError::SyncFailed {
                tag: 9,
                message: "stalled".to_string(),
            },
        };
        let rendered = format!("{err}");
        assert!(rendered.contains("bee-0"));
        assert!(rendered.contains(&address.to_string()));
    }
}
