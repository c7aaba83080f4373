//! System limits and configuration bounds.
//!
//! Following TigerStyle: put limits on everything. Every payload and
//! network wait has an explicit maximum so a run is predictable.

use crate::chunk::MAX_CHUNK_PAYLOAD;

/// System-wide limits for Hive runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum chunk payload size in bytes.
    pub max_chunk_payload: u32,
    /// Maximum file size a check will generate, in bytes.
    pub max_file_bytes: u64,
    /// Maximum number of upload nodes in a single run.
    pub max_upload_nodes: u32,
    /// Default node API call timeout in microseconds.
    pub default_api_timeout_us: u64,
    /// Maximum time to wait for a tag to report synced, in microseconds.
    pub max_sync_wait_us: u64,
}

impl Limits {
    /// Creates limits with safe defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_chunk_payload: MAX_CHUNK_PAYLOAD as u32,
            // 1 GiB test files are already far beyond what a check needs.
            max_file_bytes: 1024 * 1024 * 1024,
            max_upload_nodes: 1024,
            // 30s API timeout, 5min sync wait.
            default_api_timeout_us: 30_000_000,
            max_sync_wait_us: 300_000_000,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}
