//! Node API abstraction.
//!
//! This module provides a trait-based abstraction over a fleet node's
//! upload/download/status API, allowing different backends (real HTTP
//! clients, the in-memory simulated fleet for tests).

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use hive_core::{ContentAddress, FileHash};

use crate::error::ClientResult;
use crate::types::{BatchId, NodeAddresses, Settlements, Tag, Topology};

/// Options attached to an upload.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// The prepaid postage batch paying for the upload.
    pub batch_id: BatchId,
    /// Optional tag tracking sync progress of the uploaded content.
    pub tag: Option<u64>,
}

impl UploadOptions {
    /// Creates upload options for a batch with no tag.
    #[must_use]
    pub const fn new(batch_id: BatchId) -> Self {
        Self {
            batch_id,
            tag: None,
        }
    }

    /// Attaches a tag to the upload.
    #[must_use]
    pub const fn with_tag(mut self, tag: u64) -> Self {
        self.tag = Some(tag);
        self
    }
}

/// Result of a whole-file download.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Size of the downloaded object in bytes.
    pub size: u64,
    /// Whole-object hash of the downloaded bytes.
    pub hash: FileHash,
    /// The downloaded bytes.
    pub data: Bytes,
}

/// The resolved capability to call one node's API.
///
/// Implementors are handed to the verification engine per run and must
/// never be cached across a node being stopped and restarted.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Returns the node name this client talks to.
    fn name(&self) -> &str;

    /// Uploads a file, paid for by the batch in `opts`.
    ///
    /// Returns the file's content address as computed by the node.
    async fn upload_file(&self, data: Bytes, opts: UploadOptions) -> ClientResult<ContentAddress>;

    /// Downloads a file by content address.
    async fn download_file(&self, address: ContentAddress) -> ClientResult<DownloadedFile>;

    /// Uploads a single chunk, paid for by the batch in `opts`.
    ///
    /// Returns the chunk's content address as computed by the node.
    async fn upload_chunk(&self, data: Bytes, opts: UploadOptions) -> ClientResult<ContentAddress>;

    /// Downloads a single chunk by content address.
    async fn download_chunk(&self, address: ContentAddress) -> ClientResult<Bytes>;

    /// Creates a new postage batch and returns its ID.
    async fn create_postage_batch(
        &self,
        amount: u64,
        depth: u64,
        label: &str,
    ) -> ClientResult<BatchId>;

    /// Returns a usable existing batch or creates one.
    ///
    /// Used by long-running simulations to avoid paying for a fresh batch
    /// every sweep.
    async fn get_or_create_batch(
        &self,
        amount: u64,
        depth: u64,
        label: &str,
    ) -> ClientResult<BatchId>;

    /// Creates a tag for tracking sync progress.
    async fn create_tag(&self) -> ClientResult<Tag>;

    /// Blocks until the tagged upload has finished syncing to the network.
    async fn wait_sync(&self, tag: u64) -> ClientResult<()>;

    /// Reports whether the node holds the given chunk.
    async fn has_chunk(&self, address: ContentAddress) -> ClientResult<bool>;

    /// Returns the node's addresses.
    async fn addresses(&self) -> ClientResult<NodeAddresses>;

    /// Returns the node's per-peer balances.
    async fn balances(&self) -> ClientResult<BTreeMap<String, i64>>;

    /// Returns the overlays of the node's connected peers.
    async fn peers(&self) -> ClientResult<Vec<String>>;

    /// Returns the node's settlement ledger.
    async fn settlements(&self) -> ClientResult<Settlements>;

    /// Returns the node's Kademlia topology view.
    async fn topology(&self) -> ClientResult<Topology>;
}
