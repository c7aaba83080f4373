//! In-memory simulated fleet.
//!
//! A [`SimNetwork`] models a fully-replicated content-addressed network:
//! every upload lands in a shared store and becomes retrievable from all
//! registered nodes. Per-node fault knobs let tests exercise the
//! verification engine's failure paths without any real network.
//!
//! This mirrors the simulated backend pattern used for object storage:
//! same trait, canned in-memory behavior.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use hive_core::{content_address, hash_bytes, ContentAddress, OverlayAddress};

use crate::api::{DownloadedFile, NodeClient, UploadOptions};
use crate::error::{ClientError, ClientResult};
use crate::types::{BatchId, Bin, NodeAddresses, Settlement, Settlements, Tag, Topology};

/// Fault knobs for one simulated node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimFaults {
    /// Fail every batch creation call.
    pub fail_batch: bool,
    /// Fail every upload call.
    pub fail_upload: bool,
    /// Fail every `wait_sync` call.
    pub fail_sync: bool,
    /// Fail every download call.
    pub fail_download: bool,
    /// Serve downloads with the first byte flipped.
    pub corrupt_download: bool,
    /// Fail every state query (addresses, balances, peers, settlements,
    /// topology).
    pub fail_state_queries: bool,
}

#[derive(Debug, Default)]
struct NetworkState {
    /// Registered node name -> overlay.
    nodes: BTreeMap<String, OverlayAddress>,
    /// Stored payloads by content address.
    objects: HashMap<ContentAddress, Bytes>,
    /// Which nodes hold which address.
    holders: HashMap<ContentAddress, BTreeSet<String>>,
    /// Reusable batch per node, for `get_or_create_batch`.
    batches: BTreeMap<String, BatchId>,
    next_tag: u64,
    next_batch: u64,
}

/// A shared in-memory network that simulated nodes upload to and
/// download from.
#[derive(Debug, Clone, Default)]
pub struct SimNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl SimNetwork {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node and returns its client handle.
    ///
    /// The node's overlay is derived deterministically from its name.
    #[must_use]
    pub fn node(&self, name: impl Into<String>) -> SimNode {
        self.node_with_faults(name, SimFaults::default())
    }

    /// Registers a node with fault knobs.
    #[must_use]
    pub fn node_with_faults(&self, name: impl Into<String>, faults: SimFaults) -> SimNode {
        let name = name.into();
        let overlay = OverlayAddress::new(*hash_bytes(name.as_bytes()).bytes());
        self.state
            .lock()
            .expect("sim network lock")
            .nodes
            .insert(name.clone(), overlay);
        SimNode {
            name,
            overlay,
            faults,
            state: Arc::clone(&self.state),
        }
    }

    /// Stores a payload held only by the given nodes.
    ///
    /// Test hook for replication-factor scenarios. Returns the payload's
    /// content address.
    pub fn seed_object(&self, data: Bytes, holders: &[&str]) -> ContentAddress {
        let address = content_address(&data);
        let mut state = self.state.lock().expect("sim network lock");
        state.objects.insert(address, data);
        state.holders.insert(
            address,
            holders.iter().map(|n| (*n).to_string()).collect(),
        );
        address
    }

    fn store(&self, data: &Bytes) -> ContentAddress {
        let address = content_address(data);
        let mut state = self.state.lock().expect("sim network lock");
        // Full replication: every registered node ends up holding it.
        let all: BTreeSet<String> = state.nodes.keys().cloned().collect();
        state.objects.insert(address, data.clone());
        state.holders.insert(address, all);
        address
    }
}

/// Client handle for one simulated node.
#[derive(Debug, Clone)]
pub struct SimNode {
    name: String,
    overlay: OverlayAddress,
    faults: SimFaults,
    state: Arc<Mutex<NetworkState>>,
}

impl SimNode {
    /// Returns the node's overlay address.
    #[must_use]
    pub const fn overlay(&self) -> OverlayAddress {
        self.overlay
    }

    fn fetch(&self, address: ContentAddress) -> ClientResult<Bytes> {
        if self.faults.fail_download {
            return Err(ClientError::Api {
                message: format!("{}: download refused", self.name),
            });
        }
        let state = self.state.lock().expect("sim network lock");
        let data = state
            .objects
            .get(&address)
            .cloned()
            .ok_or(ClientError::NotFound { address })?;
        drop(state);

        if self.faults.corrupt_download {
            let mut corrupted = data.to_vec();
            if let Some(first) = corrupted.first_mut() {
                *first ^= 0xFF;
            }
            return Ok(Bytes::from(corrupted));
        }
        Ok(data)
    }

    fn network(&self) -> SimNetwork {
        SimNetwork {
            state: Arc::clone(&self.state),
        }
    }

    fn state_query_guard(&self) -> ClientResult<()> {
        if self.faults.fail_state_queries {
            return Err(ClientError::Api {
                message: format!("{}: status endpoint unavailable", self.name),
            });
        }
        Ok(())
    }

    fn peer_overlays(&self) -> Vec<String> {
        let state = self.state.lock().expect("sim network lock");
        state
            .nodes
            .iter()
            .filter(|(name, _)| *name != &self.name)
            .map(|(_, overlay)| overlay.to_string())
            .collect()
    }
}

#[async_trait]
impl NodeClient for SimNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upload_file(&self, data: Bytes, _opts: UploadOptions) -> ClientResult<ContentAddress> {
        if self.faults.fail_upload {
            return Err(ClientError::Api {
                message: format!("{}: upload refused", self.name),
            });
        }
        Ok(self.network().store(&data))
    }

    async fn download_file(&self, address: ContentAddress) -> ClientResult<DownloadedFile> {
        let data = self.fetch(address)?;
        Ok(DownloadedFile {
            size: data.len() as u64,
            hash: hash_bytes(&data),
            data,
        })
    }

    async fn upload_chunk(&self, data: Bytes, _opts: UploadOptions) -> ClientResult<ContentAddress> {
        if self.faults.fail_upload {
            return Err(ClientError::Api {
                message: format!("{}: upload refused", self.name),
            });
        }
        Ok(self.network().store(&data))
    }

    async fn download_chunk(&self, address: ContentAddress) -> ClientResult<Bytes> {
        self.fetch(address)
    }

    async fn create_postage_batch(
        &self,
        _amount: u64,
        depth: u64,
        label: &str,
    ) -> ClientResult<BatchId> {
        if self.faults.fail_batch {
            return Err(ClientError::BatchUnavailable {
                message: format!("{}: batch creation refused", self.name),
            });
        }
        let mut state = self.state.lock().expect("sim network lock");
        state.next_batch += 1;
        Ok(BatchId::new(format!(
            "sim-{label}-d{depth}-{:04}",
            state.next_batch
        )))
    }

    async fn get_or_create_batch(
        &self,
        amount: u64,
        depth: u64,
        label: &str,
    ) -> ClientResult<BatchId> {
        let existing = {
            let state = self.state.lock().expect("sim network lock");
            state.batches.get(&self.name).cloned()
        };
        if let Some(batch) = existing {
            return Ok(batch);
        }
        let batch = self.create_postage_batch(amount, depth, label).await?;
        self.state
            .lock()
            .expect("sim network lock")
            .batches
            .insert(self.name.clone(), batch.clone());
        Ok(batch)
    }

    async fn create_tag(&self) -> ClientResult<Tag> {
        let mut state = self.state.lock().expect("sim network lock");
        state.next_tag += 1;
        Ok(Tag {
            uid: state.next_tag,
        })
    }

    async fn wait_sync(&self, tag: u64) -> ClientResult<()> {
        if self.faults.fail_sync {
            return Err(ClientError::SyncFailed {
                tag,
                message: format!("{}: sync never completed", self.name),
            });
        }
        Ok(())
    }

    async fn has_chunk(&self, address: ContentAddress) -> ClientResult<bool> {
        let state = self.state.lock().expect("sim network lock");
        Ok(state
            .holders
            .get(&address)
            .is_some_and(|holders| holders.contains(&self.name)))
    }

    async fn addresses(&self) -> ClientResult<NodeAddresses> {
        self.state_query_guard()?;
        let overlay_hex = self.overlay.to_string();
        Ok(NodeAddresses {
            overlay: self.overlay,
            underlay: vec![format!("/dns/{}", self.name)],
            ethereum: format!("0x{}", &overlay_hex[..40]),
        })
    }

    async fn balances(&self) -> ClientResult<BTreeMap<String, i64>> {
        self.state_query_guard()?;
        Ok(self
            .peer_overlays()
            .into_iter()
            .map(|peer| (peer, 10_000))
            .collect())
    }

    async fn peers(&self) -> ClientResult<Vec<String>> {
        self.state_query_guard()?;
        Ok(self.peer_overlays())
    }

    async fn settlements(&self) -> ClientResult<Settlements> {
        self.state_query_guard()?;
        let settlements: BTreeMap<String, Settlement> = self
            .peer_overlays()
            .into_iter()
            .map(|peer| (peer, Settlement::default()))
            .collect();
        Ok(Settlements {
            settlements,
            total_received: 0,
            total_sent: 0,
        })
    }

    async fn topology(&self) -> ClientResult<Topology> {
        self.state_query_guard()?;
        let peers = self.peer_overlays();
        #[allow(clippy::cast_possible_truncation)] // fleets are small.
        let connected = peers.len() as u32;
        let mut bins = BTreeMap::new();
        bins.insert(
            "bin_0".to_string(),
            Bin {
                population: connected,
                connected,
                peers,
            },
        );
        Ok(Topology {
            population: connected,
            connected,
            depth: u32::from(connected > 0),
            bins,
        })
    }
}
