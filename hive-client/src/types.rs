//! Wire types exchanged with a node's API.
//!
//! Read-mostly views the topology model aggregates into cluster-wide
//! maps. Peer-keyed maps use `BTreeMap` so iteration order is stable
//! across runs.

use std::collections::BTreeMap;
use std::fmt;

use hive_core::OverlayAddress;

/// Opaque handle for a prepaid postage batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchId(String);

impl BatchId {
    /// Creates a batch ID from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the batch ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Liveness handle returned on chunk upload, polled for sync completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Tag identifier assigned by the upload node.
    pub uid: u64,
}

/// A node's addresses as reported by its API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddresses {
    /// Address in the content-addressed routing space.
    pub overlay: OverlayAddress,
    /// Network-reachable underlay addresses.
    pub underlay: Vec<String>,
    /// On-chain account the node settles with.
    pub ethereum: String,
}

/// Per-peer settlement totals for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settlement {
    /// Amount received from the peer.
    pub received: u64,
    /// Amount sent to the peer.
    pub sent: u64,
}

/// A node's settlement ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settlements {
    /// Per-peer settlements, keyed by peer overlay (hex form).
    pub settlements: BTreeMap<String, Settlement>,
    /// Total received across all peers.
    pub total_received: u64,
    /// Total sent across all peers.
    pub total_sent: u64,
}

/// One Kademlia bin of a node's topology view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bin {
    /// Known peers in the bin.
    pub population: u32,
    /// Currently connected peers in the bin.
    pub connected: u32,
    /// Overlay addresses of connected peers (hex form).
    pub peers: Vec<String>,
}

/// A node's Kademlia topology view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Topology {
    /// Total known peers.
    pub population: u32,
    /// Total connected peers.
    pub connected: u32,
    /// Neighborhood depth.
    pub depth: u32,
    /// Per-bin breakdown, keyed by bin name.
    pub bins: BTreeMap<String, Bin>,
}
