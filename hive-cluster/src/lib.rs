//! Hive Cluster - Topology model over a fleet of storage nodes.
//!
//! A [`Cluster`] is a set of named [`NodeGroup`]s; each group is a set
//! of named [`Node`]s bound to a [`hive_client::NodeClient`] handle.
//! The cluster aggregates per-node state into group-keyed views,
//! flattens them into node-keyed unions (failing loudly on cross-group
//! name collisions), and offers random selection primitives for the
//! verification engine.
//!
//! All collections are ordered maps so that enumeration, selection
//! pools, and logs are reproducible run to run.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod cluster;
mod error;
pub mod hostname;
mod node;
mod node_group;

pub use cluster::{
    Cluster, ClusterAddresses, ClusterBalances, ClusterOptions, ClusterOverlays, ClusterPeers,
    ClusterSettlements, ClusterTopologies,
};
pub use error::{ClusterError, ClusterResult};
pub use node::{Node, NodeConfig};
pub use node_group::{
    NodeGroup, NodeGroupAddresses, NodeGroupBalances, NodeGroupOptions, NodeGroupOverlays,
    NodeGroupPeers, NodeGroupSettlements, NodeGroupTopologies,
};
