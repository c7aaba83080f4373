//! A named collection of nodes sharing addressing conventions.

use std::collections::BTreeMap;
use std::sync::Arc;

use hive_client::{NodeAddresses, NodeClient, Orchestrator, Settlements, Topology};
use hive_core::{ContentAddress, OverlayAddress};
use tracing::debug;

use crate::error::{ClusterError, ClusterResult};
use crate::node::{Node, NodeConfig};

/// Addresses of all nodes in a group, keyed by node name.
pub type NodeGroupAddresses = BTreeMap<String, NodeAddresses>;
/// Balances of all nodes in a group, keyed by node name.
pub type NodeGroupBalances = BTreeMap<String, BTreeMap<String, i64>>;
/// Overlays of all nodes in a group, keyed by node name.
pub type NodeGroupOverlays = BTreeMap<String, OverlayAddress>;
/// Peers of all nodes in a group, keyed by node name.
pub type NodeGroupPeers = BTreeMap<String, Vec<String>>;
/// Settlements of all nodes in a group, keyed by node name.
pub type NodeGroupSettlements = BTreeMap<String, Settlements>;
/// Topologies of all nodes in a group, keyed by node name.
pub type NodeGroupTopologies = BTreeMap<String, Topology>;

/// Options for a node group.
///
/// Annotations and labels are merged with the cluster-level maps when
/// the group is registered; group-level values win on key collision.
#[derive(Debug, Clone, Default)]
pub struct NodeGroupOptions {
    /// Annotations applied to the group's workloads.
    pub annotations: BTreeMap<String, String>,
    /// Labels applied to the group's workloads.
    pub labels: BTreeMap<String, String>,
}

/// A named collection of nodes.
pub struct NodeGroup {
    name: String,
    opts: NodeGroupOptions,
    namespace: String,
    orchestrator: Arc<dyn Orchestrator>,
    nodes: BTreeMap<String, Node>,
}

impl NodeGroup {
    /// Creates a group. Called by the cluster with already-merged options.
    pub(crate) fn new(
        name: impl Into<String>,
        opts: NodeGroupOptions,
        namespace: impl Into<String>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Self {
        Self {
            name: name.into(),
            opts,
            namespace: namespace.into(),
            orchestrator,
            nodes: BTreeMap::new(),
        }
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the merged annotations.
    #[must_use]
    pub const fn annotations(&self) -> &BTreeMap<String, String> {
        &self.opts.annotations
    }

    /// Returns the merged labels.
    #[must_use]
    pub const fn labels(&self) -> &BTreeMap<String, String> {
        &self.opts.labels
    }

    /// Adds a node to the group.
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::DuplicateNodeName`] if the name is
    /// already present in this group.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        config: NodeConfig,
        client: Arc<dyn NodeClient>,
    ) -> ClusterResult<()> {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            return Err(ClusterError::DuplicateNodeName { name });
        }
        debug!(group = %self.name, node = %name, "adding node");
        self.nodes.insert(name.clone(), Node::new(name, config, client));
        Ok(())
    }

    /// Returns the group's nodes, keyed by name.
    #[must_use]
    pub const fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    /// Returns the group's node names, lexicographically sorted.
    #[must_use]
    pub fn node_names(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    /// Returns addresses of all nodes in the group.
    ///
    /// # Errors
    ///
    /// Any node's failure aborts the whole call, wrapped with the node
    /// name.
    pub async fn addresses(&self) -> ClusterResult<NodeGroupAddresses> {
        let mut out = NodeGroupAddresses::new();
        for (name, node) in &self.nodes {
            let addresses = node
                .client()
                .addresses()
                .await
                .map_err(|source| ClusterError::Client {
                    node: name.clone(),
                    source,
                })?;
            out.insert(name.clone(), addresses);
        }
        Ok(out)
    }

    /// Returns balances of all nodes in the group.
    ///
    /// # Errors
    ///
    /// Any node's failure aborts the whole call.
    pub async fn balances(&self) -> ClusterResult<NodeGroupBalances> {
        let mut out = NodeGroupBalances::new();
        for (name, node) in &self.nodes {
            let balances = node
                .client()
                .balances()
                .await
                .map_err(|source| ClusterError::Client {
                    node: name.clone(),
                    source,
                })?;
            out.insert(name.clone(), balances);
        }
        Ok(out)
    }

    /// Returns overlays of all nodes in the group.
    ///
    /// # Errors
    ///
    /// Any node's failure aborts the whole call.
    pub async fn overlays(&self) -> ClusterResult<NodeGroupOverlays> {
        let mut out = NodeGroupOverlays::new();
        for (name, node) in &self.nodes {
            let addresses = node
                .client()
                .addresses()
                .await
                .map_err(|source| ClusterError::Client {
                    node: name.clone(),
                    source,
                })?;
            out.insert(name.clone(), addresses.overlay);
        }
        Ok(out)
    }

    /// Returns peers of all nodes in the group.
    ///
    /// # Errors
    ///
    /// Any node's failure aborts the whole call.
    pub async fn peers(&self) -> ClusterResult<NodeGroupPeers> {
        let mut out = NodeGroupPeers::new();
        for (name, node) in &self.nodes {
            let peers = node
                .client()
                .peers()
                .await
                .map_err(|source| ClusterError::Client {
                    node: name.clone(),
                    source,
                })?;
            out.insert(name.clone(), peers);
        }
        Ok(out)
    }

    /// Returns settlements of all nodes in the group.
    ///
    /// # Errors
    ///
    /// Any node's failure aborts the whole call.
    pub async fn settlements(&self) -> ClusterResult<NodeGroupSettlements> {
        let mut out = NodeGroupSettlements::new();
        for (name, node) in &self.nodes {
            let settlements =
                node.client()
                    .settlements()
                    .await
                    .map_err(|source| ClusterError::Client {
                        node: name.clone(),
                        source,
                    })?;
            out.insert(name.clone(), settlements);
        }
        Ok(out)
    }

    /// Returns topology views of all nodes in the group.
    ///
    /// # Errors
    ///
    /// Any node's failure aborts the whole call.
    pub async fn topologies(&self) -> ClusterResult<NodeGroupTopologies> {
        let mut out = NodeGroupTopologies::new();
        for (name, node) in &self.nodes {
            let topology = node
                .client()
                .topology()
                .await
                .map_err(|source| ClusterError::Client {
                    node: name.clone(),
                    source,
                })?;
            out.insert(name.clone(), topology);
        }
        Ok(out)
    }

    /// Counts the group's nodes that hold the given content address.
    ///
    /// # Errors
    ///
    /// Any node's failure aborts the whole call.
    pub async fn group_replication_factor(&self, address: ContentAddress) -> ClusterResult<u32> {
        let mut factor = 0;
        for (name, node) in &self.nodes {
            let has = node
                .client()
                .has_chunk(address)
                .await
                .map_err(|source| ClusterError::Client {
                    node: name.clone(),
                    source,
                })?;
            if has {
                factor += 1;
            }
        }
        Ok(factor)
    }

    /// Returns the names of this group's nodes the orchestration platform
    /// reports as stopped.
    ///
    /// A "not configured" orchestrator is tolerated and yields an empty
    /// list.
    ///
    /// # Errors
    ///
    /// Any other orchestration failure is surfaced.
    pub async fn stopped_nodes(&self) -> ClusterResult<Vec<String>> {
        match self.orchestrator.stopped_nodes(&self.namespace).await {
            Ok(stopped) => Ok(stopped
                .into_iter()
                .filter(|name| self.nodes.contains_key(name))
                .collect()),
            Err(err) if err.is_not_set() => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns client handles for the group's nodes, excluding stopped
    /// ones.
    ///
    /// # Errors
    ///
    /// Surfaces orchestration failures from stopped-node discovery.
    pub async fn nodes_clients(&self) -> ClusterResult<BTreeMap<String, Arc<dyn NodeClient>>> {
        let stopped = self.stopped_nodes().await?;
        Ok(self
            .nodes
            .iter()
            .filter(|(name, _)| !stopped.contains(name))
            .map(|(name, node)| (name.clone(), node.client()))
            .collect())
    }

    /// Returns client handles for all of the group's nodes.
    #[must_use]
    pub fn nodes_clients_all(&self) -> BTreeMap<String, Arc<dyn NodeClient>> {
        self.nodes
            .iter()
            .map(|(name, node)| (name.clone(), node.client()))
            .collect()
    }
}

impl std::fmt::Debug for NodeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeGroup")
            .field("name", &self.name)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
