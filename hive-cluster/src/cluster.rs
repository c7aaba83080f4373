//! The cluster handle: node groups, aggregation and selection.
//!
//! A `Cluster` owns zero or more named `NodeGroup`s and aggregates
//! per-node state into cluster-wide views. Aggregation never overwrites:
//! a node simple name must be unique across the whole cluster, and any
//! union that discovers a cross-group collision fails with
//! [`ClusterError::DuplicateNodeName`].

use std::collections::BTreeMap;
use std::sync::Arc;

use hive_client::{NodeClient, NotSetOrchestrator, Orchestrator};
use hive_core::{ContentAddress, OverlayAddress};
use rand::Rng;

use crate::error::{ClusterError, ClusterResult};
use crate::hostname;
use crate::node::Node;
use crate::node_group::{
    NodeGroup, NodeGroupAddresses, NodeGroupBalances, NodeGroupOptions, NodeGroupOverlays,
    NodeGroupPeers, NodeGroupSettlements, NodeGroupTopologies,
};

/// Addresses of all nodes in the cluster, keyed by group name.
pub type ClusterAddresses = BTreeMap<String, NodeGroupAddresses>;
/// Balances of all nodes in the cluster, keyed by group name.
pub type ClusterBalances = BTreeMap<String, NodeGroupBalances>;
/// Peers of all nodes in the cluster, keyed by group name.
pub type ClusterPeers = BTreeMap<String, NodeGroupPeers>;
/// Settlements of all nodes in the cluster, keyed by group name.
pub type ClusterSettlements = BTreeMap<String, NodeGroupSettlements>;
/// Topologies of all nodes in the cluster, keyed by group name.
pub type ClusterTopologies = BTreeMap<String, NodeGroupTopologies>;

/// Overlay addresses of all nodes in the cluster, keyed by group name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterOverlays(pub BTreeMap<String, NodeGroupOverlays>);

impl ClusterOverlays {
    /// Selects a random overlay: a group uniformly, then a node within
    /// that group uniformly.
    ///
    /// NOTE: this is NOT uniform over individual nodes when group sizes
    /// differ — nodes in smaller groups are more likely. Callers that
    /// need per-node uniformity must use [`Cluster::random_node`].
    #[must_use]
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<(String, String, OverlayAddress)> {
        if self.0.is_empty() {
            return None;
        }
        let group_idx = rng.gen_range(0..self.0.len());
        let (group_name, group) = self.0.iter().nth(group_idx)?;
        if group.is_empty() {
            return None;
        }
        let node_idx = rng.gen_range(0..group.len());
        let (node_name, overlay) = group.iter().nth(node_idx)?;
        Some((group_name.clone(), node_name.clone(), *overlay))
    }
}

/// Cluster-level options.
///
/// Annotation/label maps are merged into every group registered later;
/// group-level values win on key collision. Scheme, domain and namespace
/// drive hostname derivation for the fleet.
#[derive(Clone)]
pub struct ClusterOptions {
    /// Annotations inherited by every node group.
    pub annotations: BTreeMap<String, String>,
    /// Labels inherited by every node group.
    pub labels: BTreeMap<String, String>,
    /// Scheme for node API URLs.
    pub api_scheme: String,
    /// Domain for node API URLs.
    pub api_domain: String,
    /// Scheme for node debug API URLs.
    pub debug_api_scheme: String,
    /// Domain for node debug API URLs.
    pub debug_api_domain: String,
    /// Namespace the fleet runs in.
    pub namespace: String,
    /// Derive flat hostnames without the namespace segment.
    pub disable_namespace: bool,
    /// Orchestration platform handle; defaults to the tolerable
    /// not-configured variant.
    pub orchestrator: Arc<dyn Orchestrator>,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            annotations: BTreeMap::new(),
            labels: BTreeMap::new(),
            api_scheme: "http".to_string(),
            api_domain: "cluster.local".to_string(),
            debug_api_scheme: "http".to_string(),
            debug_api_domain: "cluster.local".to_string(),
            namespace: String::new(),
            disable_namespace: false,
            orchestrator: Arc::new(NotSetOrchestrator),
        }
    }
}

impl std::fmt::Debug for ClusterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterOptions")
            .field("api_scheme", &self.api_scheme)
            .field("api_domain", &self.api_domain)
            .field("namespace", &self.namespace)
            .field("disable_namespace", &self.disable_namespace)
            .finish_non_exhaustive()
    }
}

/// The top-level handle over a fleet of nodes.
#[derive(Debug)]
pub struct Cluster {
    name: String,
    opts: ClusterOptions,
    node_groups: BTreeMap<String, NodeGroup>,
}

impl Cluster {
    /// Creates a cluster with no groups.
    #[must_use]
    pub fn new(name: impl Into<String>, opts: ClusterOptions) -> Self {
        Self {
            name: name.into(),
            opts,
            node_groups: BTreeMap::new(),
        }
    }

    /// Returns the cluster name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a node group, merging cluster-level annotations/labels
    /// with the group's (the group wins on key collision).
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::DuplicateNodeGroup`] if the name is
    /// already registered.
    pub fn add_node_group(
        &mut self,
        name: impl Into<String>,
        opts: NodeGroupOptions,
    ) -> ClusterResult<()> {
        let name = name.into();
        if self.node_groups.contains_key(&name) {
            return Err(ClusterError::DuplicateNodeGroup { name });
        }
        let merged = NodeGroupOptions {
            annotations: merge_maps(&self.opts.annotations, &opts.annotations),
            labels: merge_maps(&self.opts.labels, &opts.labels),
        };
        let group = NodeGroup::new(
            name.clone(),
            merged,
            self.opts.namespace.clone(),
            Arc::clone(&self.opts.orchestrator),
        );
        self.node_groups.insert(name, group);
        Ok(())
    }

    /// Returns the node groups, keyed by name.
    #[must_use]
    pub const fn node_groups(&self) -> &BTreeMap<String, NodeGroup> {
        &self.node_groups
    }

    /// Returns the group names, lexicographically sorted.
    #[must_use]
    pub fn node_group_names(&self) -> Vec<String> {
        self.node_groups.keys().cloned().collect()
    }

    /// Returns the named group.
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::NodeGroupNotFound`] otherwise.
    pub fn node_group(&self, name: &str) -> ClusterResult<&NodeGroup> {
        self.node_groups
            .get(name)
            .ok_or_else(|| ClusterError::NodeGroupNotFound {
                name: name.to_string(),
            })
    }

    /// Returns the named group mutably (for node registration).
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::NodeGroupNotFound`] otherwise.
    pub fn node_group_mut(&mut self, name: &str) -> ClusterResult<&mut NodeGroup> {
        self.node_groups
            .get_mut(name)
            .ok_or_else(|| ClusterError::NodeGroupNotFound {
                name: name.to_string(),
            })
    }

    /// Flattens all groups' nodes into one mapping keyed by node name.
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::DuplicateNodeName`] if two groups
    /// contain a node with the same simple name.
    pub fn nodes(&self) -> ClusterResult<BTreeMap<String, Node>> {
        let mut out = BTreeMap::new();
        for group in self.node_groups.values() {
            for (name, node) in group.nodes() {
                if out.contains_key(name) {
                    return Err(ClusterError::DuplicateNodeName { name: name.clone() });
                }
                out.insert(name.clone(), node.clone());
            }
        }
        Ok(out)
    }

    /// Returns all node names across groups, lexicographically sorted.
    ///
    /// # Errors
    ///
    /// Fails on a cross-group name collision.
    pub fn node_names(&self) -> ClusterResult<Vec<String>> {
        Ok(self.nodes()?.into_keys().collect())
    }

    /// Returns the names of full nodes.
    ///
    /// # Errors
    ///
    /// Fails on a cross-group name collision.
    pub fn full_node_names(&self) -> ClusterResult<Vec<String>> {
        Ok(self
            .nodes()?
            .into_iter()
            .filter(|(_, node)| node.config().full_node)
            .map(|(name, _)| name)
            .collect())
    }

    /// Returns the names of light nodes.
    ///
    /// # Errors
    ///
    /// Fails on a cross-group name collision.
    pub fn light_node_names(&self) -> ClusterResult<Vec<String>> {
        Ok(self
            .nodes()?
            .into_iter()
            .filter(|(_, node)| !node.config().full_node)
            .map(|(name, _)| name)
            .collect())
    }

    /// Returns the total node count.
    #[must_use]
    pub fn size(&self) -> usize {
        self.node_groups.values().map(|g| g.nodes().len()).sum()
    }

    /// Returns addresses of all nodes, keyed by group name.
    ///
    /// # Errors
    ///
    /// Any group's failure aborts the call, wrapped with the group name.
    pub async fn addresses(&self) -> ClusterResult<ClusterAddresses> {
        let mut out = ClusterAddresses::new();
        for (name, group) in &self.node_groups {
            let addresses = group.addresses().await.map_err(|e| e.in_group(name))?;
            out.insert(name.clone(), addresses);
        }
        Ok(out)
    }

    /// Returns balances of all nodes, keyed by group name.
    ///
    /// # Errors
    ///
    /// Any group's failure aborts the call.
    pub async fn balances(&self) -> ClusterResult<ClusterBalances> {
        let mut out = ClusterBalances::new();
        for (name, group) in &self.node_groups {
            let balances = group.balances().await.map_err(|e| e.in_group(name))?;
            out.insert(name.clone(), balances);
        }
        Ok(out)
    }

    /// Returns overlays of all nodes, keyed by group name, excluding the
    /// named groups.
    ///
    /// # Errors
    ///
    /// Any group's failure aborts the call.
    pub async fn overlays(&self, exclude: &[&str]) -> ClusterResult<ClusterOverlays> {
        let mut out = BTreeMap::new();
        for (name, group) in &self.node_groups {
            if exclude.contains(&name.as_str()) {
                continue;
            }
            let overlays = group.overlays().await.map_err(|e| e.in_group(name))?;
            out.insert(name.clone(), overlays);
        }
        Ok(ClusterOverlays(out))
    }

    /// Returns peers of all nodes, keyed by group name, excluding the
    /// named groups.
    ///
    /// # Errors
    ///
    /// Any group's failure aborts the call.
    pub async fn peers(&self, exclude: &[&str]) -> ClusterResult<ClusterPeers> {
        let mut out = ClusterPeers::new();
        for (name, group) in &self.node_groups {
            if exclude.contains(&name.as_str()) {
                continue;
            }
            let peers = group.peers().await.map_err(|e| e.in_group(name))?;
            out.insert(name.clone(), peers);
        }
        Ok(out)
    }

    /// Returns settlements of all nodes, keyed by group name.
    ///
    /// # Errors
    ///
    /// Any group's failure aborts the call.
    pub async fn settlements(&self) -> ClusterResult<ClusterSettlements> {
        let mut out = ClusterSettlements::new();
        for (name, group) in &self.node_groups {
            let settlements = group.settlements().await.map_err(|e| e.in_group(name))?;
            out.insert(name.clone(), settlements);
        }
        Ok(out)
    }

    /// Returns topology views of all nodes, keyed by group name.
    ///
    /// # Errors
    ///
    /// Any group's failure aborts the call.
    pub async fn topologies(&self) -> ClusterResult<ClusterTopologies> {
        let mut out = ClusterTopologies::new();
        for (name, group) in &self.node_groups {
            let topologies = group.topologies().await.map_err(|e| e.in_group(name))?;
            out.insert(name.clone(), topologies);
        }
        Ok(out)
    }

    /// Unions per-group balances into one node-keyed mapping.
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::DuplicateNodeName`] on a cross-group
    /// collision.
    pub async fn flatten_balances(&self) -> ClusterResult<NodeGroupBalances> {
        let per_group = self.balances().await?;
        let mut out = NodeGroupBalances::new();
        for group in per_group.into_values() {
            for (name, balances) in group {
                if out.contains_key(&name) {
                    return Err(ClusterError::DuplicateNodeName { name });
                }
                out.insert(name, balances);
            }
        }
        Ok(out)
    }

    /// Unions per-group overlays into one node-keyed mapping, excluding
    /// the named groups.
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::DuplicateNodeName`] on a cross-group
    /// collision.
    pub async fn flatten_overlays(&self, exclude: &[&str]) -> ClusterResult<NodeGroupOverlays> {
        let per_group = self.overlays(exclude).await?;
        let mut out = NodeGroupOverlays::new();
        for group in per_group.0.into_values() {
            for (name, overlay) in group {
                if out.contains_key(&name) {
                    return Err(ClusterError::DuplicateNodeName { name });
                }
                out.insert(name, overlay);
            }
        }
        Ok(out)
    }

    /// Unions per-group settlements into one node-keyed mapping.
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::DuplicateNodeName`] on a cross-group
    /// collision.
    pub async fn flatten_settlements(&self) -> ClusterResult<NodeGroupSettlements> {
        let per_group = self.settlements().await?;
        let mut out = NodeGroupSettlements::new();
        for group in per_group.into_values() {
            for (name, settlements) in group {
                if out.contains_key(&name) {
                    return Err(ClusterError::DuplicateNodeName { name });
                }
                out.insert(name, settlements);
            }
        }
        Ok(out)
    }

    /// Unions per-group topologies into one node-keyed mapping.
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::DuplicateNodeName`] on a cross-group
    /// collision.
    pub async fn flatten_topologies(&self) -> ClusterResult<NodeGroupTopologies> {
        let per_group = self.topologies().await?;
        let mut out = NodeGroupTopologies::new();
        for group in per_group.into_values() {
            for (name, topology) in group {
                if out.contains_key(&name) {
                    return Err(ClusterError::DuplicateNodeName { name });
                }
                out.insert(name, topology);
            }
        }
        Ok(out)
    }

    /// Counts, over every group, the nodes that hold the given content
    /// address. A node belongs to exactly one group, so no deduplication
    /// is needed.
    ///
    /// # Errors
    ///
    /// Any group's failure aborts the call.
    pub async fn global_replication_factor(&self, address: ContentAddress) -> ClusterResult<u32> {
        let mut factor = 0;
        for (name, group) in &self.node_groups {
            factor += group
                .group_replication_factor(address)
                .await
                .map_err(|e| e.in_group(name))?;
        }
        Ok(factor)
    }

    /// Selects a random non-stopped node with one flat uniform draw over
    /// the full remaining node list.
    ///
    /// A group-then-node draw would bias toward nodes in smaller groups;
    /// this primitive guarantees a uniform per-node probability.
    ///
    /// # Errors
    ///
    /// Fails with [`ClusterError::NoNodesAvailable`] if every node is
    /// stopped, or surfaces stopped-node discovery failures.
    pub async fn random_node<R: Rng>(&self, rng: &mut R) -> ClusterResult<Node> {
        let mut pool = Vec::new();
        for group in self.node_groups.values() {
            let stopped = group.stopped_nodes().await?;
            for (name, node) in group.nodes() {
                if !stopped.contains(name) {
                    pool.push(node.clone());
                }
            }
        }
        if pool.is_empty() {
            return Err(ClusterError::NoNodesAvailable);
        }
        let idx = rng.gen_range(0..pool.len());
        Ok(pool.swap_remove(idx))
    }

    /// Returns client handles for all nodes, excluding stopped ones.
    ///
    /// Handles are resolved per call and must not be cached across a
    /// node being stopped and restarted.
    ///
    /// # Errors
    ///
    /// Fails on a cross-group name collision or stopped-node discovery
    /// failure.
    pub async fn nodes_clients(&self) -> ClusterResult<BTreeMap<String, Arc<dyn NodeClient>>> {
        let mut out: BTreeMap<String, Arc<dyn NodeClient>> = BTreeMap::new();
        for group in self.node_groups.values() {
            for (name, client) in group.nodes_clients().await? {
                if out.contains_key(&name) {
                    return Err(ClusterError::DuplicateNodeName { name });
                }
                out.insert(name, client);
            }
        }
        Ok(out)
    }

    /// Returns client handles for all nodes, including stopped ones.
    ///
    /// # Errors
    ///
    /// Fails on a cross-group name collision.
    pub fn nodes_clients_all(&self) -> ClusterResult<BTreeMap<String, Arc<dyn NodeClient>>> {
        let mut out: BTreeMap<String, Arc<dyn NodeClient>> = BTreeMap::new();
        for group in self.node_groups.values() {
            for (name, client) in group.nodes_clients_all() {
                if out.contains_key(&name) {
                    return Err(ClusterError::DuplicateNodeName { name });
                }
                out.insert(name, client);
            }
        }
        Ok(out)
    }

    /// Derives the API URL for a node name.
    #[must_use]
    pub fn api_url(&self, name: &str) -> String {
        hostname::api_url(
            &self.opts.api_scheme,
            name,
            &self.opts.namespace,
            &self.opts.api_domain,
            self.opts.disable_namespace,
        )
    }

    /// Derives the API ingress host for a node name.
    #[must_use]
    pub fn ingress_host(&self, name: &str) -> String {
        hostname::ingress_host(
            name,
            &self.opts.namespace,
            &self.opts.api_domain,
            self.opts.disable_namespace,
        )
    }

    /// Derives the debug API URL for a node name.
    #[must_use]
    pub fn debug_api_url(&self, name: &str) -> String {
        hostname::debug_api_url(
            &self.opts.debug_api_scheme,
            name,
            &self.opts.namespace,
            &self.opts.debug_api_domain,
            self.opts.disable_namespace,
        )
    }

    /// Derives the debug API ingress host for a node name.
    #[must_use]
    pub fn ingress_debug_host(&self, name: &str) -> String {
        hostname::ingress_debug_host(
            name,
            &self.opts.namespace,
            &self.opts.debug_api_domain,
            self.opts.disable_namespace,
        )
    }
}

/// Joins two maps; values from `overrides` win on key collision.
fn merge_maps(
    base: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeConfig;
    use async_trait::async_trait;
    use bytes::Bytes;
    use hive_client::sim::{SimFaults, SimNetwork};
    use hive_client::{OrchestrationError, OrchestrationResult};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Builds a cluster with the given groups, node names generated as
    /// `{prefix}-{i}` per group, all backed by one simulated network.
    fn sim_cluster(groups: &[(&str, &str, usize)]) -> (Cluster, SimNetwork) {
        let network = SimNetwork::new();
        let mut cluster = Cluster::new("test-cluster", ClusterOptions::default());
        for (group, prefix, count) in groups {
            cluster
                .add_node_group(*group, NodeGroupOptions::default())
                .unwrap();
            let ng = cluster.node_group_mut(group).unwrap();
            for i in 0..*count {
                let name = format!("{prefix}-{i}");
                let client = Arc::new(network.node(&name));
                ng.add_node(&name, NodeConfig::default(), client).unwrap();
            }
        }
        (cluster, network)
    }

    #[test]
    fn test_duplicate_node_group_fails() {
        let mut cluster = Cluster::new("c", ClusterOptions::default());
        cluster
            .add_node_group("workers", NodeGroupOptions::default())
            .unwrap();
        assert!(matches!(
            cluster.add_node_group("workers", NodeGroupOptions::default()),
            Err(ClusterError::DuplicateNodeGroup { .. })
        ));
    }

    #[test]
    fn test_group_annotations_override_cluster() {
        let mut annotations = BTreeMap::new();
        annotations.insert("tier".to_string(), "cluster".to_string());
        annotations.insert("zone".to_string(), "eu".to_string());
        let opts = ClusterOptions {
            annotations,
            ..ClusterOptions::default()
        };
        let mut cluster = Cluster::new("c", opts);

        let mut group_annotations = BTreeMap::new();
        group_annotations.insert("tier".to_string(), "group".to_string());
        cluster
            .add_node_group(
                "workers",
                NodeGroupOptions {
                    annotations: group_annotations,
                    labels: BTreeMap::new(),
                },
            )
            .unwrap();

        let group = cluster.node_group("workers").unwrap();
        assert_eq!(group.annotations().get("tier").unwrap(), "group");
        assert_eq!(group.annotations().get("zone").unwrap(), "eu");
    }

    #[test]
    fn test_node_group_names_sorted() {
        let (cluster, _) = sim_cluster(&[("zeta", "z", 1), ("alpha", "a", 1), ("mid", "m", 1)]);
        assert_eq!(cluster.node_group_names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_nodes_fails_on_cross_group_duplicate() {
        let (mut cluster, network) = sim_cluster(&[("a", "bee", 2), ("b", "wasp", 1)]);
        // Same simple name as a node in group "a".
        let client = Arc::new(network.node("bee-0"));
        cluster
            .node_group_mut("b")
            .unwrap()
            .add_node("bee-0", NodeConfig::default(), client)
            .unwrap();

        assert!(matches!(
            cluster.nodes(),
            Err(ClusterError::DuplicateNodeName { .. })
        ));
        assert!(cluster.node_names().is_err());
    }

    #[test]
    fn test_node_names_sorted_across_groups() {
        let (cluster, _) = sim_cluster(&[("b", "wasp", 2), ("a", "bee", 2)]);
        assert_eq!(
            cluster.node_names().unwrap(),
            vec!["bee-0", "bee-1", "wasp-0", "wasp-1"]
        );
        assert_eq!(cluster.size(), 4);
    }

    #[tokio::test]
    async fn test_flatten_overlays_is_exact_union() {
        let (cluster, _) = sim_cluster(&[("a", "bee", 2), ("b", "wasp", 3)]);
        let per_group = cluster.overlays(&[]).await.unwrap();
        let flat = cluster.flatten_overlays(&[]).await.unwrap();

        let expected: usize = per_group.0.values().map(BTreeMap::len).sum();
        assert_eq!(flat.len(), expected);
        for group in per_group.0.values() {
            for (name, overlay) in group {
                assert_eq!(flat.get(name), Some(overlay));
            }
        }
    }

    #[tokio::test]
    async fn test_flatten_overlays_fails_on_duplicate() {
        let (mut cluster, network) = sim_cluster(&[("a", "bee", 1), ("b", "wasp", 1)]);
        let client = Arc::new(network.node("bee-0"));
        cluster
            .node_group_mut("b")
            .unwrap()
            .add_node("bee-0", NodeConfig::default(), client)
            .unwrap();

        assert!(matches!(
            cluster.flatten_overlays(&[]).await,
            Err(ClusterError::DuplicateNodeName { .. })
        ));
    }

    #[tokio::test]
    async fn test_flatten_overlays_respects_exclude() {
        let (cluster, _) = sim_cluster(&[("a", "bee", 2), ("b", "wasp", 2)]);
        let flat = cluster.flatten_overlays(&["b"]).await.unwrap();
        assert_eq!(
            flat.keys().cloned().collect::<Vec<_>>(),
            vec!["bee-0", "bee-1"]
        );
    }

    #[tokio::test]
    async fn test_global_replication_factor_sums_groups() {
        let (cluster, network) = sim_cluster(&[("a", "bee", 2), ("b", "wasp", 3)]);
        let address =
            network.seed_object(Bytes::from_static(b"spread"), &["bee-0", "wasp-1", "wasp-2"]);
        assert_eq!(cluster.global_replication_factor(address).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_global_replication_factor_zero_without_holders() {
        let (cluster, network) = sim_cluster(&[("a", "bee", 3)]);
        let address = network.seed_object(Bytes::from_static(b"orphan"), &[]);
        assert_eq!(cluster.global_replication_factor(address).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_random_node_is_flat_uniform() {
        // Groups of size 1 and 9: a group-then-node draw would select the
        // singleton node ~50% of the time; the flat draw must converge to
        // ~10%.
        let (cluster, _) = sim_cluster(&[("solo", "queen", 1), ("swarm", "bee", 9)]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let draws = 5000;
        let mut singleton_hits = 0;
        for _ in 0..draws {
            let node = cluster.random_node(&mut rng).await.unwrap();
            if node.name() == "queen-0" {
                singleton_hits += 1;
            }
        }

        // Expect ~500 hits; anywhere near 2500 means the biased two-stage
        // selection crept back in.
        assert!(
            (350..=650).contains(&singleton_hits),
            "singleton drawn {singleton_hits} times out of {draws}"
        );
    }

    #[tokio::test]
    async fn test_random_overlay_returns_member() {
        let (cluster, _) = sim_cluster(&[("a", "bee", 2), ("b", "wasp", 2)]);
        let overlays = cluster.overlays(&[]).await.unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (group, node, overlay) = overlays.random(&mut rng).unwrap();
        assert_eq!(overlays.0.get(&group).unwrap().get(&node), Some(&overlay));
    }

    #[tokio::test]
    async fn test_nodes_clients_resolves_everyone_without_orchestrator() {
        let (cluster, _) = sim_cluster(&[("a", "bee", 2), ("b", "wasp", 1)]);
        // NotSet orchestrator: stopped-node discovery is tolerated and
        // every node stays in the pool.
        let clients = cluster.nodes_clients().await.unwrap();
        assert_eq!(
            clients.keys().cloned().collect::<Vec<_>>(),
            vec!["bee-0", "bee-1", "wasp-0"]
        );
    }

    #[tokio::test]
    async fn test_state_query_failure_aborts_with_group_and_no_partial_map() {
        let (mut cluster, network) = sim_cluster(&[("a", "bee", 2)]);
        cluster
            .add_node_group("b", NodeGroupOptions::default())
            .unwrap();
        let faults = SimFaults {
            fail_state_queries: true,
            ..SimFaults::default()
        };
        let client = Arc::new(network.node_with_faults("wasp-0", faults));
        cluster
            .node_group_mut("b")
            .unwrap()
            .add_node("wasp-0", NodeConfig::default(), client)
            .unwrap();

        // The failing node's group wraps the error; no map is returned,
        // not even the healthy group's entries.
        match cluster.addresses().await {
            Err(ClusterError::Group { group, source }) => {
                assert_eq!(group, "b");
                assert!(
                    matches!(*source, ClusterError::Client { ref node, .. } if node == "wasp-0")
                );
            }
            other => panic!("expected group-wrapped error, got {other:?}"),
        }
        assert!(matches!(
            cluster.flatten_balances().await,
            Err(ClusterError::Group { ref group, .. }) if group == "b"
        ));
    }

    /// Orchestrator whose every call fails with a real platform error,
    /// unlike the tolerable not-configured sentinel.
    struct BrokenOrchestrator;

    #[async_trait]
    impl Orchestrator for BrokenOrchestrator {
        async fn ready(&self, _name: &str, _namespace: &str) -> OrchestrationResult<bool> {
            Err(OrchestrationError::Api {
                message: "control plane down".to_string(),
            })
        }

        async fn start(&self, _name: &str, _namespace: &str) -> OrchestrationResult<()> {
            Err(OrchestrationError::Api {
                message: "control plane down".to_string(),
            })
        }

        async fn stop(&self, _name: &str, _namespace: &str) -> OrchestrationResult<()> {
            Err(OrchestrationError::Api {
                message: "control plane down".to_string(),
            })
        }

        async fn running_nodes(&self, _namespace: &str) -> OrchestrationResult<Vec<String>> {
            Err(OrchestrationError::Api {
                message: "control plane down".to_string(),
            })
        }

        async fn stopped_nodes(&self, _namespace: &str) -> OrchestrationResult<Vec<String>> {
            Err(OrchestrationError::Api {
                message: "control plane down".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_orchestration_failure_is_not_tolerated_like_not_set() {
        let network = SimNetwork::new();
        let opts = ClusterOptions {
            orchestrator: Arc::new(BrokenOrchestrator),
            ..ClusterOptions::default()
        };
        let mut cluster = Cluster::new("c", opts);
        cluster
            .add_node_group("workers", NodeGroupOptions::default())
            .unwrap();
        cluster
            .node_group_mut("workers")
            .unwrap()
            .add_node("bee-0", NodeConfig::default(), Arc::new(network.node("bee-0")))
            .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            cluster.random_node(&mut rng).await,
            Err(ClusterError::Orchestration(OrchestrationError::Api { .. }))
        ));
        assert!(cluster.nodes_clients().await.is_err());
    }

    #[test]
    fn test_cluster_hostname_derivation() {
        let opts = ClusterOptions {
            api_scheme: "https".to_string(),
            api_domain: "example.com".to_string(),
            debug_api_scheme: "https".to_string(),
            debug_api_domain: "example.com".to_string(),
            namespace: "testnet".to_string(),
            ..ClusterOptions::default()
        };
        let cluster = Cluster::new("c", opts);
        assert_eq!(cluster.api_url("bee-0"), "https://bee-0.testnet.example.com");
        assert_eq!(
            cluster.debug_api_url("bee-0"),
            "https://bee-0-debug.testnet.example.com"
        );
        assert_eq!(cluster.ingress_host("bee-0"), "bee-0.testnet.example.com");
    }
}
