//! A single fleet member.

use std::sync::Arc;

use hive_client::NodeClient;

/// Static configuration for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    /// Whether the node participates fully in the network (stores and
    /// forwards chunks) or runs as a light client.
    pub full_node: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self { full_node: true }
    }
}

/// A logical fleet member: a stable name, its classification, and the
/// resolved capability to call its API.
#[derive(Clone)]
pub struct Node {
    name: String,
    config: NodeConfig,
    client: Arc<dyn NodeClient>,
}

impl Node {
    /// Creates a node.
    #[must_use]
    pub fn new(name: impl Into<String>, config: NodeConfig, client: Arc<dyn NodeClient>) -> Self {
        Self {
            name: name.into(),
            config,
            client,
        }
    }

    /// Returns the node's stable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node's static configuration.
    #[must_use]
    pub const fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Returns the client handle for this node's API.
    #[must_use]
    pub fn client(&self) -> Arc<dyn NodeClient> {
        Arc::clone(&self.client)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
