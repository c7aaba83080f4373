//! Topology model error types.

use hive_client::{ClientError, OrchestrationError};
use thiserror::Error;

/// Result type for topology operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that can occur in the topology model.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// A node group with this name is already registered.
    #[error("node group {name} already registered")]
    DuplicateNodeGroup {
        /// The colliding group name.
        name: String,
    },

    /// The same node simple name appears in two groups.
    ///
    /// Aggregations must fail on this rather than silently overwrite:
    /// an overwrite would corrupt replication-factor and selection
    /// computations downstream.
    #[error("node name {name} already present")]
    DuplicateNodeName {
        /// The colliding node name.
        name: String,
    },

    /// The named node group is not registered.
    #[error("node group {name} not found")]
    NodeGroupNotFound {
        /// The requested group name.
        name: String,
    },

    /// No nodes were available for selection.
    #[error("no nodes available")]
    NoNodesAvailable,

    /// A per-group query failed; the group name wraps the cause.
    #[error("{group}: {source}")]
    Group {
        /// The group whose query failed.
        group: String,
        /// The underlying error.
        #[source]
        source: Box<ClusterError>,
    },

    /// A node API call failed; the node name wraps the cause.
    #[error("node {node}: {source}")]
    Client {
        /// The node whose API call failed.
        node: String,
        /// The underlying client error.
        #[source]
        source: ClientError,
    },

    /// The orchestration platform failed (beyond the tolerable NotSet).
    #[error("orchestration: {0}")]
    Orchestration(#[from] OrchestrationError),
}

impl ClusterError {
    /// Wraps an error with the group name it occurred in.
    #[must_use]
    pub fn in_group(self, group: impl Into<String>) -> Self {
        Self::Group {
            group: group.into(),
            source: Box::new(self),
        }
    }
}
