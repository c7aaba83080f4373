//! Orchestration platform abstraction.
//!
//! The topology model consults the orchestration platform to learn which
//! nodes are stopped. When no platform is wired, the [`NotSetOrchestrator`]
//! answers every call with the [`OrchestrationError::NotSet`] sentinel,
//! which callers must tolerate.

use async_trait::async_trait;

use crate::error::{OrchestrationError, OrchestrationResult};

/// Capability set the orchestration platform exposes per node workload.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Reports whether the named node's workload is ready.
    async fn ready(&self, name: &str, namespace: &str) -> OrchestrationResult<bool>;

    /// Starts the named node's workload.
    async fn start(&self, name: &str, namespace: &str) -> OrchestrationResult<()>;

    /// Stops the named node's workload.
    async fn stop(&self, name: &str, namespace: &str) -> OrchestrationResult<()>;

    /// Lists running node names in the namespace.
    async fn running_nodes(&self, namespace: &str) -> OrchestrationResult<Vec<String>>;

    /// Lists stopped node names in the namespace.
    async fn stopped_nodes(&self, namespace: &str) -> OrchestrationResult<Vec<String>>;
}

/// Orchestrator variant used when no platform is configured.
///
/// Every call returns [`OrchestrationError::NotSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NotSetOrchestrator;

#[async_trait]
impl Orchestrator for NotSetOrchestrator {
    async fn ready(&self, _name: &str, _namespace: &str) -> OrchestrationResult<bool> {
        Err(OrchestrationError::NotSet)
    }

    async fn start(&self, _name: &str, _namespace: &str) -> OrchestrationResult<()> {
        Err(OrchestrationError::NotSet)
    }

    async fn stop(&self, _name: &str, _namespace: &str) -> OrchestrationResult<()> {
        Err(OrchestrationError::NotSet)
    }

    async fn running_nodes(&self, _namespace: &str) -> OrchestrationResult<Vec<String>> {
        Err(OrchestrationError::NotSet)
    }

    async fn stopped_nodes(&self, _namespace: &str) -> OrchestrationResult<Vec<String>> {
        Err(OrchestrationError::NotSet)
    }
}
