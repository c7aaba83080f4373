//! Hive Client - Collaborator interfaces for node APIs and orchestration.
//!
//! The verification engine treats every fleet node as an opaque service
//! behind the [`NodeClient`] trait and the orchestration platform behind
//! the [`Orchestrator`] trait. This crate defines those seams, the wire
//! types they exchange, and an in-memory simulated fleet used by tests.
//!
//! Real HTTP implementations of [`NodeClient`] live outside this
//! workspace; everything here is transport-agnostic.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod error;
mod orchestration;
pub mod sim;
mod types;

pub use api::{DownloadedFile, NodeClient, UploadOptions};
pub use error::{ClientError, ClientResult, OrchestrationError, OrchestrationResult};
pub use orchestration::{NotSetOrchestrator, Orchestrator};
pub use types::{BatchId, Bin, NodeAddresses, Settlement, Settlements, Tag, Topology};
