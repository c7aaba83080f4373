//! Hive Core - Strongly-typed addresses, content units and limits.
//!
//! This crate provides the data model shared by the topology layer and the
//! verification engine: 32-byte overlay and content addresses, the seeded
//! chunk/file content units whose addresses act as the correctness oracle,
//! postage batch sizing, and explicit system limits.
//!
//! # Design Principles (TigerStyle)
//!
//! - **Strongly-typed digests**: Prevent mixing up an `OverlayAddress` with
//!   a `ContentAddress`
//! - **Explicit limits**: Every payload has a bounded maximum
//! - **No unsafe code**: Safety > Performance

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod address;
mod chunk;
mod error;
mod file;
mod limits;
mod postage;

pub use address::{ContentAddress, FileHash, OverlayAddress, DIGEST_SIZE};
pub use chunk::{content_address, Chunk, MAX_CHUNK_PAYLOAD};
pub use error::{CoreError, CoreResult};
pub use file::{hash_bytes, File};
pub use limits::Limits;
pub use postage::{estimate_batch_depth, BATCH_DEPTH_MARGIN, MIN_BATCH_DEPTH};
