//! Hive Workload - Deterministic seeded generators.
//!
//! Every random decision a verification run makes (file contents, node
//! selection, chunk payloads) flows from a single `u64` seed through
//! the generators built here. Re-running with the same seed and the
//! same cluster shape replays the same decisions, which is what makes
//! a failure report reproducible.
//!
//! ChaCha8 is used as the stream generator: it is fast, portable, and
//! its output is stable across platforms and releases, unlike the
//! default `StdRng` whose algorithm is unspecified.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod generator;

pub use generator::{pseudo_generator, pseudo_generators, random_seed};
