//! Hive Check - Black-box verification engine for storage fleets.
//!
//! Two run modes exist over the same cluster handle:
//!
//! - [`file_retrieval`]: a single-shot check that uploads files and
//!   verifies retrieval elsewhere; any failed unit is a run failure.
//! - [`retrieval`]: a continuous simulation that sweeps upload/sync/
//!   download units forever, recording failures as metrics and exiting
//!   only on cancellation.
//!
//! Both modes derive every random decision from one seed so a failing
//! run can be replayed, and both report through a [`MetricsSink`] plus
//! a [`RunReport`] of latency distributions and unit counts.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
pub mod file_retrieval;
pub mod metrics;
mod report;
pub mod retrieval;

pub use error::{CheckError, CheckResult};
pub use file_retrieval::CheckOptions;
pub use metrics::{MetricsPushError, MetricsSink, NullSink, RecordingSink};
pub use report::RunReport;
pub use retrieval::SimulationOptions;
