//! Metrics emission for verification runs.
//!
//! The engine reports counters, gauges and latency observations through
//! the [`MetricsSink`] trait. Pushing to an external aggregator is
//! fallible, but a push failure never fails a run: the engine logs it
//! and moves on. The [`NullSink`] is the not-configured default; the
//! [`RecordingSink`] keeps everything in memory for tests and console
//! reports.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Metric series names emitted by the engine.
///
/// Counters come in `*_count` pairs (achieved / failed), gauges carry
/// the most recent per-unit duration, and the plain `*_seconds` series
/// feed duration distributions.
pub mod names {
    /// Chunks uploaded successfully.
    pub const CHUNKS_UPLOADED_COUNT: &str = "chunks_uploaded_count";
    /// Chunk uploads that failed.
    pub const CHUNKS_NOT_UPLOADED_COUNT: &str = "chunks_not_uploaded_count";
    /// Most recent chunk upload duration.
    pub const CHUNK_UPLOAD_DURATION_SECONDS: &str = "chunk_upload_duration_seconds";
    /// Chunk upload duration distribution.
    pub const CHUNK_UPLOAD_SECONDS: &str = "chunk_upload_seconds";
    /// Chunks downloaded successfully.
    pub const CHUNKS_DOWNLOADED_COUNT: &str = "chunks_downloaded_count";
    /// Chunk downloads that failed.
    pub const CHUNKS_NOT_DOWNLOADED_COUNT: &str = "chunks_not_downloaded_count";
    /// Most recent chunk download duration.
    pub const CHUNK_DOWNLOAD_DURATION_SECONDS: &str = "chunk_download_duration_seconds";
    /// Chunk download duration distribution.
    pub const CHUNK_DOWNLOAD_SECONDS: &str = "chunk_download_seconds";
    /// Chunks downloaded with matching content.
    pub const CHUNKS_RETRIEVED_COUNT: &str = "chunks_retrieved_count";
    /// Chunks downloaded with mismatched content.
    pub const CHUNKS_NOT_RETRIEVED_COUNT: &str = "chunks_not_retrieved_count";
    /// Tags that reported synced.
    pub const TAGS_SYNCED_COUNT: &str = "tags_synced_count";
    /// Tags that never reported synced.
    pub const TAGS_NOT_SYNCED_COUNT: &str = "tags_not_synced_count";
    /// Most recent tag sync duration.
    pub const TAGS_SYNC_DURATION_SECONDS: &str = "tags_sync_duration_seconds";
    /// Tag sync duration distribution.
    pub const TAGS_SYNC_SECONDS: &str = "tags_sync_seconds";
    /// Files uploaded successfully.
    pub const FILES_UPLOADED_COUNT: &str = "files_uploaded_count";
    /// File uploads that failed.
    pub const FILES_NOT_UPLOADED_COUNT: &str = "files_not_uploaded_count";
    /// Most recent file upload duration.
    pub const FILE_UPLOAD_DURATION_SECONDS: &str = "file_upload_duration_seconds";
    /// File upload duration distribution.
    pub const FILE_UPLOAD_SECONDS: &str = "file_upload_seconds";
    /// Files downloaded successfully.
    pub const FILES_DOWNLOADED_COUNT: &str = "files_downloaded_count";
    /// File downloads that failed.
    pub const FILES_NOT_DOWNLOADED_COUNT: &str = "files_not_downloaded_count";
    /// Most recent file download duration.
    pub const FILE_DOWNLOAD_DURATION_SECONDS: &str = "file_download_duration_seconds";
    /// File download duration distribution.
    pub const FILE_DOWNLOAD_SECONDS: &str = "file_download_seconds";
    /// Files downloaded with matching content.
    pub const FILES_RETRIEVED_COUNT: &str = "files_retrieved_count";
    /// Files downloaded with mismatched content.
    pub const FILES_NOT_RETRIEVED_COUNT: &str = "files_not_retrieved_count";
}

/// A metrics push that did not reach the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("metrics push failed: {message}")]
pub struct MetricsPushError {
    /// Why the push failed.
    pub message: String,
}

/// Destination for run metrics.
///
/// Recording is infallible and synchronous; only [`MetricsSink::push`]
/// can fail, and callers log that failure rather than propagating it.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Increments a counter series.
    fn inc_counter(&self, name: &str, labels: &[(&str, &str)]);

    /// Sets a gauge series to the given value.
    fn set_gauge(&self, name: &str, labels: &[(&str, &str)], value: f64);

    /// Records one duration observation, in seconds.
    fn observe(&self, name: &str, value: f64);

    /// Pushes accumulated metrics to the external aggregator.
    async fn push(&self) -> Result<(), MetricsPushError>;
}

/// Sink used when no aggregator is configured. Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl MetricsSink for NullSink {
    fn inc_counter(&self, _name: &str, _labels: &[(&str, &str)]) {}

    fn set_gauge(&self, _name: &str, _labels: &[(&str, &str)], _value: f64) {}

    fn observe(&self, _name: &str, _value: f64) {}

    async fn push(&self) -> Result<(), MetricsPushError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordedSeries {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, f64>,
    observations: BTreeMap<String, Vec<f64>>,
    pushes: u64,
}

/// In-memory sink for tests and console reports.
#[derive(Debug, Default)]
pub struct RecordingSink {
    series: Mutex<RecordedSeries>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of one labeled counter series.
    #[must_use]
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let key = series_key(name, labels);
        self.series
            .lock()
            .expect("recording sink lock")
            .counters
            .get(&key)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the sum of a counter over all label sets.
    #[must_use]
    pub fn counter_total(&self, name: &str) -> u64 {
        let series = self.series.lock().expect("recording sink lock");
        series
            .counters
            .iter()
            .filter(|(key, _)| key.as_str() == name || key.starts_with(&format!("{name}{{")))
            .map(|(_, value)| value)
            .sum()
    }

    /// Returns the latest value of one labeled gauge series.
    #[must_use]
    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let key = series_key(name, labels);
        self.series
            .lock()
            .expect("recording sink lock")
            .gauges
            .get(&key)
            .copied()
    }

    /// Returns the number of observations recorded for a series.
    #[must_use]
    pub fn observation_count(&self, name: &str) -> usize {
        self.series
            .lock()
            .expect("recording sink lock")
            .observations
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Returns how many times `push` was called.
    #[must_use]
    pub fn pushes(&self) -> u64 {
        self.series.lock().expect("recording sink lock").pushes
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    fn inc_counter(&self, name: &str, labels: &[(&str, &str)]) {
        let key = series_key(name, labels);
        let mut series = self.series.lock().expect("recording sink lock");
        *series.counters.entry(key).or_insert(0) += 1;
    }

    fn set_gauge(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let key = series_key(name, labels);
        let mut series = self.series.lock().expect("recording sink lock");
        series.gauges.insert(key, value);
    }

    fn observe(&self, name: &str, value: f64) {
        let mut series = self.series.lock().expect("recording sink lock");
        series
            .observations
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    async fn push(&self) -> Result<(), MetricsPushError> {
        let mut series = self.series.lock().expect("recording sink lock");
        series.pushes += 1;
        Ok(())
    }
}

/// Renders `name{k="v",...}` in the conventional exposition shape.
fn series_key(name: &str, labels: &[(&str, &str)]) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let mut key = String::from(name);
    key.push('{');
    for (i, (label, value)) in labels.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        let _ = write!(key, "{label}=\"{value}\"");
    }
    key.push('}');
    key
}
