//! Run reports.

use hdrhistogram::Histogram;

/// Aggregated outcome of one verification run.
///
/// Latencies are recorded in microseconds and reported in milliseconds.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Seed the run's generators were built from.
    pub seed: u64,
    /// Verification units attempted (one upload/sync/download/compare).
    pub units_total: u64,
    /// Units that passed end to end.
    pub units_ok: u64,
    /// Units that failed at any phase.
    pub units_failed: u64,
    /// Upload latency distribution.
    pub upload_latencies: Histogram<u64>,
    /// Sync-wait latency distribution.
    pub sync_latencies: Histogram<u64>,
    /// Download latency distribution.
    pub download_latencies: Histogram<u64>,
    /// Total run duration in milliseconds.
    pub duration_ms: u64,
}

impl RunReport {
    /// Creates an empty report for the given seed.
    ///
    /// # Panics
    ///
    /// Panics if histogram creation fails (should not happen with valid
    /// parameters).
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            units_total: 0,
            units_ok: 0,
            units_failed: 0,
            upload_latencies: Histogram::new(3).expect("histogram creation"),
            sync_latencies: Histogram::new(3).expect("histogram creation"),
            download_latencies: Histogram::new(3).expect("histogram creation"),
            duration_ms: 0,
        }
    }

    /// Records a unit that passed end to end.
    pub fn record_ok(&mut self) {
        self.units_total += 1;
        self.units_ok += 1;
    }

    /// Records a unit that failed at any phase.
    pub fn record_failure(&mut self) {
        self.units_total += 1;
        self.units_failed += 1;
    }

    /// Records an upload latency in microseconds.
    pub fn record_upload(&mut self, micros: u64) {
        let _ = self.upload_latencies.record(micros);
    }

    /// Records a sync-wait latency in microseconds.
    pub fn record_sync(&mut self, micros: u64) {
        let _ = self.sync_latencies.record(micros);
    }

    /// Records a download latency in microseconds.
    pub fn record_download(&mut self, micros: u64) {
        let _ = self.download_latencies.record(micros);
    }

    /// Prints a human-readable summary.
    #[allow(clippy::cast_precision_loss)]
    pub fn print_summary(&self) {
        println!("=== Verification Run ===");
        println!("Seed: {}", self.seed);
        println!(
            "Units: {} total, {} ok, {} failed",
            self.units_total, self.units_ok, self.units_failed
        );
        print_latency_line("Upload", &self.upload_latencies);
        print_latency_line("Sync", &self.sync_latencies);
        print_latency_line("Download", &self.download_latencies);
        println!("Duration: {}ms", self.duration_ms);
    }
}

#[allow(clippy::cast_precision_loss)]
fn print_latency_line(phase: &str, latencies: &Histogram<u64>) {
    println!(
        "{phase} latency: p50={:.2}ms p95={:.2}ms p99={:.2}ms max={:.2}ms",
        latencies.value_at_percentile(50.0) as f64 / 1000.0,
        latencies.value_at_percentile(95.0) as f64 / 1000.0,
        latencies.value_at_percentile(99.0) as f64 / 1000.0,
        latencies.max() as f64 / 1000.0,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_stay_consistent() {
        let mut report = RunReport::new(42);
        report.record_ok();
        report.record_ok();
        report.record_failure();
        assert_eq!(report.units_total, 3);
        assert_eq!(report.units_ok, 2);
        assert_eq!(report.units_failed, 1);
    }

    #[test]
    fn test_latencies_feed_percentiles() {
        let mut report = RunReport::new(0);
        for micros in [1000, 2000, 3000, 4000] {
            report.record_upload(micros);
        }
        assert!(report.upload_latencies.value_at_percentile(50.0) >= 1000);
        assert_eq!(report.sync_latencies.len(), 0);
    }
}
