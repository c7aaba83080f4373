//! Single-shot file retrieval check.
//!
//! Uploads generated files to the first `upload_node_count` nodes (in
//! sorted name order) and verifies they can be retrieved elsewhere: from
//! the designated last node by default, or from every other node in full
//! mode. The whole-file hash decides success. Any failed unit aborts the
//! run; a passing run means every uploaded file was retrieved intact.

use std::time::{Duration, Instant};

use hive_client::UploadOptions;
use hive_cluster::Cluster;
use hive_core::{estimate_batch_depth, File, Limits, BATCH_DEPTH_MARGIN};
use hive_workload::{pseudo_generators, random_seed};
use tracing::{info, warn};

use crate::error::{CheckError, CheckResult};
use crate::metrics::{names, MetricsSink};
use crate::report::RunReport;

/// Options for the file retrieval check.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Base name for generated files.
    pub file_name: String,
    /// Size of each generated file in bytes.
    pub file_size: u64,
    /// Files uploaded per upload node.
    pub files_per_node: u32,
    /// Download from every other node instead of only the last one.
    pub full: bool,
    /// Amount paid per postage batch.
    pub postage_amount: u64,
    /// Label attached to created batches.
    pub postage_label: String,
    /// Wait after batch creation before uploading.
    pub postage_wait: Duration,
    /// Wait after upload before downloading.
    pub settle_wait: Duration,
    /// Seed for the run's generators; drawn from entropy when `None`.
    pub seed: Option<u64>,
    /// How many nodes (in sorted name order) upload files.
    pub upload_node_count: u32,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            file_name: "file".to_string(),
            file_size: 1024 * 1024,
            files_per_node: 1,
            full: false,
            postage_amount: 1000,
            postage_label: "test-label".to_string(),
            postage_wait: Duration::from_secs(5),
            settle_wait: Duration::from_secs(1),
            seed: None,
            upload_node_count: 1,
        }
    }
}

/// Runs the file retrieval check against the cluster.
///
/// Accumulated metrics are pushed before returning, on failure as well
/// as on success.
///
/// # Errors
///
/// Fails on unusable options, on topology enumeration failures, and on
/// the first unit that does not complete: batch creation, upload,
/// download, or a content mismatch. No further units run after a
/// failure.
#[allow(clippy::too_many_lines)]
pub async fn run(
    cluster: &Cluster,
    opts: CheckOptions,
    sink: &dyn MetricsSink,
) -> CheckResult<RunReport> {
    let limits = Limits::new();
    if opts.file_size == 0 || opts.file_size > limits.max_file_bytes {
        return Err(CheckError::InvalidOptions {
            reason: format!("file_size must be in 1..={} bytes", limits.max_file_bytes),
        });
    }
    if opts.files_per_node == 0
        || opts.upload_node_count == 0
        || opts.upload_node_count > limits.max_upload_nodes
    {
        return Err(CheckError::InvalidOptions {
            reason: format!(
                "files_per_node and upload_node_count must be in 1..={}",
                limits.max_upload_nodes
            ),
        });
    }

    let seed = opts.seed.unwrap_or_else(random_seed);
    info!(seed, file_size = opts.file_size, full = opts.full, "starting file retrieval check");

    let start = Instant::now();
    let mut report = RunReport::new(seed);

    let node_names = cluster.node_names()?;
    if node_names.is_empty() {
        return Err(CheckError::InvalidOptions {
            reason: "cluster has no nodes".to_string(),
        });
    }
    let clients = cluster.nodes_clients_all()?;
    let overlays = cluster.flatten_overlays(&[]).await?;

    let upload_count = (opts.upload_node_count as usize).min(node_names.len());
    let last_node = node_names.last().cloned().unwrap_or_default();
    let depth = BATCH_DEPTH_MARGIN + estimate_batch_depth(opts.file_size);
    let mut rngs = pseudo_generators(seed, upload_count);

    // Recorded counters must reach the sink even when a unit aborts the
    // run, so the units run inside a block with one common exit below.
    let outcome: CheckResult<()> = async {
        for (i, node_name) in node_names.iter().take(upload_count).enumerate() {
            let client = &clients[node_name];
            let overlay = overlays
                .get(node_name)
                .map(ToString::to_string)
                .unwrap_or_default();

            for file_index in 0..opts.files_per_node {
                let file = File::random(
                    &mut rngs[i],
                    format!("{}-{i}-{file_index}", opts.file_name),
                    opts.file_size,
                );

                let batch_id = client
                    .create_postage_batch(opts.postage_amount, depth, &opts.postage_label)
                    .await
                    .map_err(|source| {
                        report.record_failure();
                        CheckError::BatchCreationFailed {
                            node: node_name.clone(),
                            source,
                        }
                    })?;
                info!(node = %node_name, batch = %batch_id, depth, "batch created");
                tokio::time::sleep(opts.postage_wait).await;

                let upload_started = Instant::now();
                let address = client
                    .upload_file(file.data().clone(), UploadOptions::new(batch_id))
                    .await
                    .map_err(|source| {
                        sink.inc_counter(names::FILES_NOT_UPLOADED_COUNT, &[("node", &overlay)]);
                        report.record_failure();
                        CheckError::UploadFailed {
                            node: node_name.clone(),
                            source,
                        }
                    })?;
                let upload_elapsed = upload_started.elapsed();
                sink.inc_counter(names::FILES_UPLOADED_COUNT, &[("node", &overlay)]);
                sink.set_gauge(
                    names::FILE_UPLOAD_DURATION_SECONDS,
                    &[("node", &overlay), ("file", file.name())],
                    upload_elapsed.as_secs_f64(),
                );
                sink.observe(names::FILE_UPLOAD_SECONDS, upload_elapsed.as_secs_f64());
                report.record_upload(as_micros(upload_elapsed));
                info!(
                    node = %node_name,
                    file = %file.name(),
                    address = %address,
                    elapsed_us = as_micros(upload_elapsed),
                    "file uploaded"
                );

                tokio::time::sleep(opts.settle_wait).await;

                let download_targets: Vec<&String> = if opts.full {
                    node_names.iter().filter(|n| *n != node_name).collect()
                } else {
                    vec![&last_node]
                };

                for target in download_targets {
                    let target_client = &clients[target];
                    let target_overlay = overlays
                        .get(target)
                        .map(ToString::to_string)
                        .unwrap_or_default();

                    let download_started = Instant::now();
                    let downloaded =
                        target_client.download_file(address).await.map_err(|source| {
                            sink.inc_counter(
                                names::FILES_NOT_DOWNLOADED_COUNT,
                                &[("node", &target_overlay)],
                            );
                            report.record_failure();
                            CheckError::DownloadFailed {
                                node: target.clone(),
                                address,
                                source,
                            }
                        })?;
                    let download_elapsed = download_started.elapsed();
                    sink.inc_counter(names::FILES_DOWNLOADED_COUNT, &[("node", &target_overlay)]);
                    sink.set_gauge(
                        names::FILE_DOWNLOAD_DURATION_SECONDS,
                        &[("node", &target_overlay), ("file", file.name())],
                        download_elapsed.as_secs_f64(),
                    );
                    sink.observe(names::FILE_DOWNLOAD_SECONDS, download_elapsed.as_secs_f64());
                    report.record_download(as_micros(download_elapsed));

                    if downloaded.hash != file.hash() {
                        sink.inc_counter(
                            names::FILES_NOT_RETRIEVED_COUNT,
                            &[("node", &target_overlay)],
                        );
                        report.record_failure();
                        return Err(CheckError::ContentMismatch {
                            node: target.clone(),
                            address,
                            uploaded_size: file.size(),
                            downloaded_size: downloaded.size,
                        });
                    }
                    sink.inc_counter(names::FILES_RETRIEVED_COUNT, &[("node", &target_overlay)]);
                    report.record_ok();
                    info!(
                        node = %target,
                        file = %file.name(),
                        address = %address,
                        elapsed_us = as_micros(download_elapsed),
                        "file retrieved"
                    );
                }
            }
        }
        Ok(())
    }
    .await;

    if let Err(err) = sink.push().await {
        warn!(error = %err, "metrics push failed");
    }
    report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    outcome?;
    Ok(report)
}

#[allow(clippy::cast_possible_truncation)]
fn as_micros(elapsed: Duration) -> u64 {
    elapsed.as_micros() as u64
}
