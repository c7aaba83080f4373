//! Continuous chunk retrieval simulation.
//!
//! Runs upload/sync/download sweeps over the cluster indefinitely until
//! cancelled. Unlike the single-shot check, a failed unit never ends the
//! run: it increments the matching failure counter and the sweep moves
//! on. The simulation is the steady background load pointed at long-
//! lived environments; its value is the metrics stream, not a verdict.

use std::time::{Duration, Instant};

use hive_client::UploadOptions;
use hive_cluster::Cluster;
use hive_core::Chunk;
use hive_workload::{pseudo_generators, random_seed};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{CheckError, CheckResult};
use crate::metrics::{names, MetricsSink};
use crate::report::RunReport;

/// Options for the retrieval simulation.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Chunks uploaded per upload node per sweep.
    pub chunks_per_node: u32,
    /// Amount paid per postage batch.
    pub postage_amount: u64,
    /// Depth of postage batches.
    pub postage_depth: u64,
    /// Label attached to created batches.
    pub postage_label: String,
    /// Wait after batch resolution before uploading.
    pub postage_wait: Duration,
    /// Seed for the run's generators; drawn from entropy when `None`.
    pub seed: Option<u64>,
    /// How many nodes (in sorted name order) upload chunks.
    pub upload_node_count: u32,
    /// Delay between sweeps.
    pub upload_delay: Duration,
    /// Return cancellation as an error instead of a clean report.
    pub surface_cancellation: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            chunks_per_node: 1,
            postage_amount: 1000,
            postage_depth: 16,
            postage_label: "test-label".to_string(),
            postage_wait: Duration::from_secs(5),
            seed: None,
            upload_node_count: 1,
            upload_delay: Duration::from_secs(5),
            surface_cancellation: false,
        }
    }
}

/// Runs the retrieval simulation until the token is cancelled.
///
/// Returns the accumulated report on clean cancellation. Per-unit
/// failures are recorded and survived; only unusable options and
/// topology enumeration failures abort the run.
///
/// # Errors
///
/// Fails before the first sweep on invalid options or on a topology
/// query failure. With [`SimulationOptions::surface_cancellation`] set,
/// cancellation itself is surfaced as [`CheckError::Cancelled`].
#[allow(clippy::too_many_lines)]
pub async fn run(
    cluster: &Cluster,
    opts: SimulationOptions,
    sink: &dyn MetricsSink,
    cancel: CancellationToken,
) -> CheckResult<RunReport> {
    if opts.chunks_per_node == 0 || opts.upload_node_count == 0 {
        return Err(CheckError::InvalidOptions {
            reason: "chunks_per_node and upload_node_count must be positive".to_string(),
        });
    }

    let seed = opts.seed.unwrap_or_else(random_seed);
    info!(seed, "starting retrieval simulation");

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
    let mut rngs = pseudo_generators(seed, upload_count);
    let mut sweep: u64 = 0;

    loop {
        sweep += 1;
        debug!(sweep, "starting sweep");

        for (i, node_name) in node_names.iter().take(upload_count).enumerate() {
            let client = &clients[node_name];
            let overlay = overlays
                .get(node_name)
                .map(ToString::to_string)
                .unwrap_or_default();

            let batch_id = match client
                .get_or_create_batch(opts.postage_amount, opts.postage_depth, &opts.postage_label)
                .await
            {
                Ok(batch_id) => batch_id,
                Err(err) => {
                    warn!(node = %node_name, error = %err, "batch unavailable, skipping node");
                    sink.inc_counter(names::CHUNKS_NOT_UPLOADED_COUNT, &[("node", &overlay)]);
                    report.record_failure();
                    continue;
                }
            };
            tokio::time::sleep(opts.postage_wait).await;

            for _ in 0..opts.chunks_per_node {
                let chunk = Chunk::random(&mut rngs[i]);
                let chunk_address = chunk.address();

                let tag = match client.create_tag().await {
                    Ok(tag) => tag,
                    Err(err) => {
                        warn!(node = %node_name, error = %err, "tag creation failed");
                        sink.inc_counter(names::CHUNKS_NOT_UPLOADED_COUNT, &[("node", &overlay)]);
                        report.record_failure();
                        continue;
                    }
                };

                let upload_started = Instant::now();
                let address = match client
                    .upload_chunk(
                        chunk.data().clone(),
                        UploadOptions::new(batch_id.clone()).with_tag(tag.uid),
                    )
                    .await
                {
                    Ok(address) => address,
                    Err(err) => {
                        warn!(node = %node_name, address = %chunk_address, error = %err, "chunk upload failed");
                        sink.inc_counter(names::CHUNKS_NOT_UPLOADED_COUNT, &[("node", &overlay)]);
                        report.record_failure();
                        continue;
                    }
                };
                let upload_elapsed = upload_started.elapsed();
                sink.inc_counter(names::CHUNKS_UPLOADED_COUNT, &[("node", &overlay)]);
                sink.set_gauge(
                    names::CHUNK_UPLOAD_DURATION_SECONDS,
                    &[("node", &overlay)],
                    upload_elapsed.as_secs_f64(),
                );
                sink.observe(names::CHUNK_UPLOAD_SECONDS, upload_elapsed.as_secs_f64());
                report.record_upload(as_micros(upload_elapsed));

                let sync_started = Instant::now();
                if let Err(source) = client.wait_sync(tag.uid).await {
                    let err = CheckError::SyncTimeout {
                        node: node_name.clone(),
                        address,
                        source,
                    };
                    warn!(error = %err, "tag never synced");
                    sink.inc_counter(names::TAGS_NOT_SYNCED_COUNT, &[("node", &overlay)]);
                    report.record_failure();
                    continue;
                }
                let sync_elapsed = sync_started.elapsed();
                sink.inc_counter(names::TAGS_SYNCED_COUNT, &[("node", &overlay)]);
                sink.set_gauge(
                    names::TAGS_SYNC_DURATION_SECONDS,
                    &[("node", &overlay)],
                    sync_elapsed.as_secs_f64(),
                );
                sink.observe(names::TAGS_SYNC_SECONDS, sync_elapsed.as_secs_f64());
                report.record_sync(as_micros(sync_elapsed));

                // Download from a pseudo-random node, independent of the
                // uploader; the same node is a valid (trivial) target.
                let target = &node_names[rngs[i].gen_range(0..node_names.len())];
                let target_client = &clients[target];
                let target_overlay = overlays
                    .get(target)
                    .map(ToString::to_string)
                    .unwrap_or_default();

                let download_started = Instant::now();
                let downloaded = match target_client.download_chunk(address).await {
                    Ok(data) => data,
                    Err(err) => {
                        warn!(node = %target, address = %address, error = %err, "chunk download failed");
                        sink.inc_counter(
                            names::CHUNKS_NOT_DOWNLOADED_COUNT,
                            &[("node", &target_overlay)],
                        );
                        report.record_failure();
                        continue;
                    }
                };
                let download_elapsed = download_started.elapsed();
                sink.inc_counter(names::CHUNKS_DOWNLOADED_COUNT, &[("node", &target_overlay)]);
                sink.set_gauge(
                    names::CHUNK_DOWNLOAD_DURATION_SECONDS,
                    &[("node", &target_overlay)],
                    download_elapsed.as_secs_f64(),
                );
                sink.observe(names::CHUNK_DOWNLOAD_SECONDS, download_elapsed.as_secs_f64());
                report.record_download(as_micros(download_elapsed));

                if downloaded != *chunk.data() {
                    warn!(node = %target, address = %address, "downloaded chunk differs from uploaded");
                    sink.inc_counter(
                        names::CHUNKS_NOT_RETRIEVED_COUNT,
                        &[("node", &target_overlay)],
                    );
                    report.record_failure();
                    continue;
                }
                sink.inc_counter(names::CHUNKS_RETRIEVED_COUNT, &[("node", &target_overlay)]);
                report.record_ok();
                debug!(node = %target, address = %address, "chunk retrieved");
            }
        }

        if let Err(err) = sink.push().await {
            warn!(error = %err, "metrics push failed");
        }

        tokio::select! {
            () = cancel.cancelled() => {
                report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if opts.surface_cancellation {
                    info!(sweep, "simulation cancelled, surfacing cause");
                    return Err(CheckError::Cancelled { sweeps: sweep });
                }
                info!(sweep, "simulation cancelled, exiting cleanly");
                return Ok(report);
            }
            () = tokio::time::sleep(opts.upload_delay) => {}
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_micros(elapsed: Duration) -> u64 {
    elapsed.as_micros() as u64
}
