//! End-to-end verification runs against the in-memory simulated fleet.

use std::sync::Arc;
use std::time::Duration;

use hive_check::{
    file_retrieval, metrics::names, retrieval, CheckError, CheckOptions, RecordingSink,
    SimulationOptions,
};
use hive_client::sim::{SimFaults, SimNetwork};
use hive_cluster::{Cluster, ClusterOptions, NodeConfig, NodeGroupOptions};
use tokio_util::sync::CancellationToken;

/// Builds a one-group cluster of `count` nodes named `bee-{i}`, applying
/// fault knobs to the named nodes.
fn sim_cluster(count: usize, faults: &[(&str, SimFaults)]) -> Cluster {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let network = SimNetwork::new();
    let mut cluster = Cluster::new("sim", ClusterOptions::default());
    cluster
        .add_node_group("nodes", NodeGroupOptions::default())
        .unwrap();
    let group = cluster.node_group_mut("nodes").unwrap();
    for i in 0..count {
        let name = format!("bee-{i}");
        let node_faults = faults
            .iter()
            .find(|(n, _)| *n == name)
            .map_or_else(SimFaults::default, |(_, f)| *f);
        let client = Arc::new(network.node_with_faults(&name, node_faults));
        group.add_node(&name, NodeConfig::default(), client).unwrap();
    }
    cluster
}

fn fast_check_options() -> CheckOptions {
    CheckOptions {
        file_size: 16 * 1024,
        postage_wait: Duration::ZERO,
        settle_wait: Duration::ZERO,
        seed: Some(42),
        ..CheckOptions::default()
    }
}

#[tokio::test]
async fn test_default_check_uploads_and_retrieves_from_last_node() {
    let cluster = sim_cluster(5, &[]);
    let sink = RecordingSink::new();

    let report = file_retrieval::run(&cluster, fast_check_options(), &sink)
        .await
        .unwrap();

    assert_eq!(report.units_total, 1);
    assert_eq!(report.units_ok, 1);
    assert_eq!(report.units_failed, 0);
    assert_eq!(sink.counter_total(names::FILES_UPLOADED_COUNT), 1);
    assert_eq!(sink.counter_total(names::FILES_DOWNLOADED_COUNT), 1);
    assert_eq!(sink.counter_total(names::FILES_RETRIEVED_COUNT), 1);
    assert_eq!(sink.counter_total(names::FILES_NOT_RETRIEVED_COUNT), 0);
    assert_eq!(sink.pushes(), 1);
}

#[tokio::test]
async fn test_full_check_downloads_from_every_other_node() {
    let cluster = sim_cluster(4, &[]);
    let sink = RecordingSink::new();
    let opts = CheckOptions {
        full: true,
        ..fast_check_options()
    };

    let report = file_retrieval::run(&cluster, opts, &sink).await.unwrap();

    // One upload, three download targets.
    assert_eq!(report.units_ok, 3);
    assert_eq!(sink.counter_total(names::FILES_UPLOADED_COUNT), 1);
    assert_eq!(sink.counter_total(names::FILES_DOWNLOADED_COUNT), 3);
    assert_eq!(sink.counter_total(names::FILES_RETRIEVED_COUNT), 3);
}

#[tokio::test]
async fn test_check_mismatch_aborts_remaining_units() {
    // The designated download node serves corrupted bytes; the first
    // unit must fail the whole run before the second file is uploaded.
    let corrupt = SimFaults {
        corrupt_download: true,
        ..SimFaults::default()
    };
    let cluster = sim_cluster(3, &[("bee-2", corrupt)]);
    let sink = RecordingSink::new();
    let opts = CheckOptions {
        files_per_node: 2,
        ..fast_check_options()
    };

    let err = file_retrieval::run(&cluster, opts, &sink).await.unwrap_err();

    assert!(matches!(err, CheckError::ContentMismatch { ref node, .. } if node == "bee-2"));
    assert_eq!(sink.counter_total(names::FILES_UPLOADED_COUNT), 1);
    assert_eq!(sink.counter_total(names::FILES_NOT_RETRIEVED_COUNT), 1);
    assert_eq!(sink.counter_total(names::FILES_RETRIEVED_COUNT), 0);
    // Failure counters still reach the aggregator on abort.
    assert_eq!(sink.pushes(), 1);
}

#[tokio::test]
async fn test_check_download_failure_is_fatal() {
    let refusing = SimFaults {
        fail_download: true,
        ..SimFaults::default()
    };
    let cluster = sim_cluster(3, &[("bee-2", refusing)]);
    let sink = RecordingSink::new();

    let err = file_retrieval::run(&cluster, fast_check_options(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::DownloadFailed { ref node, .. } if node == "bee-2"));
    assert_eq!(sink.counter_total(names::FILES_NOT_DOWNLOADED_COUNT), 1);
    assert_eq!(sink.pushes(), 1);
}

#[tokio::test]
async fn test_check_batch_failure_is_fatal() {
    let batchless = SimFaults {
        fail_batch: true,
        ..SimFaults::default()
    };
    let cluster = sim_cluster(3, &[("bee-0", batchless)]);
    let sink = RecordingSink::new();

    let err = file_retrieval::run(&cluster, fast_check_options(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::BatchCreationFailed { ref node, .. } if node == "bee-0"));
    assert_eq!(sink.counter_total(names::FILES_UPLOADED_COUNT), 0);
}

#[tokio::test]
async fn test_check_rejects_zero_sized_files() {
    let cluster = sim_cluster(2, &[]);
    let sink = RecordingSink::new();
    let err = file_retrieval::run(
        &cluster,
        CheckOptions {
            file_size: 0,
            ..fast_check_options()
        },
        &sink,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CheckError::InvalidOptions { .. }));
    assert_eq!(sink.pushes(), 0);
}

fn fast_simulation_options() -> SimulationOptions {
    SimulationOptions {
        postage_wait: Duration::ZERO,
        upload_delay: Duration::from_millis(10),
        seed: Some(42),
        ..SimulationOptions::default()
    }
}

#[tokio::test]
async fn test_simulation_survives_sync_failures_until_cancelled() {
    // The single upload node never syncs; every sweep must record one
    // not-synced tag and keep going, and cancellation must end the run
    // cleanly with Ok.
    let never_syncs = SimFaults {
        fail_sync: true,
        ..SimFaults::default()
    };
    let cluster = Arc::new(sim_cluster(3, &[("bee-0", never_syncs)]));
    let sink = Arc::new(RecordingSink::new());
    let cancel = CancellationToken::new();

    let run_cluster = Arc::clone(&cluster);
    let run_sink = Arc::clone(&sink);
    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        retrieval::run(
            &run_cluster,
            fast_simulation_options(),
            run_sink.as_ref(),
            run_cancel,
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    let report = handle.await.unwrap().unwrap();

    let uploaded = sink.counter_total(names::CHUNKS_UPLOADED_COUNT);
    let not_synced = sink.counter_total(names::TAGS_NOT_SYNCED_COUNT);
    assert!(not_synced >= 1, "expected at least one sweep to run");
    // Every uploaded chunk failed at the sync phase, one per sweep.
    assert_eq!(uploaded, not_synced);
    assert_eq!(sink.counter_total(names::TAGS_SYNCED_COUNT), 0);
    assert_eq!(sink.counter_total(names::CHUNKS_DOWNLOADED_COUNT), 0);
    assert_eq!(report.units_ok, 0);
    assert_eq!(report.units_failed, not_synced);
}

#[tokio::test]
async fn test_simulation_healthy_sweeps_retrieve_everything() {
    let cluster = Arc::new(sim_cluster(4, &[]));
    let sink = Arc::new(RecordingSink::new());
    let cancel = CancellationToken::new();

    let run_cluster = Arc::clone(&cluster);
    let run_sink = Arc::clone(&sink);
    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        retrieval::run(
            &run_cluster,
            SimulationOptions {
                chunks_per_node: 2,
                upload_node_count: 2,
                ..fast_simulation_options()
            },
            run_sink.as_ref(),
            run_cancel,
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    let report = handle.await.unwrap().unwrap();

    let uploaded = sink.counter_total(names::CHUNKS_UPLOADED_COUNT);
    assert!(uploaded >= 4, "expected at least one full sweep");
    assert_eq!(sink.counter_total(names::CHUNKS_RETRIEVED_COUNT), uploaded);
    assert_eq!(sink.counter_total(names::CHUNKS_NOT_RETRIEVED_COUNT), 0);
    assert_eq!(report.units_failed, 0);
    assert_eq!(report.units_ok, uploaded);
    assert!(sink.pushes() >= 1);
}

#[tokio::test]
async fn test_simulation_surfaces_cancellation_on_request() {
    let cluster = Arc::new(sim_cluster(2, &[]));
    let sink = Arc::new(RecordingSink::new());
    let cancel = CancellationToken::new();

    let run_cluster = Arc::clone(&cluster);
    let run_sink = Arc::clone(&sink);
    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        retrieval::run(
            &run_cluster,
            SimulationOptions {
                surface_cancellation: true,
                ..fast_simulation_options()
            },
            run_sink.as_ref(),
            run_cancel,
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    let err = handle.await.unwrap().unwrap_err();
    assert!(matches!(err, CheckError::Cancelled { sweeps } if sweeps >= 1));
}

#[tokio::test]
async fn test_simulation_rejects_empty_options() {
    let cluster = sim_cluster(2, &[]);
    let sink = RecordingSink::new();
    let err = retrieval::run(
        &cluster,
        SimulationOptions {
            chunks_per_node: 0,
            ..SimulationOptions::default()
        },
        &sink,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CheckError::InvalidOptions { .. }));
}
