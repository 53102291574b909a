//! Concurrent thumbnail downloads.
//!
//! Every job of a batch runs as its own task. One failing (or panicking)
//! download never stops its siblings; each outcome lands on its own job.

use super::file::fetch_file;
use crate::jobs::{Job, JobPayload, JobRegistry, ThumbnailDownload};
use crate::types::JobId;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Message of a thumbnail job whose file was written
pub const DOWNLOADED_MESSAGE: &str = "thumbnail downloaded";

/// Outcome counts of a batch
///
/// `succeeded` and `failed` are only known when the batch was awaited;
/// a detached batch reports zero for both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of download tasks started
    pub scheduled: usize,
    /// Jobs finished
    pub succeeded: usize,
    /// Jobs errored, panics included
    pub failed: usize,
}

/// Download every job of `jobs` concurrently
///
/// With `block` set, returns once every job is terminal. Otherwise the
/// downloads continue on `tracker` after this returns, and the daemon's
/// shutdown waits for them.
pub async fn run_batch(
    registry: &JobRegistry,
    client: &reqwest::Client,
    jobs: Vec<Job>,
    block: bool,
    buffer_size: usize,
    tracker: &TaskTracker,
) -> BatchReport {
    let handles: Vec<(JobId, JoinHandle<bool>)> = jobs
        .into_iter()
        .map(|job| {
            let id = job.id.clone();
            let handle = tracker.spawn(download_one(
                registry.clone(),
                client.clone(),
                job,
                buffer_size,
            ));
            (id, handle)
        })
        .collect();

    let scheduled = handles.len();
    tracing::debug!(scheduled, block, "thumbnail batch started");

    if block {
        return settle(registry, handles).await;
    }

    let registry = registry.clone();
    tracker.spawn(async move {
        let report = settle(&registry, handles).await;
        tracing::debug!(?report, "detached thumbnail batch settled");
    });

    BatchReport {
        scheduled,
        ..BatchReport::default()
    }
}

/// Await all handles, turning panicked tasks into errored jobs
async fn settle(registry: &JobRegistry, handles: Vec<(JobId, JoinHandle<bool>)>) -> BatchReport {
    let (ids, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    let outcomes = futures::future::join_all(handles).await;

    let mut report = BatchReport {
        scheduled: ids.len(),
        ..BatchReport::default()
    };

    for (id, outcome) in ids.iter().zip(outcomes) {
        match outcome {
            Ok(true) => report.succeeded += 1,
            Ok(false) => report.failed += 1,
            Err(e) => {
                report.failed += 1;
                tracing::error!(job_id = %id, error = %e, "thumbnail task aborted");
                if let Err(e) = registry
                    .fail(id, format!("Thumbnail download failed: {}", e))
                    .await
                {
                    tracing::warn!(job_id = %id, error = %e, "could not record aborted thumbnail task");
                }
            }
        }
    }

    report
}

/// Run one download and record its outcome; returns whether it succeeded
async fn download_one(
    registry: JobRegistry,
    client: reqwest::Client,
    job: Job,
    buffer_size: usize,
) -> bool {
    let JobPayload::ThumbnailDownload(download) = &job.payload else {
        record(
            &registry,
            &job.id,
            Err(format!("Thumbnail download failed: {} is not a thumbnail job", job.kind)),
        )
        .await;
        return false;
    };

    let outcome = fetch_file(&client, &download.image_url, &download.image_path, buffer_size)
        .await
        .map_err(|e| format!("Thumbnail download failed: {}", e))
        .and_then(|_| summary(download));

    let ok = outcome.is_ok();
    record(&registry, &job.id, outcome).await;
    ok
}

fn summary(download: &ThumbnailDownload) -> Result<serde_json::Value, String> {
    serde_json::to_value(download).map_err(|e| format!("Thumbnail download failed: {}", e))
}

async fn record(registry: &JobRegistry, id: &JobId, outcome: Result<serde_json::Value, String>) {
    let transition = match outcome {
        Ok(result) => registry.finish(id, result, DOWNLOADED_MESSAGE).await,
        Err(message) => registry.fail(id, message).await,
    };
    if let Err(e) = transition {
        tracing::warn!(job_id = %id, error = %e, "could not record thumbnail outcome");
    }
}
