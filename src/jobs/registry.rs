//! In-memory job store shared by the API and the job handlers.

use super::Job;
use crate::error::{JobError, Result};
use crate::types::{JobEvent, JobId, JobStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// Capacity of the job event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

#[derive(Default)]
struct RegistryInner {
    jobs: HashMap<JobId, Job>,
    /// Insertion order, so listings are stable
    order: Vec<JobId>,
}

/// Process-wide collection of jobs (cloneable - state is Arc-wrapped)
///
/// Created once with the daemon and injected wherever jobs are created or
/// queried. Entries are only removed through [`JobRegistry::drain_finished`],
/// which the polling client drives.
#[derive(Clone)]
pub struct JobRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
            event_tx,
        }
    }

    /// Subscribe to job lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn emit(&self, event: JobEvent) {
        // no subscribers is fine
        self.event_tx.send(event).ok();
    }

    /// Add a job; fails if the id is already registered
    pub async fn append(&self, job: Job) -> Result<JobId> {
        let id = job.id.clone();
        let event = JobEvent::Created {
            id: id.clone(),
            app_id: job.app_id.clone(),
            kind: job.kind,
        };

        {
            let mut inner = self.inner.write().await;
            if inner.jobs.contains_key(&id) {
                return Err(JobError::DuplicateId { id: id.to_string() }.into());
            }
            inner.order.push(id.clone());
            inner.jobs.insert(id.clone(), job);
        }

        tracing::debug!(job_id = %id, "job appended");
        self.emit(event);
        Ok(id)
    }

    /// Mark a job finished with its result
    pub async fn finish(
        &self,
        id: &JobId,
        result: serde_json::Value,
        message: impl Into<String>,
    ) -> Result<()> {
        let message = message.into();
        let app_id = self
            .transition(id, |job| job.finish(result, message.clone()))
            .await?;

        tracing::debug!(job_id = %id, message = %message, "job finished");
        self.emit(JobEvent::Finished {
            id: id.clone(),
            app_id,
            message,
        });
        Ok(())
    }

    /// Mark a job errored
    pub async fn fail(&self, id: &JobId, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        let app_id = self
            .transition(id, |job| job.fail(message.clone()))
            .await?;

        tracing::warn!(job_id = %id, message = %message, "job errored");
        self.emit(JobEvent::Errored {
            id: id.clone(),
            app_id,
            message,
        });
        Ok(())
    }

    async fn transition<F>(&self, id: &JobId, apply: F) -> Result<String>
    where
        F: FnOnce(&mut Job) -> std::result::Result<(), JobError>,
    {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .get_mut(id)
            .ok_or_else(|| JobError::NotFound { id: id.to_string() })?;
        apply(job)?;
        Ok(job.app_id.clone())
    }

    /// Snapshot of a single job
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.inner.read().await.jobs.get(id).cloned()
    }

    /// Current status of a job
    pub async fn status(&self, id: &JobId) -> Option<JobStatus> {
        self.inner.read().await.jobs.get(id).map(|job| job.status)
    }

    /// All jobs in insertion order
    pub async fn list(&self) -> Vec<Job> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.jobs.get(id).cloned())
            .collect()
    }

    /// Jobs owned by one client, in insertion order
    pub async fn list_for_app(&self, app_id: &str) -> Vec<Job> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.jobs.get(id))
            .filter(|job| job.app_id == app_id)
            .cloned()
            .collect()
    }

    /// Remove and return terminal jobs, optionally only those of one client
    ///
    /// Pending jobs are never removed.
    pub async fn drain_finished(&self, app_id: Option<&str>) -> Vec<Job> {
        let mut inner = self.inner.write().await;
        let RegistryInner { jobs, order } = &mut *inner;

        let mut drained = Vec::new();
        order.retain(|id| {
            let removable = jobs
                .get(id)
                .is_some_and(|job| job.is_terminal() && app_id.is_none_or(|a| job.app_id == a));
            if removable && let Some(job) = jobs.remove(id) {
                drained.push(job);
            }
            !removable
        });

        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), app_id = ?app_id, "drained terminal jobs");
        }
        drained
    }

    /// Number of registered jobs
    pub async fn len(&self) -> usize {
        self.inner.read().await.jobs.len()
    }

    /// Whether no job is registered
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.jobs.is_empty()
    }
}
