//! Supervised job execution.
//!
//! A handler owns its job and records the terminal transition itself,
//! expected failures (HTTP status, transport, bad body) included. Anything
//! else that escapes the handler, an `Err` or a panic, is recorded on the job
//! by the supervisor and logged in one place, [`observe_escape`].

use super::Daemon;
use crate::error::{Error, Result};
use crate::jobs::Job;
use crate::types::{JobId, JobKind};
use std::future::Future;
use std::sync::atomic::Ordering;

/// What a handler gets to work with
pub(crate) struct JobContext {
    pub(crate) daemon: Daemon,
    pub(crate) job: Job,
}

impl JobContext {
    /// Finish the owned job
    pub(crate) async fn finish(
        &self,
        result: serde_json::Value,
        message: impl Into<String>,
    ) -> Result<()> {
        self.daemon
            .registry
            .finish(&self.job.id, result, message)
            .await
    }

    /// Fail the owned job with a domain message
    pub(crate) async fn fail(&self, message: impl Into<String>) -> Result<()> {
        self.daemon.registry.fail(&self.job.id, message).await
    }
}

impl Daemon {
    /// Register `job` and run `handler` for it in the background
    ///
    /// Returns as soon as the job is visible as pending.
    pub(crate) async fn spawn_job<F, Fut>(&self, job: Job, handler: F) -> Result<JobId>
    where
        F: FnOnce(JobContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let id = self.registry.append(job.clone()).await?;
        let kind = job.kind;
        let ctx = JobContext {
            daemon: self.clone(),
            job,
        };

        let handle = tokio::spawn(handler(ctx));
        let registry = self.registry.clone();
        let job_id = id.clone();

        self.tracker.spawn(async move {
            let escaped = match handle.await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(join_err) => Some(format!("{} job aborted: {}", kind, join_err)),
            };

            match escaped {
                Some(message) => {
                    observe_escape(&job_id, kind, &message);
                    if let Err(e) = registry.fail(&job_id, message).await {
                        // Job was already terminal, the failure came after the result
                        tracing::debug!(job_id = %job_id, error = %e, "escaped failure not recorded");
                    }
                }
                None => {
                    if registry.status(&job_id).await.is_some_and(|s| !s.is_terminal()) {
                        observe_escape(&job_id, kind, "handler ended without a result");
                        registry
                            .fail(&job_id, "handler ended without a result")
                            .await
                            .ok();
                    }
                }
            }
        });

        tracing::debug!(job_id = %id, kind = %kind, "job scheduled");
        Ok(id)
    }
}

/// The single observer of failures that escaped a handler
fn observe_escape(id: &JobId, kind: JobKind, message: &str) {
    tracing::error!(job_id = %id, kind = %kind, error = %message, "job handler failed");
}
