//! Idle waiting and shutdown coordination.

use super::Daemon;
use crate::error::Result;
use crate::types::JobEvent;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Upper bound on how long shutdown waits for running handlers
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl Daemon {
    /// Wait until every running handler and detached batch has settled
    ///
    /// Jobs accepted while waiting are waited for as well.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        if self.accepting_new.load(Ordering::SeqCst) {
            self.tracker.reopen();
            // A shutdown that started after the check above must still find
            // the tracker closed
            if !self.accepting_new.load(Ordering::SeqCst) {
                self.tracker.close();
            }
        }
    }

    /// Whether new jobs are still accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }

    /// Gracefully shut down the daemon
    ///
    /// 1. Stops accepting new jobs
    /// 2. Waits for running handlers, at most 30 seconds
    /// 3. Emits [`JobEvent::Shutdown`]
    ///
    /// Handlers still running after the timeout keep their jobs pending.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        self.tracker.close();
        tracing::info!(running = self.tracker.len(), "Stopped accepting new jobs");

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.tracker.wait()).await {
            Ok(()) => tracing::info!("All running jobs settled"),
            Err(_) => {
                let pending = self
                    .registry
                    .list()
                    .await
                    .iter()
                    .filter(|job| !job.is_terminal())
                    .count();
                tracing::warn!(pending, "Timeout waiting for jobs to settle, proceeding with shutdown");
            }
        }

        self.registry.emit(JobEvent::Shutdown);
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}
