//! Core daemon implementation split into focused submodules.
//!
//! The [`Daemon`] struct and its methods are organized by concern:
//! - [`requests`] - Accepting requests and turning them into jobs
//! - [`supervisor`] - Spawning job handlers and capturing their failures
//! - [`handlers`] - The per-kind job handlers (avatar, profile, search, categories)
//! - [`lifecycle`] - Idle waiting and graceful shutdown

mod handlers;
mod lifecycle;
mod requests;
mod supervisor;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::HttpSessions;
use crate::jobs::JobRegistry;
use crate::types::JobEvent;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio_util::task::TaskTracker;

/// Main daemon instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Daemon {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Job store shared with the API
    pub(crate) registry: JobRegistry,
    /// Outbound HTTP sessions
    pub(crate) sessions: HttpSessions,
    /// Every supervised handler and detached batch runs on this tracker
    pub(crate) tracker: TaskTracker,
    /// Cleared when shutdown starts; no job is accepted afterwards
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl Daemon {
    /// Create a daemon with a fresh job registry
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or an HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, JobRegistry::new())
    }

    /// Create a daemon around an existing registry
    pub fn with_registry(config: Config, registry: JobRegistry) -> Result<Self> {
        config.validate()?;
        let sessions = HttpSessions::new(&config.http)?;

        tracing::info!(server = %config.server_url, "daemon initialized");

        Ok(Self {
            config: Arc::new(config),
            registry,
            sessions,
            tracker: TaskTracker::new(),
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// The job registry
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Subscribe to job lifecycle events
    ///
    /// Each subscriber receives every event; one that falls more than 1000
    /// events behind gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<JobEvent> {
        self.registry.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let daemon = self.clone();
        let config = self.get_config();

        tokio::spawn(async move { crate::api::start_api_server(Arc::new(daemon), config).await })
    }
}
