//! Application state for the API server

use crate::{Config, Daemon};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The daemon that owns the job registry and runs the jobs
    pub daemon: Arc<Daemon>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(daemon: Arc<Daemon>, config: Arc<Config>) -> Self {
        Self { daemon, config }
    }
}
