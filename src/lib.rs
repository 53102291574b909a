//! # asset-daemon
//!
//! Background job daemon for an asset add-on. The add-on posts requests
//! (avatar, profile, search, categories) to a local REST API; each request
//! becomes a [`jobs::Job`] that the add-on polls until it is `finished` or
//! `errored`.
//!
//! ## Design
//!
//! - **Jobs first** - every unit of remote work is a job in one injectable
//!   [`jobs::JobRegistry`], visible as `pending` the moment it is accepted
//! - **Isolated failures** - a failing download or handler marks only its
//!   own job as errored
//! - **Streamed downloads** - thumbnails and avatars are written chunk by
//!   chunk and renamed into the cache once complete
//!
//! ## Quick Start
//!
//! ```no_run
//! use asset_daemon::{Config, Daemon};
//! use asset_daemon::jobs::CategoriesRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let daemon = Daemon::new(Config::default())?;
//!
//!     let id = daemon
//!         .update_categories(
//!             CategoriesRequest { api_key: None, app_id: "addon".into() },
//!             None,
//!         )
//!         .await?;
//!
//!     daemon.wait_idle().await;
//!     println!("{:?}", daemon.registry().get(&id).await);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API server
pub mod api;
/// Category tree aggregation
pub mod categories;
/// Configuration types
pub mod config;
/// Daemon core: request acceptance, supervised handlers, shutdown
pub mod daemon;
/// Error types
pub mod error;
/// HTTP sessions, file downloads and download batches
pub mod fetch;
/// Jobs and the job registry
pub mod jobs;
/// Profile response normalization
pub mod profile;
/// Thumbnail variant resolution
pub mod thumbnails;
/// Core types
pub mod types;
/// URL helpers
pub mod utils;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{ApiError, Error, ErrorDetail, FetchError, JobError, Result, ToHttpStatus};
pub use jobs::{
    AvatarRequest, CategoriesRequest, Job, JobPayload, JobRegistry, ProfileRequest, SearchRequest,
};
pub use types::{JobEvent, JobId, JobKind, JobStatus};

/// Run the daemon until a termination signal arrives, then shut it down
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use asset_daemon::{Config, Daemon, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let daemon = Daemon::new(Config::default())?;
///     let _api = daemon.spawn_api_server();
///
///     run_with_shutdown(daemon).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(daemon: Daemon) -> Result<()> {
    wait_for_signal().await;
    daemon.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received Ctrl+C signal");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
