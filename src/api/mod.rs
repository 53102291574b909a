//! REST API server module
//!
//! Accepts job requests from the add-on, exposes job status for polling and
//! streams job transitions as server-sent events.

use crate::{Config, Daemon, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Prefix every API route is mounted under
pub const API_PREFIX: &str = "/api/v1";

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Requests (each creates a job and returns its id)
/// - `POST /api/v1/profiles/avatar` - Fetch an author's avatar
/// - `POST /api/v1/profiles/me` - Fetch the logged-in user's profile
/// - `POST /api/v1/search` - Search and download thumbnails
/// - `POST /api/v1/categories` - Fetch the category tree
///
/// ## Jobs
/// - `GET /api/v1/jobs?app_id=` - List jobs, optionally of one client
/// - `GET /api/v1/jobs/{id}` - Get a single job
/// - `DELETE /api/v1/jobs?app_id=` - Remove and return terminal jobs
///
/// ## System
/// - `GET /api/v1/health` - Health check
/// - `GET /api/v1/openapi.json` - OpenAPI specification
/// - `GET /api/v1/events` - Server-sent events stream
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(daemon: Arc<Daemon>, config: Arc<Config>) -> Router {
    let state = AppState::new(daemon, config.clone());

    let api = Router::new()
        // Requests
        .route("/profiles/avatar", post(routes::fetch_avatar))
        .route("/profiles/me", post(routes::get_profile))
        .route("/search", post(routes::search))
        .route("/categories", post(routes::update_categories))
        // Jobs
        .route("/jobs", get(routes::list_jobs).delete(routes::drain_jobs))
        .route("/jobs/:id", get(routes::get_job))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    let router = Router::new().nest(API_PREFIX, api);

    // SwaggerUi serves its own copy of the spec next to the UI
    let router = if config.api.swagger_ui {
        router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        router.layer(build_cors_layer(&config.api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins that parse as header values are allowed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address
///
/// Runs until the server fails or the future is dropped.
///
/// # Example
///
/// ```no_run
/// use asset_daemon::{Config, Daemon};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let daemon = Arc::new(Daemon::new((*config).clone())?);
///
/// asset_daemon::api::start_api_server(daemon, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(daemon: Arc<Daemon>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(daemon, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
