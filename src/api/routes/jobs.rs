//! Job polling handlers.

use super::JobsQuery;
use crate::api::AppState;
use crate::error::{JobError, Result};
use crate::jobs::Job;
use crate::types::JobId;
use axum::{
    Json,
    extract::{Path, Query, State},
};

/// GET /jobs - List jobs in creation order
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    tag = "jobs",
    params(JobsQuery),
    responses(
        (status = 200, description = "Jobs, oldest first", body = Vec<Job>)
    )
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Json<Vec<Job>> {
    let registry = state.daemon.registry();
    let jobs = match query.app_id.as_deref() {
        Some(app_id) => registry.list_for_app(app_id).await,
        None => registry.list().await,
    };
    Json(jobs)
}

/// GET /jobs/:id - Get a single job
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job", body = Job),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    )
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Job>> {
    let id = JobId::from(id);
    match state.daemon.registry().get(&id).await {
        Some(job) => Ok(Json(job)),
        None => Err(JobError::NotFound { id: id.to_string() }.into()),
    }
}

/// DELETE /jobs - Remove and return terminal jobs
///
/// Pending jobs are left alone, so a client can poll and drain in one call.
#[utoipa::path(
    delete,
    path = "/api/v1/jobs",
    tag = "jobs",
    params(JobsQuery),
    responses(
        (status = 200, description = "The removed jobs", body = Vec<Job>)
    )
)]
pub async fn drain_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Json<Vec<Job>> {
    Json(
        state
            .daemon
            .registry()
            .drain_finished(query.app_id.as_deref())
            .await,
    )
}
