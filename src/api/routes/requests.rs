//! Job-creating request handlers.
//!
//! Each handler validates the body, creates the job and answers 202 with its
//! id. The work itself continues in the background.

use super::{CreateJobQuery, JobAccepted};
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::jobs::{AvatarRequest, CategoriesRequest, ProfileRequest, SearchRequest};
use crate::types::JobId;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

fn require_app_id(app_id: &str) -> Result<()> {
    if app_id.trim().is_empty() {
        return Err(Error::InvalidPayload("app_id must not be empty".into()));
    }
    Ok(())
}

fn requested_id(query: CreateJobQuery) -> Result<Option<JobId>> {
    match query.job_id {
        Some(id) if id.trim().is_empty() => {
            Err(Error::InvalidPayload("job_id must not be empty".into()))
        }
        other => Ok(other.map(JobId::from)),
    }
}

fn accepted(job_id: JobId) -> (StatusCode, Json<JobAccepted>) {
    (StatusCode::ACCEPTED, Json(JobAccepted { job_id }))
}

/// POST /profiles/avatar - Fetch an author's avatar
#[utoipa::path(
    post,
    path = "/api/v1/profiles/avatar",
    tag = "profiles",
    params(CreateJobQuery),
    request_body = AvatarRequest,
    responses(
        (status = 202, description = "Job created", body = JobAccepted),
        (status = 409, description = "Job id already in use", body = crate::error::ApiError),
        (status = 422, description = "Invalid request body", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn fetch_avatar(
    State(state): State<AppState>,
    Query(query): Query<CreateJobQuery>,
    Json(request): Json<AvatarRequest>,
) -> Result<(StatusCode, Json<JobAccepted>)> {
    require_app_id(&request.app_id)?;
    let id = state
        .daemon
        .fetch_avatar(request, requested_id(query)?)
        .await?;
    Ok(accepted(id))
}

/// POST /profiles/me - Fetch the logged-in user's profile
#[utoipa::path(
    post,
    path = "/api/v1/profiles/me",
    tag = "profiles",
    params(CreateJobQuery),
    request_body = ProfileRequest,
    responses(
        (status = 202, description = "Job created", body = JobAccepted),
        (status = 409, description = "Job id already in use", body = crate::error::ApiError),
        (status = 422, description = "Invalid request body", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<CreateJobQuery>,
    Json(request): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<JobAccepted>)> {
    require_app_id(&request.app_id)?;
    if request.api_key.is_empty() {
        return Err(Error::InvalidPayload("api_key must not be empty".into()));
    }
    let id = state
        .daemon
        .get_profile(request, requested_id(query)?)
        .await?;
    Ok(accepted(id))
}

/// POST /search - Search and download result thumbnails
#[utoipa::path(
    post,
    path = "/api/v1/search",
    tag = "search",
    params(CreateJobQuery),
    request_body = SearchRequest,
    responses(
        (status = 202, description = "Job created", body = JobAccepted),
        (status = 409, description = "Job id already in use", body = crate::error::ApiError),
        (status = 422, description = "Invalid request body or client version", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<CreateJobQuery>,
    Json(request): Json<SearchRequest>,
) -> Result<(StatusCode, Json<JobAccepted>)> {
    require_app_id(&request.app_id)?;
    url::Url::parse(&request.urlquery).map_err(|e| {
        Error::InvalidPayload(format!("urlquery '{}' is not a URL: {}", request.urlquery, e))
    })?;
    let id = state.daemon.search(request, requested_id(query)?).await?;
    Ok(accepted(id))
}

/// POST /categories - Fetch the category tree
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    params(CreateJobQuery),
    request_body = CategoriesRequest,
    responses(
        (status = 202, description = "Job created", body = JobAccepted),
        (status = 409, description = "Job id already in use", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn update_categories(
    State(state): State<AppState>,
    Query(query): Query<CreateJobQuery>,
    Json(request): Json<CategoriesRequest>,
) -> Result<(StatusCode, Json<JobAccepted>)> {
    require_app_id(&request.app_id)?;
    let id = state
        .daemon
        .update_categories(request, requested_id(query)?)
        .await?;
    Ok(accepted(id))
}
