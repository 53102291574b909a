//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`requests`] - Job-creating requests (avatar, profile, search, categories)
//! - [`jobs`] - Job polling and draining
//! - [`system`] - Health, events, OpenAPI

use crate::types::JobId;
use serde::{Deserialize, Serialize};

mod jobs;
mod requests;
mod system;

pub use jobs::*;
pub use requests::*;
pub use system::*;

// ============================================================================
// Query/Response Types (shared across handlers)
// ============================================================================

/// Query parameters of the job-creating requests
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreateJobQuery {
    /// Caller-chosen job id; a UUID is generated when absent
    pub job_id: Option<String>,
}

/// Query parameters for GET and DELETE /jobs
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobsQuery {
    /// Only jobs of this client
    pub app_id: Option<String>,
}

/// Response body of an accepted request
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct JobAccepted {
    /// Id of the created job
    pub job_id: JobId,
}
