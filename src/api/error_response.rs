//! HTTP error response handling for the API
//!
//! Conversions from domain errors to HTTP responses with status codes and
//! JSON error bodies.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let api_error: ApiError = self.into();
        (status_code, Json(api_error)).into_response()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn missing_job_becomes_404_with_id() {
        let response = Error::Job(JobError::NotFound { id: "j1".into() }).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "job_not_found");
        assert_eq!(api_error.error.details.unwrap()["job_id"], "j1");
    }

    #[tokio::test]
    async fn shutting_down_becomes_503() {
        let response = Error::ShuttingDown.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_of(response).await.error.code, "shutting_down");
    }

    #[tokio::test]
    async fn duplicate_job_becomes_409() {
        let response = Error::Job(JobError::DuplicateId { id: "x".into() }).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
