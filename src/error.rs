//! Error types for asset-daemon
//!
//! This module provides error handling for the daemon, including:
//! - The crate-wide [`Error`] type and its [`Result`] alias
//! - [`FetchError`], the narrower error returned by the HTTP fetch layer
//! - [`JobError`] for registry misuse (unknown id, double transition)
//! - HTTP status code mapping and JSON error bodies for the REST API

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for asset-daemon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for asset-daemon
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "server_url")
        key: Option<String>,
    },

    /// Job registry error
    #[error("job error: {0}")]
    Job(#[from] JobError),

    /// The request payload could not be turned into a job
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The upstream server answered with a body of an unexpected shape
    #[error("{0}")]
    UnexpectedResponse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new jobs")]
    ShuttingDown,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Job registry errors
#[derive(Debug, Error)]
pub enum JobError {
    /// No job with this id is registered
    #[error("job {id} not found")]
    NotFound {
        /// The job ID that was not found
        id: String,
    },

    /// A job with this id is already registered
    #[error("job {id} already exists")]
    DuplicateId {
        /// The conflicting job ID
        id: String,
    },

    /// The job already reached a terminal state
    #[error("job {id} is already {status}")]
    AlreadyTerminal {
        /// The job ID
        id: String,
        /// The terminal status the job is in ("finished" or "errored")
        status: String,
    },
}

/// Errors produced while fetching a remote resource
///
/// Display strings are what ends up in a job's message, so the HTTP variant
/// keeps the server's reason and the numeric status side by side.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status
    #[error("{reason} ({status})")]
    Status {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase or server message
        reason: String,
    },

    /// Connection, timeout or body-read failure
    #[error("{kind} error: {message}")]
    Transport {
        /// Failure category ("connect", "timeout", "body", "request")
        kind: &'static str,
        /// Underlying error message
        message: String,
    },

    /// The response body was not the JSON we expected
    #[error("decode error: {0}")]
    Decode(String),

    /// The URL could not be parsed or joined
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL (or URL fragment)
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Writing the destination file failed
    #[error("failed to write {path}: {source}")]
    Io {
        /// The file being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// HTTP status code, if the failure came from a server response
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build a status error from a response status
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        FetchError::Status {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        }
    }

    /// Classify a reqwest error into a transport category
    pub(crate) fn from_reqwest(e: &reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return FetchError::from_status(status);
        }
        let kind = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connect"
        } else if e.is_body() {
            "body"
        } else if e.is_decode() {
            return FetchError::Decode(e.to_string());
        } else {
            "request"
        };
        FetchError::Transport {
            kind,
            message: e.to_string(),
        }
    }
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "job_not_found",
///     "message": "job error: job 5a0c… not found",
///     "details": { "job_id": "5a0c…" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "job_not_found", "invalid_payload")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::InvalidPayload(_) => 422,

            Error::Job(JobError::NotFound { .. }) => 404,

            Error::Job(JobError::DuplicateId { .. }) => 409,
            Error::Job(JobError::AlreadyTerminal { .. }) => 409,

            Error::UnexpectedResponse(_) => 502,

            Error::ShuttingDown => 503,

            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Job(e) => match e {
                JobError::NotFound { .. } => "job_not_found",
                JobError::DuplicateId { .. } => "duplicate_job",
                JobError::AlreadyTerminal { .. } => "job_already_terminal",
            },
            Error::InvalidPayload(_) => "invalid_payload",
            Error::UnexpectedResponse(_) => "unexpected_response",
            Error::Io(_) => "io_error",
            Error::ShuttingDown => "shutting_down",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Job(JobError::NotFound { id }) | Error::Job(JobError::DuplicateId { id }) => {
                Some(serde_json::json!({ "job_id": id }))
            }
            Error::Job(JobError::AlreadyTerminal { id, status }) => Some(serde_json::json!({
                "job_id": id,
                "status": status,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
