//! Jobs: trackable units of asynchronous work.
//!
//! A [`Job`] is created synchronously when a request is accepted, appended to
//! the [`JobRegistry`] right away so pollers see it as `pending`, and moved to
//! a terminal state exactly once by the handler that owns it.

mod registry;

pub use registry::JobRegistry;

use crate::error::JobError;
use crate::thumbnails::ClientVersion;
use crate::types::{JobId, JobKind, JobStatus, ThumbnailSize};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Input of a fetch-avatar job
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AvatarRequest {
    /// Author id, used as the cache file name
    pub id: String,
    /// Server-relative URL of the 128px avatar
    #[serde(default)]
    pub avatar128: Option<String>,
    /// Legacy gravatar hash, used when `avatar128` is absent
    #[serde(default, rename = "gravatarHash")]
    pub gravatar_hash: Option<String>,
    /// Requesting client
    pub app_id: String,
}

/// Input of a get-profile job
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileRequest {
    /// API key of the logged-in user
    pub api_key: String,
    /// Requesting client
    pub app_id: String,
}

/// Input of a search job
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Complete search URL including the query string
    pub urlquery: String,
    /// API key; anonymous search when absent
    #[serde(default)]
    pub api_key: Option<String>,
    /// Client version as a dotted triple, e.g. "3.5.0"
    #[schema(value_type = String)]
    pub blender_version: ClientVersion,
    /// Directory where thumbnails are cached
    #[schema(value_type = String)]
    pub tempdir: PathBuf,
    /// Requesting client
    pub app_id: String,
}

/// Input of a categories-update job
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoriesRequest {
    /// API key; anonymous request when absent
    #[serde(default)]
    pub api_key: Option<String>,
    /// Requesting client
    pub app_id: String,
}

/// Input of a thumbnail-download job, built by the thumbnail resolver
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailDownload {
    /// Source URL of the image
    pub image_url: String,
    /// Cache path the image is written to
    pub image_path: PathBuf,
    /// Asset the thumbnail belongs to
    #[serde(rename = "assetBaseId")]
    pub asset_base_id: String,
    /// Size class
    pub thumbnail_type: ThumbnailSize,
    /// Position of the search result in the response
    pub index: usize,
}

/// Typed job input, one variant per [`JobKind`]
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobPayload {
    /// See [`AvatarRequest`]
    FetchAvatar(AvatarRequest),
    /// See [`ProfileRequest`]
    GetProfile(ProfileRequest),
    /// See [`SearchRequest`]
    Search(SearchRequest),
    /// See [`ThumbnailDownload`]
    ThumbnailDownload(ThumbnailDownload),
    /// See [`CategoriesRequest`]
    CategoriesUpdate(CategoriesRequest),
}

impl JobPayload {
    /// The operation this payload belongs to
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::FetchAvatar(_) => JobKind::FetchAvatar,
            JobPayload::GetProfile(_) => JobKind::GetProfile,
            JobPayload::Search(_) => JobKind::Search,
            JobPayload::ThumbnailDownload(_) => JobKind::ThumbnailDownload,
            JobPayload::CategoriesUpdate(_) => JobKind::CategoriesUpdate,
        }
    }
}

/// A single trackable unit of work
///
/// The payload is never serialized: it may hold the caller's API key.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Job {
    /// Unique job identifier
    pub id: JobId,
    /// Client process that requested the job
    pub app_id: String,
    /// Operation
    pub kind: JobKind,
    /// Typed input, read-only for the handler
    #[serde(skip)]
    pub payload: JobPayload,
    /// Current status
    pub status: JobStatus,
    /// Annotation of the latest transition
    pub message: String,
    /// Output, present only once finished
    #[schema(value_type = Option<Object>)]
    pub result: Option<serde_json::Value>,
    /// When the job was accepted
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    /// Last transition time
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a pending job; `id` defaults to a fresh UUID
    pub fn new(
        payload: JobPayload,
        app_id: impl Into<String>,
        id: Option<JobId>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.unwrap_or_else(JobId::generate),
            app_id: app_id.into(),
            kind: payload.kind(),
            payload,
            status: JobStatus::Pending,
            message: message.into(),
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the job reached `finished` or `errored`
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn finish(
        &mut self,
        result: serde_json::Value,
        message: impl Into<String>,
    ) -> Result<(), JobError> {
        self.ensure_pending()?;
        self.status = JobStatus::Finished;
        self.result = Some(result);
        self.message = message.into();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) -> Result<(), JobError> {
        self.ensure_pending()?;
        self.status = JobStatus::Errored;
        self.message = message.into();
        self.updated_at = Utc::now();
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), JobError> {
        if self.is_terminal() {
            return Err(JobError::AlreadyTerminal {
                id: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }
}
