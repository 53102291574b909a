//! Core types for asset-daemon

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a job
///
/// Either supplied by the caller or generated as a UUID v4 string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a fresh random JobId
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status
///
/// `Pending` is the only non-terminal state; a job never returns to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, handler still running
    Pending,
    /// Completed successfully, result attached
    Finished,
    /// Failed, message holds the cause
    Errored,
}

impl JobStatus {
    /// Whether the status is final
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    /// Lowercase name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Finished => "finished",
            JobStatus::Errored => "errored",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation a job performs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Download an author's avatar image
    FetchAvatar,
    /// Fetch the logged-in user's profile
    GetProfile,
    /// Run a search query and fetch its thumbnails
    Search,
    /// Download one thumbnail image (derived from a search)
    ThumbnailDownload,
    /// Fetch and aggregate the category tree
    CategoriesUpdate,
}

impl JobKind {
    /// Snake-case name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::FetchAvatar => "fetch_avatar",
            JobKind::GetProfile => "get_profile",
            JobKind::Search => "search",
            JobKind::ThumbnailDownload => "thumbnail_download",
            JobKind::CategoriesUpdate => "categories_update",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thumbnail size class
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailSize {
    /// Small square preview
    Small,
    /// Full preview (middle, or non-squared large for HDRs)
    Full,
}

/// Event emitted on job lifecycle transitions
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// Job appended to the registry
    Created {
        /// Job ID
        id: JobId,
        /// Owning client
        app_id: String,
        /// Operation
        kind: JobKind,
    },

    /// Job finished successfully
    Finished {
        /// Job ID
        id: JobId,
        /// Owning client
        app_id: String,
        /// Status message
        message: String,
    },

    /// Job failed
    Errored {
        /// Job ID
        id: JobId,
        /// Owning client
        app_id: String,
        /// Error message
        message: String,
    },

    /// Graceful shutdown initiated
    Shutdown,
}
