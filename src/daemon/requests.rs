//! Accepting requests.
//!
//! Every method creates the job, makes it visible as pending and returns its
//! id without waiting for the handler.

use super::{Daemon, handlers};
use crate::error::Result;
use crate::jobs::{
    AvatarRequest, CategoriesRequest, Job, JobPayload, ProfileRequest, SearchRequest,
};
use crate::types::JobId;

impl Daemon {
    /// Start downloading an author's avatar
    ///
    /// The job result is `{"gravatar_path": ...}`.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::ShuttingDown`] once shutdown started, or
    /// when `id` is already registered.
    pub async fn fetch_avatar(&self, request: AvatarRequest, id: Option<JobId>) -> Result<JobId> {
        let app_id = request.app_id.clone();
        let job = Job::new(
            JobPayload::FetchAvatar(request),
            app_id,
            id,
            "Fetching gravatar image",
        );
        self.spawn_job(job, handlers::fetch_avatar).await
    }

    /// Start fetching the logged-in user's profile
    pub async fn get_profile(&self, request: ProfileRequest, id: Option<JobId>) -> Result<JobId> {
        let app_id = request.app_id.clone();
        let job = Job::new(
            JobPayload::GetProfile(request),
            app_id,
            id,
            "Getting user profile",
        );
        self.spawn_job(job, handlers::get_profile).await
    }

    /// Start a search
    ///
    /// Thumbnail jobs for the results are created by the search handler
    /// under the same app id.
    pub async fn search(&self, request: SearchRequest, id: Option<JobId>) -> Result<JobId> {
        let app_id = request.app_id.clone();
        let job = Job::new(JobPayload::Search(request), app_id, id, "Searching");
        self.spawn_job(job, handlers::search).await
    }

    /// Start fetching the category tree
    pub async fn update_categories(
        &self,
        request: CategoriesRequest,
        id: Option<JobId>,
    ) -> Result<JobId> {
        let app_id = request.app_id.clone();
        let job = Job::new(
            JobPayload::CategoriesUpdate(request),
            app_id,
            id,
            "Getting updated categories",
        );
        self.spawn_job(job, handlers::update_categories).await
    }
}
