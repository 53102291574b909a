//! Job handlers, one per request kind.
//!
//! Each handler records its own outcome. Only unexpected errors (registry
//! misuse, serialization) are returned to the supervisor.

use super::supervisor::JobContext;
use crate::categories;
use crate::error::{Error, FetchError, Result};
use crate::fetch::{fetch_file, get_json, run_batch};
use crate::jobs::{AvatarRequest, CategoriesRequest, JobPayload, ProfileRequest, SearchRequest};
use crate::profile;
use crate::thumbnails::resolve_thumbnails;
use crate::utils::{api_url, join_server_url};
use serde_json::json;
use std::path::PathBuf;

/// Legacy avatar service, addressed by email hash
pub(crate) const GRAVATAR_BASE_URL: &str = "https://www.gravatar.com/avatar/";

const PROFILE_PATH: &str = "/api/v1/me/";
const CATEGORIES_PATH: &str = "/api/v1/categories/";

/// Job message for a failed API call: HTTP errors read "{operation} failed:
/// Not Found (404)", everything else "{operation} connect error: ..."
pub(crate) fn failure_message(operation: &str, e: &FetchError) -> String {
    match e {
        FetchError::Status { .. } => format!("{} failed: {}", operation, e),
        other => format!("{} {}", operation, other),
    }
}

fn wrong_payload(ctx: &JobContext) -> Error {
    Error::InvalidPayload(format!("{} handler got a {} payload", ctx.job.kind, ctx.job.payload.kind()))
}

/// Download an author's avatar into the avatar cache
pub(crate) async fn fetch_avatar(ctx: JobContext) -> Result<()> {
    let JobPayload::FetchAvatar(request) = &ctx.job.payload else {
        return Err(wrong_payload(&ctx));
    };
    let config = &ctx.daemon.config;

    let Some((url, path)) = avatar_source(request, &config.server_url, config.avatar_cache_dir())
    else {
        return ctx.fail("no avatar source").await;
    };
    let url = match url {
        Ok(url) => url,
        Err(e) => return ctx.fail(format!("Gravatar download failed - {}", e)).await,
    };

    let result = json!({ "gravatar_path": path });
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return ctx.finish(result, "Found on disk").await;
    }

    let client = &ctx.daemon.sessions.small_thumbs;
    match fetch_file(client, &url, &path, config.http.download_chunk_size).await {
        Ok(_) => ctx.finish(result, "Downloaded").await,
        Err(e) => ctx.fail(format!("Gravatar download failed - {}", e)).await,
    }
}

/// Pick the avatar URL and its cache path
///
/// The server-hosted `avatar128` wins; the gravatar hash is the fallback.
/// `None` when the request names neither.
fn avatar_source(
    request: &AvatarRequest,
    server_url: &str,
    cache_dir: PathBuf,
) -> Option<(std::result::Result<String, FetchError>, PathBuf)> {
    if let Some(relative) = request.avatar128.as_deref() {
        let path = cache_dir.join(format!("{}.jpg", request.id));
        return Some((join_server_url(server_url, relative), path));
    }

    let hash = request.gravatar_hash.as_deref()?;
    let path = cache_dir.join(format!("{}.jpg", hash));
    Some((Ok(format!("{}{}?d=404", GRAVATAR_BASE_URL, hash)), path))
}

/// Fetch and normalize the logged-in user's profile
pub(crate) async fn get_profile(ctx: JobContext) -> Result<()> {
    let JobPayload::GetProfile(ProfileRequest { api_key, .. }) = &ctx.job.payload else {
        return Err(wrong_payload(&ctx));
    };

    let body = match api_get(&ctx, PROFILE_PATH, Some(api_key)).await {
        Ok(body) => body,
        Err(e) => return ctx.fail(failure_message("Get profile", &e)).await,
    };

    match profile::normalize(body) {
        Ok(profile) => ctx.finish(profile, "data successfully fetched").await,
        Err(e) => ctx.fail(e.to_string()).await,
    }
}

/// Run a search, then download its thumbnails
///
/// The search job is finished as soon as the server answers. Thumbnails
/// follow in two awaited batches, small first, so when this returns every
/// derived thumbnail job is terminal.
pub(crate) async fn search(ctx: JobContext) -> Result<()> {
    let JobPayload::Search(request) = &ctx.job.payload else {
        return Err(wrong_payload(&ctx));
    };
    let SearchRequest {
        urlquery,
        api_key,
        blender_version,
        tempdir,
        ..
    } = request;
    let daemon = &ctx.daemon;

    let body = match get_json(&daemon.sessions.api, urlquery, api_key.as_deref()).await {
        Ok(body) => body,
        Err(e) => return ctx.fail(failure_message("Search", &e)).await,
    };

    let results = match body.get("results").and_then(serde_json::Value::as_array) {
        Some(results) => results.clone(),
        None => {
            tracing::warn!(job_id = %ctx.job.id, "search response has no results list");
            Vec::new()
        }
    };
    ctx.finish(body, "Search results downloaded").await?;

    let batches = resolve_thumbnails(
        &daemon.registry,
        &ctx.job.app_id,
        &results,
        *blender_version,
        tempdir,
    )
    .await?;

    let chunk_size = daemon.config.http.download_chunk_size;
    let small = run_batch(
        &daemon.registry,
        &daemon.sessions.small_thumbs,
        batches.small,
        true,
        chunk_size,
        &daemon.tracker,
    )
    .await;
    let full = run_batch(
        &daemon.registry,
        &daemon.sessions.big_thumbs,
        batches.full,
        true,
        chunk_size,
        &daemon.tracker,
    )
    .await;

    tracing::info!(
        job_id = %ctx.job.id,
        results = results.len(),
        downloaded = small.succeeded + full.succeeded,
        failed = small.failed + full.failed,
        "search thumbnails settled"
    );
    Ok(())
}

/// Fetch the category tree and fold subtree counts into it
pub(crate) async fn update_categories(ctx: JobContext) -> Result<()> {
    let JobPayload::CategoriesUpdate(CategoriesRequest { api_key, .. }) = &ctx.job.payload else {
        return Err(wrong_payload(&ctx));
    };

    let body = match api_get(&ctx, CATEGORIES_PATH, api_key.as_deref()).await {
        Ok(body) => body,
        Err(e) => return ctx.fail(failure_message("Fetching categories", &e)).await,
    };

    let tree = match categories::parse_response(body) {
        Ok(tree) => categories::aggregate(&tree),
        Err(e) => return ctx.fail(format!("Fetching categories failed: {}", e)).await,
    };

    ctx.finish(serde_json::to_value(&tree)?, "Categories fetched")
        .await
}

/// GET an API path under the server base URL on the API session
async fn api_get(
    ctx: &JobContext,
    path: &str,
    api_key: Option<&str>,
) -> std::result::Result<serde_json::Value, FetchError> {
    let daemon = &ctx.daemon;
    let url = api_url(&daemon.config.server_url, path)?;
    get_json(&daemon.sessions.api, &url, api_key).await
}
