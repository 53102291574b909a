//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the asset-daemon REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the asset-daemon REST API
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "asset-daemon REST API",
        version = "0.1.0",
        description = "Background jobs for an asset add-on: avatars, profiles, searches with thumbnails and categories",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:62485", description = "Local daemon")
    ),
    paths(
        // Requests
        crate::api::routes::fetch_avatar,
        crate::api::routes::get_profile,
        crate::api::routes::search,
        crate::api::routes::update_categories,

        // Jobs
        crate::api::routes::list_jobs,
        crate::api::routes::get_job,
        crate::api::routes::drain_jobs,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::JobKind,
        crate::types::ThumbnailSize,
        crate::types::JobEvent,

        // Jobs and request bodies
        crate::jobs::Job,
        crate::jobs::AvatarRequest,
        crate::jobs::ProfileRequest,
        crate::jobs::SearchRequest,
        crate::jobs::CategoriesRequest,

        // Config types from config.rs
        crate::config::Config,
        crate::config::CacheConfig,
        crate::config::HttpConfig,
        crate::config::ApiConfig,

        // API request/response types from routes
        crate::api::routes::CreateJobQuery,
        crate::api::routes::JobsQuery,
        crate::api::routes::JobAccepted,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "profiles", description = "Avatars and the logged-in user's profile"),
        (name = "search", description = "Asset search with thumbnail download"),
        (name = "categories", description = "Category tree with subtree asset counts"),
        (name = "jobs", description = "Job polling - status, results and draining of finished jobs"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_route() {
        let spec = ApiDoc::openapi();

        for path in [
            "/api/v1/profiles/avatar",
            "/api/v1/profiles/me",
            "/api/v1/search",
            "/api/v1/categories",
            "/api/v1/jobs",
            "/api/v1/jobs/{id}",
            "/api/v1/health",
            "/api/v1/openapi.json",
            "/api/v1/events",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn spec_has_job_schemas() {
        let components = ApiDoc::openapi().components.unwrap();

        for schema in ["Job", "JobStatus", "SearchRequest", "ApiError"] {
            assert!(
                components.schemas.contains_key(schema),
                "missing schema {schema}"
            );
        }
    }

    #[test]
    fn spec_has_tags() {
        let tags = ApiDoc::openapi().tags.unwrap();
        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();

        assert!(tag_names.contains(&"jobs"));
        assert!(tag_names.contains(&"system"));
    }

    #[test]
    fn job_schema_does_not_expose_payload() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let job = &json["components"]["schemas"]["Job"]["properties"];

        assert!(job.get("status").is_some());
        assert!(job.get("payload").is_none());
    }
}
