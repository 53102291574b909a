//! End-to-end flow through the public API: a search request posted to the
//! REST router runs against a mock asset server, spawns thumbnail jobs and
//! leaves the cache populated.

use asset_daemon::api::create_router;
use asset_daemon::{Config, Daemon, JobId, JobKind, JobStatus};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn daemon_for(server: &MockServer) -> (Arc<Daemon>, tempfile::TempDir) {
    let temp = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.server_url = server.uri();
    config.cache.temp_dir = temp.path().to_path_buf();
    config.http.api_timeout = Duration::from_secs(5);
    config.http.thumbnail_timeout = Duration::from_secs(5);
    (Arc::new(Daemon::new(config).unwrap()), temp)
}

async fn call(daemon: &Arc<Daemon>, request: Request<Body>) -> (StatusCode, Value) {
    let router = create_router(Arc::clone(daemon), daemon.get_config());
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn mount_thumbnail(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/thumbs/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_request_populates_thumbnail_cache() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{
                "assetBaseId": "chair",
                "assetType": "model",
                "webpGeneratedTimestamp": 1_700_000_000,
                "thumbnailSmallUrl": format!("{base}/thumbs/chair_small.jpg"),
                "thumbnailSmallUrlWebp": format!("{base}/thumbs/chair_small.webp"),
                "thumbnailMiddleUrl": format!("{base}/thumbs/chair_middle.jpg"),
                "thumbnailMiddleUrlWebp": format!("{base}/thumbs/chair_middle.webp"),
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_thumbnail(&server, "chair_small.webp").await;
    mount_thumbnail(&server, "chair_middle.webp").await;

    let (daemon, temp) = daemon_for(&server);
    let thumbs = temp.path().join("thumbs");

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/search?job_id=search-1")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "urlquery": format!("{base}/api/v1/search/?query=chair"),
                "blender_version": "4.2.1",
                "tempdir": thumbs,
                "app_id": "addon-1"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body) = call(&daemon, request).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["job_id"], "search-1");

    daemon.wait_idle().await;

    let search = daemon
        .registry()
        .get(&JobId::from("search-1"))
        .await
        .unwrap();
    assert_eq!(search.status, JobStatus::Finished);

    let jobs = daemon.registry().list_for_app("addon-1").await;
    let thumbnails: Vec<_> = jobs
        .iter()
        .filter(|j| j.kind == JobKind::ThumbnailDownload)
        .collect();
    assert_eq!(thumbnails.len(), 2);
    assert!(thumbnails.iter().all(|j| j.status == JobStatus::Finished));

    assert_eq!(
        std::fs::read(thumbs.join("chair_small.webp")).unwrap(),
        b"chair_small.webp"
    );
    assert_eq!(
        std::fs::read(thumbs.join("chair_middle.webp")).unwrap(),
        b"chair_middle.webp"
    );

    // Polling the finished thumbnail through the API
    let thumb_id = thumbnails[0].id.to_string();
    let (status, job) = call(
        &daemon,
        Request::builder()
            .uri(format!("/api/v1/jobs/{thumb_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "finished");
    assert_eq!(job["result"]["assetBaseId"], "chair");
}

#[tokio::test]
async fn repeated_search_reuses_cached_thumbnails() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "assetBaseId": "lamp",
                "assetType": "model",
                "thumbnailSmallUrl": format!("{base}/thumbs/lamp_small.jpg"),
            }]
        })))
        .expect(2)
        .mount(&server)
        .await;
    // Only the first search may hit the thumbnail
    mount_thumbnail(&server, "lamp_small.jpg").await;

    let (daemon, temp) = daemon_for(&server);
    let thumbs = temp.path().join("thumbs");
    let request = || asset_daemon::SearchRequest {
        urlquery: format!("{base}/api/v1/search/?query=lamp"),
        api_key: None,
        blender_version: "4.2.1".parse().unwrap(),
        tempdir: thumbs.clone(),
        app_id: "addon-1".into(),
    };

    daemon.search(request(), None).await.unwrap();
    daemon.wait_idle().await;
    daemon.search(request(), None).await.unwrap();
    daemon.wait_idle().await;

    let messages: Vec<String> = daemon
        .registry()
        .list_for_app("addon-1")
        .await
        .into_iter()
        .filter(|j| j.kind == JobKind::ThumbnailDownload)
        .map(|j| j.message)
        .collect();
    assert_eq!(messages, vec!["thumbnail downloaded", "thumbnail on disk"]);

    daemon.shutdown().await.unwrap();
    assert!(!daemon.is_accepting());
}
