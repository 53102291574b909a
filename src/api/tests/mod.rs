use super::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;


/// Helper to create a test Daemon wrapped in Arc
fn create_test_daemon(server_url: &str) -> (Arc<Daemon>, tempfile::TempDir) {
    let (daemon, temp_dir) = crate::daemon::test_helpers::create_test_daemon(server_url);
    (Arc::new(daemon), temp_dir)
}

fn router_for(daemon: &Arc<Daemon>) -> Router {
    create_router(daemon.clone(), daemon.get_config())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (daemon, _temp_dir) = create_test_daemon("http://127.0.0.1:9");

    let mut config = (*daemon.get_config()).clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let daemon = daemon.clone();
        let config = config.clone();
        async move { start_api_server(daemon, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");
    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (daemon, _temp_dir) = create_test_daemon("http://127.0.0.1:9");

    let mut config = (*daemon.get_config()).clone();
    config.api.cors_enabled = true;
    config.api.cors_origins = vec!["*".to_string()];
    let app = create_router(daemon, Arc::new(config));

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (daemon, _temp_dir) = create_test_daemon("http://127.0.0.1:9");

    let mut config = (*daemon.get_config()).clone();
    config.api.cors_enabled = false;
    let app = create_router(daemon, Arc::new(config));

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_swagger_ui_can_be_disabled() {
    let (daemon, _temp_dir) = create_test_daemon("http://127.0.0.1:9");

    let mut config = (*daemon.get_config()).clone();
    config.api.swagger_ui = false;
    let app = create_router(daemon, Arc::new(config));

    let (status, _) = send(app, get("/swagger-ui/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
