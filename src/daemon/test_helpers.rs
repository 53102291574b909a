//! Shared test helpers for creating Daemon instances in tests.

use crate::config::Config;
use crate::daemon::Daemon;
use std::time::Duration;
use tempfile::tempdir;

/// Create a daemon talking to `server_url` with its cache in a temp dir.
/// Returns the daemon and the tempdir (which must be kept alive).
pub(crate) fn create_test_daemon(server_url: &str) -> (Daemon, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.server_url = server_url.to_string();
    config.cache.temp_dir = temp_dir.path().to_path_buf();
    config.http.api_timeout = Duration::from_secs(5);
    config.http.thumbnail_timeout = Duration::from_secs(5);

    (Daemon::new(config).unwrap(), temp_dir)
}

/// A search result offering every thumbnail variant under `base`
pub(crate) fn search_result(base: &str, asset: &str, asset_type: &str) -> serde_json::Value {
    serde_json::json!({
        "assetBaseId": asset,
        "assetType": asset_type,
        "webpGeneratedTimestamp": 1_700_000_000,
        "thumbnailSmallUrl": format!("{base}/thumbs/{asset}_small.jpg"),
        "thumbnailSmallUrlWebp": format!("{base}/thumbs/{asset}_small.webp"),
        "thumbnailMiddleUrl": format!("{base}/thumbs/{asset}_middle.jpg"),
        "thumbnailMiddleUrlWebp": format!("{base}/thumbs/{asset}_middle.webp"),
        "thumbnailLargeUrlNonsquared": format!("{base}/thumbs/{asset}_large.jpg"),
        "thumbnailLargeUrlNonsquaredWebp": format!("{base}/thumbs/{asset}_large.webp"),
    })
}
