//! Outbound HTTP: client sessions, JSON API calls and file downloads.
//!
//! - [`file`] - streams one remote resource to a cache path
//! - [`batch`] - fans thumbnail downloads out as independent tasks

pub mod batch;
pub mod file;

pub use batch::{BatchReport, run_batch};
pub use file::fetch_file;

use crate::config::HttpConfig;
use crate::error::{Error, FetchError, Result};

/// The three HTTP sessions the daemon keeps open
///
/// Splitting them keeps thumbnail traffic from queuing behind API calls in the
/// same connection pool. Clones share the underlying pools.
#[derive(Clone, Debug)]
pub struct HttpSessions {
    /// JSON API calls (profile, search, categories)
    pub api: reqwest::Client,
    /// Small thumbnails and avatars
    pub small_thumbs: reqwest::Client,
    /// Full-size thumbnails
    pub big_thumbs: reqwest::Client,
}

impl HttpSessions {
    /// Build all sessions from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let build = |timeout| {
            reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(config.user_agent.as_str())
                .build()
                .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))
        };

        Ok(Self {
            api: build(config.api_timeout)?,
            small_thumbs: build(config.thumbnail_timeout)?,
            big_thumbs: build(config.thumbnail_timeout)?,
        })
    }
}

/// GET a JSON document, authenticating with `api_key` when one is given
///
/// Non-2xx responses become [`FetchError::Status`]; a body that is not JSON
/// becomes [`FetchError::Decode`].
pub async fn get_json(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
) -> std::result::Result<serde_json::Value, FetchError> {
    let mut request = client.get(url);
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        request = request.bearer_auth(key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(url = %url, status = status.as_u16(), "API request failed");
        return Err(FetchError::from_status(status));
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}
