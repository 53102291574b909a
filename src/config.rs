//! Configuration types for asset-daemon

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Sub-path of the temp directory holding cached avatars
pub const AVATAR_CACHE_SUBDIR: [&str; 2] = ["bkit_temp", "bkit_g"];

/// Main configuration for the daemon
///
/// Every field has a default, so an empty TOML file (or no file at all)
/// yields a working configuration.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Base URL of the asset server (default: "https://www.blenderkit.com")
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Local cache locations
    #[serde(default)]
    pub cache: CacheConfig,

    /// Outbound HTTP session settings
    #[serde(default)]
    pub http: HttpConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.server_url).map_err(|e| Error::Config {
            message: format!("invalid server URL '{}': {}", self.server_url, e),
            key: Some("server_url".to_string()),
        })?;

        if self.http.download_chunk_size == 0 {
            return Err(Error::Config {
                message: "download chunk size must be greater than zero".to_string(),
                key: Some("http.download_chunk_size".to_string()),
            });
        }

        Ok(())
    }

    /// Directory where avatars are cached
    pub fn avatar_cache_dir(&self) -> PathBuf {
        AVATAR_CACHE_SUBDIR
            .iter()
            .fold(self.cache.temp_dir.clone(), |dir, part| dir.join(part))
    }
}

/// Local cache configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheConfig {
    /// Root temp directory (default: the OS temp dir)
    #[serde(default = "default_temp_dir")]
    #[schema(value_type = String)]
    pub temp_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
        }
    }
}

/// Outbound HTTP configuration
///
/// Three client sessions are built from this: one for JSON API calls, one for
/// small thumbnails and avatars, one for full-size thumbnails.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HttpConfig {
    /// Request timeout for JSON API calls in seconds (default: 30)
    #[serde(default = "default_api_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub api_timeout: Duration,

    /// Request timeout for thumbnail and avatar downloads in seconds (default: 60)
    #[serde(default = "default_thumbnail_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub thumbnail_timeout: Duration,

    /// User-Agent header sent on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Write buffer size for streamed downloads in bytes (default: 131072)
    #[serde(default = "default_chunk_size")]
    pub download_chunk_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_timeout: default_api_timeout(),
            thumbnail_timeout: default_thumbnail_timeout(),
            user_agent: default_user_agent(),
            download_chunk_size: default_chunk_size(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:62485)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_server_url() -> String {
    "https://www.blenderkit.com".to_string()
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_thumbnail_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    format!("asset-daemon/{}", env!("CARGO_PKG_VERSION"))
}

fn default_chunk_size() -> usize {
    4096 * 32
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 62485))
}

fn default_true() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
