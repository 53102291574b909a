//! Thumbnail variant resolution for search results.
//!
//! Each search result offers several renderings of its preview image. For
//! every result this module picks one small and one full variant, derives the
//! cache path from the image URL, and turns each into a thumbnail job. Images
//! already present in the cache finish immediately without a download.

use crate::error::{Error, Result};
use crate::jobs::{Job, JobPayload, JobRegistry, ThumbnailDownload};
use crate::types::ThumbnailSize;
use crate::utils::filename_from_url;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// First client version that handles WebP thumbnails well
pub const WEBP_MIN_VERSION: ClientVersion = ClientVersion {
    major: 3,
    minor: 4,
    patch: 0,
};

/// Asset type whose full preview uses the non-squared large image
const HDR_ASSET_TYPE: &str = "hdr";

/// Client (editor) version as a comparable triple
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch version
    pub patch: u32,
}

impl ClientVersion {
    /// Create a version triple
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::str::FromStr for ClientVersion {
    type Err = Error;

    /// Parse "major.minor.patch"; components past the third are ignored
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('.').map(|p| p.parse::<u32>());
        let mut next = || match parts.next() {
            Some(Ok(n)) => Ok(n),
            _ => Err(Error::InvalidPayload(format!(
                "client version '{s}' is not a dotted triple"
            ))),
        };
        Ok(Self::new(next()?, next()?, next()?))
    }
}

impl TryFrom<String> for ClientVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClientVersion> for String {
    fn from(version: ClientVersion) -> Self {
        version.to_string()
    }
}

impl std::fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The thumbnail-related fields of one search result
///
/// Every URL field may be missing or null on the server record.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Asset identifier
    #[serde(default)]
    pub asset_base_id: String,
    /// Asset type ("model", "material", "hdr", …)
    #[serde(default)]
    pub asset_type: String,
    /// Set once the server generated WebP renderings
    #[serde(default)]
    pub webp_generated_timestamp: Option<serde_json::Value>,
    /// Legacy small image
    #[serde(default)]
    pub thumbnail_small_url: Option<String>,
    /// WebP small image
    #[serde(default)]
    pub thumbnail_small_url_webp: Option<String>,
    /// Legacy middle image
    #[serde(default)]
    pub thumbnail_middle_url: Option<String>,
    /// WebP middle image
    #[serde(default)]
    pub thumbnail_middle_url_webp: Option<String>,
    /// Legacy non-squared large image (HDR previews)
    #[serde(default)]
    pub thumbnail_large_url_nonsquared: Option<String>,
    /// WebP non-squared large image (HDR previews)
    #[serde(default)]
    pub thumbnail_large_url_nonsquared_webp: Option<String>,
}

/// Chosen small and full URLs of one result
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThumbnailVariants {
    /// Small preview URL, if the server offers one
    pub small: Option<String>,
    /// Full preview URL, if the server offers one
    pub full: Option<String>,
}

/// Whether WebP renderings may be used for this result
pub fn uses_webp(result: &SearchResult, version: ClientVersion) -> bool {
    version >= WEBP_MIN_VERSION && result.webp_generated_timestamp.is_some()
}

/// Pick the small and full URL for a result
pub fn select_variants(result: &SearchResult, version: ClientVersion) -> ThumbnailVariants {
    let webp = uses_webp(result, version);
    let pick = |webp_url: &Option<String>, legacy_url: &Option<String>| {
        if webp {
            webp_url.clone()
        } else {
            legacy_url.clone()
        }
    };

    let small = pick(&result.thumbnail_small_url_webp, &result.thumbnail_small_url);
    let full = if result.asset_type == HDR_ASSET_TYPE {
        pick(
            &result.thumbnail_large_url_nonsquared_webp,
            &result.thumbnail_large_url_nonsquared,
        )
    } else {
        pick(&result.thumbnail_middle_url_webp, &result.thumbnail_middle_url)
    };

    ThumbnailVariants { small, full }
}

/// Build the download descriptions for one result
///
/// Variants without a URL, or whose URL has no usable file name, are skipped.
pub fn candidates(
    index: usize,
    result: &SearchResult,
    version: ClientVersion,
    cache_dir: &Path,
) -> Vec<ThumbnailDownload> {
    let variants = select_variants(result, version);

    [
        (ThumbnailSize::Small, variants.small),
        (ThumbnailSize::Full, variants.full),
    ]
    .into_iter()
    .filter_map(|(size, url)| {
        let url = url?;
        let Some(name) = filename_from_url(&url) else {
            tracing::debug!(url = %url, index, "thumbnail URL has no file name, skipping");
            return None;
        };
        Some(ThumbnailDownload {
            image_path: cache_dir.join(name),
            image_url: url,
            asset_base_id: result.asset_base_id.clone(),
            thumbnail_type: size,
            index,
        })
    })
    .collect()
}

/// Thumbnail jobs that still need a download, split by size class
#[derive(Debug, Default)]
pub struct ThumbnailBatches {
    /// Small thumbnails, downloaded first
    pub small: Vec<Job>,
    /// Full thumbnails, downloaded after the small batch settled
    pub full: Vec<Job>,
}

impl ThumbnailBatches {
    /// Total number of jobs awaiting download
    pub fn len(&self) -> usize {
        self.small.len() + self.full.len()
    }

    /// Whether nothing needs downloading
    pub fn is_empty(&self) -> bool {
        self.small.is_empty() && self.full.is_empty()
    }
}

/// Create thumbnail jobs for every result of a search response
///
/// Every job is appended to the registry. Jobs whose cache file already
/// exists are finished on the spot; the rest are returned for download.
/// Results that do not deserialize are skipped with a warning.
pub async fn resolve_thumbnails(
    registry: &JobRegistry,
    app_id: &str,
    results: &[serde_json::Value],
    version: ClientVersion,
    cache_dir: &Path,
) -> Result<ThumbnailBatches> {
    let mut batches = ThumbnailBatches::default();

    for (index, raw) in results.iter().enumerate() {
        let result = match SearchResult::deserialize(raw) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed search result");
                continue;
            }
        };

        for download in candidates(index, &result, version, cache_dir) {
            let cached = tokio::fs::try_exists(&download.image_path)
                .await
                .unwrap_or(false);
            let size = download.thumbnail_type;
            let summary = serde_json::to_value(&download)?;

            let job = Job::new(
                JobPayload::ThumbnailDownload(download),
                app_id,
                None,
                "Waiting for download",
            );
            let id = registry.append(job.clone()).await?;

            if cached {
                registry.finish(&id, summary, "thumbnail on disk").await?;
                continue;
            }

            match size {
                ThumbnailSize::Small => batches.small.push(job),
                ThumbnailSize::Full => batches.full.push(job),
            }
        }
    }

    Ok(batches)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobStatus;
    use serde_json::json;
    use tempfile::TempDir;

    fn full_result(asset_type: &str, with_webp_timestamp: bool) -> serde_json::Value {
        let mut value = json!({
            "assetBaseId": "asset-1",
            "assetType": asset_type,
            "thumbnailSmallUrl": "https://cdn.test/t/small.jpg",
            "thumbnailSmallUrlWebp": "https://cdn.test/t/small.webp",
            "thumbnailMiddleUrl": "https://cdn.test/t/middle.jpg",
            "thumbnailMiddleUrlWebp": "https://cdn.test/t/middle.webp",
            "thumbnailLargeUrlNonsquared": "https://cdn.test/t/large_ns.jpg",
            "thumbnailLargeUrlNonsquaredWebp": "https://cdn.test/t/large_ns.webp",
        });
        if with_webp_timestamp {
            value["webpGeneratedTimestamp"] = json!(1_700_000_000);
        }
        value
    }

    fn parse(value: serde_json::Value) -> SearchResult {
        SearchResult::deserialize(&value).unwrap()
    }

    #[test]
    fn version_parses_and_orders() {
        let v: ClientVersion = "3.3.9".parse().unwrap();
        assert_eq!(v, ClientVersion::new(3, 3, 9));
        assert!(v < WEBP_MIN_VERSION);
        assert!("3.4.0".parse::<ClientVersion>().unwrap() >= WEBP_MIN_VERSION);
        assert!("4.0.0".parse::<ClientVersion>().unwrap() > WEBP_MIN_VERSION);
        assert_eq!(
            "4.2.1.7".parse::<ClientVersion>().unwrap(),
            ClientVersion::new(4, 2, 1)
        );
    }

    #[test]
    fn version_rejects_short_or_non_numeric() {
        assert!("3.4".parse::<ClientVersion>().is_err());
        assert!("3.x.0".parse::<ClientVersion>().is_err());
        assert!("".parse::<ClientVersion>().is_err());
    }

    #[test]
    fn old_client_gets_legacy_urls_even_with_webp_available() {
        let result = parse(full_result("model", true));
        let variants = select_variants(&result, "3.3.9".parse().unwrap());

        assert_eq!(variants.small.as_deref(), Some("https://cdn.test/t/small.jpg"));
        assert_eq!(variants.full.as_deref(), Some("https://cdn.test/t/middle.jpg"));
    }

    #[test]
    fn new_client_without_webp_timestamp_gets_legacy_urls() {
        let result = parse(full_result("model", false));
        let variants = select_variants(&result, "4.1.0".parse().unwrap());

        assert!(!uses_webp(&result, "4.1.0".parse().unwrap()));
        assert_eq!(variants.small.as_deref(), Some("https://cdn.test/t/small.jpg"));
    }

    #[test]
    fn null_webp_timestamp_counts_as_absent() {
        let mut value = full_result("model", false);
        value["webpGeneratedTimestamp"] = serde_json::Value::Null;
        assert!(!uses_webp(&parse(value), ClientVersion::new(4, 0, 0)));
    }

    #[test]
    fn hdr_full_variant_uses_nonsquared_webp() {
        let result = parse(full_result("hdr", true));
        let variants = select_variants(&result, "3.5.0".parse().unwrap());

        assert_eq!(variants.small.as_deref(), Some("https://cdn.test/t/small.webp"));
        assert_eq!(
            variants.full.as_deref(),
            Some("https://cdn.test/t/large_ns.webp")
        );
    }

    #[test]
    fn hdr_on_old_client_uses_nonsquared_legacy() {
        let result = parse(full_result("hdr", true));
        let variants = select_variants(&result, ClientVersion::new(2, 93, 0));
        assert_eq!(variants.full.as_deref(), Some("https://cdn.test/t/large_ns.jpg"));
    }

    #[test]
    fn missing_url_fields_skip_only_that_candidate() {
        let result = parse(json!({
            "assetBaseId": "a",
            "assetType": "model",
            "thumbnailSmallUrl": null,
            "thumbnailMiddleUrl": "https://cdn.test/m.jpg",
        }));

        let found = candidates(0, &result, ClientVersion::new(3, 0, 0), Path::new("/cache"));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].thumbnail_type, ThumbnailSize::Full);
        assert_eq!(found[0].image_path, Path::new("/cache/m.jpg"));
    }

    #[test]
    fn candidate_paths_come_from_url_file_names() {
        let result = parse(full_result("model", true));
        let found = candidates(3, &result, ClientVersion::new(4, 0, 0), Path::new("/c"));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].image_path, Path::new("/c/small.webp"));
        assert_eq!(found[1].image_path, Path::new("/c/middle.webp"));
        assert!(found.iter().all(|d| d.index == 3 && d.asset_base_id == "asset-1"));
    }

    #[tokio::test]
    async fn cached_thumbnail_finishes_immediately() {
        let cache = TempDir::new().unwrap();
        std::fs::write(cache.path().join("small.jpg"), b"img").unwrap();
        let registry = JobRegistry::new();

        let batches = resolve_thumbnails(
            &registry,
            "app",
            &[full_result("model", false)],
            ClientVersion::new(3, 0, 0),
            cache.path(),
        )
        .await
        .unwrap();

        assert!(batches.small.is_empty(), "cached small thumbnail needs no fetch");
        assert_eq!(batches.full.len(), 1);

        let jobs = registry.list_for_app("app").await;
        assert_eq!(jobs.len(), 2, "both candidates are registered");
        let small = jobs
            .iter()
            .find(|j| j.result.as_ref().is_some_and(|r| r["thumbnail_type"] == "small"))
            .expect("small job finished with a result");
        assert_eq!(small.status, JobStatus::Finished);
        assert_eq!(small.message, "thumbnail on disk");
        assert_eq!(jobs.iter().filter(|j| j.status == JobStatus::Pending).count(), 1);
    }

    #[tokio::test]
    async fn malformed_results_are_skipped() {
        let cache = TempDir::new().unwrap();
        let registry = JobRegistry::new();

        let batches = resolve_thumbnails(
            &registry,
            "app",
            &[json!("not an object"), full_result("model", false)],
            ClientVersion::new(3, 0, 0),
            cache.path(),
        )
        .await
        .unwrap();

        assert_eq!(batches.len(), 2);
        assert!(batches.full.iter().all(|j| matches!(
            &j.payload,
            JobPayload::ThumbnailDownload(d) if d.index == 1
        )));
    }
}
