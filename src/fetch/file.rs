//! Streaming download of a single remote file.

use crate::error::FetchError;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Stream `url` into `destination`
///
/// The body is written chunk by chunk through a buffer of `buffer_size`
/// bytes into a sibling `.part` file, which is renamed onto `destination`
/// once complete. A file under the final name is therefore always whole, and
/// concurrent writers of the same destination each use their own part file.
/// Missing parent directories are created.
pub async fn fetch_file(
    client: &reqwest::Client,
    url: &str,
    destination: &Path,
    buffer_size: usize,
) -> Result<u64, FetchError> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(url = %url, status = status.as_u16(), "download refused by server");
        return Err(FetchError::from_status(status));
    }

    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let partial = partial_path(destination);
    let written = match write_body(&mut response, &partial, buffer_size).await {
        Ok(written) => written,
        Err(e) => {
            // Best effort, the error we report is the write/read failure
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                tracing::debug!(path = %partial.display(), error = %cleanup, "could not remove part file");
            }
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, destination)
        .await
        .map_err(|source| FetchError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

    tracing::debug!(url = %url, path = %destination.display(), bytes = written, "file downloaded");
    Ok(written)
}

async fn write_body(
    response: &mut reqwest::Response,
    path: &Path,
    buffer_size: usize,
) -> Result<u64, FetchError> {
    let io_error = |source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::create(path).await.map_err(io_error)?;
    let mut writer = BufWriter::with_capacity(buffer_size, file);
    let mut written = 0u64;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?
    {
        writer.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len() as u64;
    }

    writer.flush().await.map_err(io_error)?;
    Ok(written)
}

/// Hidden, writer-unique sibling of `destination`
fn partial_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    destination.with_file_name(format!(".{}.{}.part", name, uuid::Uuid::new_v4().simple()))
}
