//! Asset Store: filename-addressed image persistence
//!
//! Assets are deduplicated purely by derived filename: if the target path
//! already exists the store returns it without touching the network. Two
//! different source URLs that sanitize to the same name will share one file,
//! first write wins; that collision is accepted behavior.
//!
//! Download failures (network errors, non-200 responses, timeouts) resolve
//! to `Ok(None)` rather than an error, so one missing icon never aborts the
//! entity fetch that requested it.

use crate::store::paths;
use crate::Result;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Filesystem-backed store for downloaded image assets
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
    client: Client,
    timeout: Duration,
}

impl AssetStore {
    /// Opens the store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>, client: Client, timeout: Duration) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            client,
            timeout,
        })
    }

    /// Returns the directory holding the assets
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Derived path of an asset, whether or not it exists yet
    pub fn path_for(&self, base_name: &str, source_url: &str) -> PathBuf {
        self.dir.join(paths::asset_filename(base_name, source_url))
    }

    /// Fetches an asset to local storage
    ///
    /// * `Ok(Some(path))` - asset is on disk (downloaded now or previously)
    /// * `Ok(None)` - asset unavailable (network failure, non-200, timeout,
    ///   undecodable inline data); nothing persisted
    /// * `Err(_)` - local I/O failure only
    pub async fn store(&self, source_url: &str, base_name: &str) -> Result<Option<PathBuf>> {
        if source_url.is_empty() {
            return Ok(None);
        }

        let path = self.path_for(base_name, source_url);
        if path.exists() {
            tracing::debug!("Asset already present: {}", path.display());
            return Ok(Some(path));
        }

        if let Some(rest) = source_url.strip_prefix("data:image/svg+xml") {
            return self.write_inline_svg(rest, &path);
        }

        self.download(source_url, &path).await
    }

    /// Decodes an inline SVG data URL and writes the markup verbatim
    fn write_inline_svg(&self, payload: &str, path: &Path) -> Result<Option<PathBuf>> {
        // payload is everything after the media type: ",<encoded markup>"
        let Some((encoding, data)) = payload.split_once(',') else {
            tracing::warn!("Malformed inline SVG URL, skipping asset");
            return Ok(None);
        };

        if encoding.contains("base64") {
            tracing::warn!("Base64 inline SVG not supported, skipping asset");
            return Ok(None);
        }

        let svg = percent_decode_str(data).decode_utf8_lossy();
        std::fs::write(path, svg.as_bytes())?;
        tracing::debug!("Saved inline SVG asset: {}", path.display());
        Ok(Some(path.to_path_buf()))
    }

    /// Streams an HTTP(S) asset to disk
    async fn download(&self, source_url: &str, path: &Path) -> Result<Option<PathBuf>> {
        // Query parameters are not part of the content identity
        let clean_url = source_url.split('?').next().unwrap_or(source_url);

        let mut response = match self.client.get(clean_url).timeout(self.timeout).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Asset download failed for {}: {}", clean_url, e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                "Asset download for {} returned HTTP {}",
                clean_url,
                response.status()
            );
            return Ok(None);
        }

        let mut file = tokio::fs::File::create(path).await?;
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => file.write_all(&chunk).await?,
                Ok(None) => break,
                Err(e) => {
                    // Remove the partial file so a later run re-downloads it
                    drop(file);
                    let _ = tokio::fs::remove_file(path).await;
                    tracing::warn!("Asset stream for {} aborted: {}", clean_url, e);
                    return Ok(None);
                }
            }
        }
        file.flush().await?;

        tracing::debug!("Saved asset: {}", path.display());
        Ok(Some(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_at(dir: &TempDir) -> AssetStore {
        AssetStore::new(dir.path(), Client::new(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_download_and_dedup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/img/axe.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNGDATA".to_vec()))
            .expect(1) // Second store call must not re-fetch
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let store = store_at(&dir);
        let url = format!("{}/img/axe.png?v=1", server.uri());

        let first = store.store(&url, "Axe").await.unwrap().unwrap();
        assert_eq!(first.file_name().unwrap().to_str().unwrap(), "Axe.png");
        assert_eq!(std::fs::read(&first).unwrap(), b"PNGDATA");

        let second = store.store(&url, "Axe").await.unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_non_200_resolves_to_no_asset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/img/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let store = store_at(&dir);
        let url = format!("{}/img/missing.png", server.uri());

        let result = store.store(&url, "Missing").await.unwrap();
        assert!(result.is_none());
        assert!(!dir.path().join("Missing.png").exists());
    }

    #[tokio::test]
    async fn test_network_error_resolves_to_no_asset() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir);

        // Nothing listens on port 1
        let result = store.store("http://127.0.0.1:1/x.png", "X").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_inline_svg_written_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir);

        let url = "data:image/svg+xml,%3Csvg%20width%3D%2210%22%3E%3C%2Fsvg%3E";
        let path = store.store(url, "Crest").await.unwrap().unwrap();

        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "Crest.svg");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"<svg width="10"></svg>"#
        );
    }

    #[tokio::test]
    async fn test_malformed_inline_svg_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir);

        let result = store.store("data:image/svg+xml", "Bad").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_url_is_no_asset() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir);
        assert!(store.store("", "Empty").await.unwrap().is_none());
    }
}
