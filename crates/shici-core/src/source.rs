//! Data source trait: where index, shard and dictionary bytes come from.
//!
//! Sources are intentionally dumb: they map a locator (an absolute path such
//! as `/data/index.json`, exactly as written in the index) to bytes. Parsing
//! and caching live in [`crate::store::DataStore`].
//!
//! # Dyn-compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of `impl Future` so that
//! `Arc<dyn DataSource>` works and the store can pick HTTP or local disk at
//! runtime from configuration.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use url::Url;

use crate::error::{Error, Result};

/// Boxed, Send future returned by source methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Byte source for dataset resources.
pub trait DataSource: Send + Sync {
    /// Fetch the full contents of the resource at `locator`.
    ///
    /// Unreachable resources and non-success statuses are `Error::Fetch`
    /// carrying the resolved URL or path.
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;

    /// Human-readable resolved location, used in logs and errors.
    fn describe(&self, locator: &str) -> String;
}

/// Check if a location string is a URL (http:// or https://).
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Build the source for a configured data location.
///
/// URLs get an [`HttpSource`]; anything else is treated as a directory.
pub fn source_for(location: &str, timeout: Option<Duration>) -> Result<Arc<dyn DataSource>> {
    if is_url(location) {
        Ok(Arc::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Arc::new(LocalSource::new(PathBuf::from(location))))
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches resources with HTTP GET relative to a base URL.
///
/// Locators beginning with `/` resolve against the origin, the same way a
/// browser resolves `fetch('/data/index.json')`.
pub struct HttpSource {
    base: Url,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for `base`. With `timeout = None` requests have no
    /// deadline and a stalled server stalls the caller.
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Error::config(format!("invalid data URL '{}': {}", base, e)))?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { base, client })
    }

    fn resolve(&self, locator: &str) -> Result<Url> {
        self.base.join(locator).map_err(|e| {
            Error::fetch(
                locator,
                format!("cannot resolve against {}: {}", self.base, e),
            )
        })
    }
}

impl DataSource for HttpSource {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            let url = self.resolve(locator)?;
            debug!("GET {}", url);

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| Error::fetch(url.as_str(), e))?;

            if !response.status().is_success() {
                return Err(Error::fetch(
                    url.as_str(),
                    format!("HTTP {}", response.status()),
                ));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::fetch(url.as_str(), format!("failed to read body: {}", e)))?;
            Ok(bytes.to_vec())
        })
    }

    fn describe(&self, locator: &str) -> String {
        match self.resolve(locator) {
            Ok(url) => url.to_string(),
            Err(_) => locator.to_string(),
        }
    }
}

// ============================================================================
// Local directory
// ============================================================================

/// Reads resources from a directory laid out like the served site.
///
/// The locator `/data/index.json` maps to `<root>/data/index.json`.
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    /// Create a new local source rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn os_path(&self, locator: &str) -> PathBuf {
        let relative = locator.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

impl DataSource for LocalSource {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            let path = self.os_path(locator);
            debug!("read {}", path.display());
            tokio::fs::read(&path)
                .await
                .map_err(|e| Error::fetch(path.display().to_string(), e))
        })
    }

    fn describe(&self, locator: &str) -> String {
        self.os_path(locator).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://poems.example.org"));
        assert!(is_url("http://localhost:5173/"));
        assert!(!is_url("/srv/shici/public"));
        assert!(!is_url("public"));
    }

    #[test]
    fn test_http_resolves_absolute_locator_against_origin() {
        let source = HttpSource::new("https://poems.example.org/app/", None).unwrap();
        assert_eq!(
            source.describe("/data/index.json"),
            "https://poems.example.org/data/index.json"
        );
    }

    #[test]
    fn test_http_resolves_relative_locator_against_base() {
        let source = HttpSource::new("https://poems.example.org/app/", None).unwrap();
        assert_eq!(
            source.describe("data/index.json"),
            "https://poems.example.org/app/data/index.json"
        );
    }

    #[test]
    fn test_http_rejects_bad_base() {
        let result = HttpSource::new("not a url", None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    /// Serve one canned HTTP response on a loopback port.
    async fn serve_once(response: &'static [u8]) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response).await;
            let _ = socket.shutdown().await;
        });
        addr
    }

    #[tokio::test]
    async fn test_http_non_success_is_fetch_error_with_resolved_url() {
        let addr = serve_once(
            b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let source = HttpSource::new(&format!("http://{}/app/", addr), None).unwrap();

        let err = source.fetch("/data/index.json").await.unwrap_err();
        assert!(err.is_fetch());
        match err {
            Error::Fetch { url, reason } => {
                assert_eq!(url, format!("http://{}/data/index.json", addr));
                assert!(reason.contains("404"), "reason: {reason}");
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_success_returns_body() {
        let addr = serve_once(
            b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]",
        )
        .await;
        let source = HttpSource::new(&format!("http://{}/", addr), None).unwrap();
        assert_eq!(source.fetch("/data/index.json").await.unwrap(), b"[]");
    }

    #[test]
    fn test_local_path_mapping() {
        let source = LocalSource::new(PathBuf::from("/srv/public"));
        assert_eq!(
            source.describe("/data/poems-song-0.json"),
            "/srv/public/data/poems-song-0.json"
        );
    }

    #[tokio::test]
    async fn test_local_fetch_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("data")).unwrap();
        std::fs::write(tmp.path().join("data/index.json"), b"[]").unwrap();

        let source = LocalSource::new(tmp.path().to_path_buf());
        let bytes = source.fetch("/data/index.json").await.unwrap();
        assert_eq!(bytes, b"[]");
    }

    #[tokio::test]
    async fn test_local_missing_file_is_fetch_error_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let source = LocalSource::new(tmp.path().to_path_buf());
        let err = source.fetch("/data/missing.json").await.unwrap_err();
        match err {
            Error::Fetch { url, .. } => assert!(url.ends_with("data/missing.json")),
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[test]
    fn test_source_for_picks_backend() {
        assert!(source_for("https://poems.example.org", None).is_ok());
        assert!(source_for("./public", None).is_ok());
        assert!(source_for("https://", None).is_err());
    }
}
