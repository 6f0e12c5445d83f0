use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::record::{parse_index, FullIndex};
use crate::location::build_url;

/// Upper bound on the index document size (10MB).
pub const MAX_INDEX_SIZE: usize = 10 * 1024 * 1024;

/// Time allowed for the whole index request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that prevent the article index from loading.
///
/// Any of these is terminal for the page view: the controller shows a static
/// notice and the fetch is not retried.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded [`FETCH_TIMEOUT`]
    #[error("Request timed out")]
    Timeout,
    /// Index exceeded [`MAX_INDEX_SIZE`]
    #[error("Index too large")]
    TooLarge,
    /// Response was cut short of its Content-Length
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Local index file could not be read
    #[error("Failed to read index file: {0}")]
    Io(#[from] std::io::Error),
    /// Body is not a JSON array of article records
    #[error("Malformed article index: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where the article index lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSource {
    Remote(Url),
    File(PathBuf),
}

impl IndexSource {
    /// Interpret a user-supplied location: `http(s)://` URLs are fetched,
    /// anything else is a filesystem path (a built site on disk).
    pub fn parse(location: &str) -> Result<Self, url::ParseError> {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(Self::Remote(Url::parse(trimmed)?))
        } else {
            Ok(Self::File(PathBuf::from(trimmed)))
        }
    }

    /// The conventional index location under a site base: `<base>/content/index.json`.
    pub fn from_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Self::parse(&build_url(base_url, &["content", "index.json"]))
    }
}

impl std::fmt::Display for IndexSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads the index from its [`IndexSource`].
///
/// Holds its own `reqwest::Client` so callers can inject one configured for
/// tests or proxies.
#[derive(Debug, Clone)]
pub struct IndexFetcher {
    client: reqwest::Client,
    source: IndexSource,
    timeout: Duration,
}

impl IndexFetcher {
    pub fn new(client: reqwest::Client, source: IndexSource) -> Self {
        Self {
            client,
            source,
            timeout: FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> &IndexSource {
        &self.source
    }

    /// Fetch and parse the index once.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Network`] / [`LoadError::Timeout`] - request failed
    /// - [`LoadError::HttpStatus`] - non-2xx response
    /// - [`LoadError::TooLarge`] - body over [`MAX_INDEX_SIZE`]
    /// - [`LoadError::Io`] - local file unreadable
    /// - [`LoadError::Malformed`] - body is not a record array
    pub async fn fetch(&self) -> Result<FullIndex, LoadError> {
        let bytes = match &self.source {
            IndexSource::Remote(url) => self.fetch_remote(url).await?,
            IndexSource::File(path) => read_index_file(path).await?,
        };
        parse_index(&bytes)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Vec<u8>, LoadError> {
        tracing::debug!(url = %url, "Fetching article index");

        let response = tokio::time::timeout(self.timeout, self.client.get(url.as_str()).send())
            .await
            .map_err(|_| LoadError::Timeout)??;

        if !response.status().is_success() {
            return Err(LoadError::HttpStatus(response.status().as_u16()));
        }

        tokio::time::timeout(self.timeout, read_limited_bytes(response, MAX_INDEX_SIZE))
            .await
            .map_err(|_| LoadError::Timeout)?
    }
}

async fn read_index_file(path: &std::path::Path) -> Result<Vec<u8>, LoadError> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_INDEX_SIZE as u64 {
        return Err(LoadError::TooLarge);
    }
    tracing::debug!(path = %path.display(), bytes = metadata.len(), "Reading article index file");
    Ok(tokio::fs::read(path).await?)
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, LoadError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(LoadError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(LoadError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(LoadError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_source() {
        let source = IndexSource::parse("https://example.com/content/index.json").unwrap();
        assert!(matches!(source, IndexSource::Remote(_)));
    }

    #[test]
    fn test_parse_file_source() {
        let source = IndexSource::parse("./public/content/index.json").unwrap();
        assert_eq!(
            source,
            IndexSource::File(PathBuf::from("./public/content/index.json"))
        );
    }

    #[test]
    fn test_parse_invalid_remote_source() {
        assert!(IndexSource::parse("http://").is_err());
    }

    #[test]
    fn test_from_base_url_remote() {
        let source = IndexSource::from_base_url("https://example.com/site/").unwrap();
        assert_eq!(
            source.to_string(),
            "https://example.com/site/content/index.json"
        );
    }

    #[test]
    fn test_from_base_url_directory() {
        let source = IndexSource::from_base_url("public").unwrap();
        assert_eq!(
            source,
            IndexSource::File(PathBuf::from("public/content/index.json"))
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let fetcher = IndexFetcher::new(
            reqwest::Client::new(),
            IndexSource::File(PathBuf::from("/tmp/postgrid_test_missing/index.json")),
        );
        let result = fetcher.fetch().await;
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[tokio::test]
    async fn test_file_source_round_trip() {
        let dir = std::env::temp_dir().join("postgrid_fetcher_test_file");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("index.json");
        std::fs::write(&path, r#"[{"url": "/a", "title": "A"}]"#).unwrap();

        let fetcher = IndexFetcher::new(reqwest::Client::new(), IndexSource::File(path));
        let index = fetcher.fetch().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].title, "A");

        std::fs::remove_dir_all(&dir).ok();
    }
}
