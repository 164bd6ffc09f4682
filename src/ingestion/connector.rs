//! CSV source trait - where the raw text of an export comes from

use crate::config::is_url;
use crate::error::{Result, RollupError};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// A fetchable CSV resource.
///
/// Implementations:
/// - FileSource: local file
/// - HttpSource: static hosting / CDN
/// - InlineSource: text already in memory (tests, piped input)
#[async_trait]
pub trait CsvSource: Send + Sync {
    /// Fetch the whole CSV body as text
    async fn fetch_text(&self) -> Result<String>;

    /// Identifier used in logs and load warnings
    fn source_id(&self) -> &str;

    /// Source type (e.g., "file", "http", "inline")
    fn source_type(&self) -> &str;
}

pub struct FileSource {
    path: PathBuf,
    source_id: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let source_id = path.display().to_string();
        Self { path, source_id }
    }
}

#[async_trait]
impl CsvSource for FileSource {
    async fn fetch_text(&self) -> Result<String> {
        debug!("Reading CSV file {}", self.source_id);
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| RollupError::Fetch(format!("Failed to read {}: {}", self.source_id, e)))?;
        // Invalid UTF-8 becomes U+FFFD, same as an HTTP body.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn source_type(&self) -> &str {
        "file"
    }
}

pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CsvSource for HttpSource {
    async fn fetch_text(&self) -> Result<String> {
        debug!("Fetching CSV from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RollupError::Fetch(format!(
                "Failed to fetch {}: {}",
                self.url, status
            )));
        }
        Ok(response.text().await?)
    }

    fn source_id(&self) -> &str {
        &self.url
    }

    fn source_type(&self) -> &str {
        "http"
    }
}

pub struct InlineSource {
    source_id: String,
    text: String,
}

impl InlineSource {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl CsvSource for InlineSource {
    async fn fetch_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn source_type(&self) -> &str {
        "inline"
    }
}

/// `http(s)://` locations become an `HttpSource`, anything else a `FileSource`.
pub fn source_for(location: &str) -> Box<dyn CsvSource> {
    if is_url(location) {
        Box::new(HttpSource::new(location.trim()))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_for_picks_by_scheme() {
        assert_eq!(source_for("https://cdn.example.com/a.csv").source_type(), "http");
        assert_eq!(source_for("data/a.csv").source_type(), "file");
        assert_eq!(source_for("data/a.csv").source_id(), "data/a.csv");
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let path = std::env::temp_dir().join("spend_rollup_does_not_exist.csv");
        let err = FileSource::new(path).fetch_text().await.unwrap_err();
        assert!(matches!(err, RollupError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_invalid_utf8_cell_still_loads() {
        let path = std::env::temp_dir().join("spend_rollup_latin1.csv");
        tokio::fs::write(&path, b"brand root,spend (usd)\nMed\xe9la,10\nAvent,5\n".to_vec())
            .await
            .unwrap();

        let text = FileSource::new(&path).fetch_text().await.unwrap();
        assert!(text.contains("Med\u{FFFD}la,10"));

        let dataset = crate::ingestion::load::<crate::records::SpendRecord>(&FileSource::new(&path))
            .await
            .unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[1].spend_usd, 5.0);

        tokio::fs::remove_file(&path).await.ok();
    }
}
