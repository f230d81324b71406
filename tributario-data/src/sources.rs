//! Table sources backed by the local filesystem and HTTP.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;
use tributario_core::{SourceError, TableSet, TableSource};

use crate::loader::{TableFormat, TableLoadError, TableLoader};

/// Timeout applied to table downloads unless configured otherwise.
pub const DEFAULT_URL_TIMEOUT: Duration = Duration::from_secs(15);

/// Bundle stored in a local JSON or CSV file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TableSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<TableSet, SourceError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => SourceError::NotFound(self.describe()),
            _ => SourceError::from(TableLoadError::from(err)),
        })?;

        let format = TableFormat::from_path(&self.path);
        let tables = TableLoader::parse(bytes.as_slice(), format)?;

        info!(path = %self.path.display(), ?format, "loaded table bundle from file");

        Ok(tables)
    }
}

/// Bundle published at an HTTP(S) URL.
///
/// URLs whose path ends in `.csv` are read as CSV; everything else as JSON.
#[derive(Debug, Clone)]
pub struct UrlSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl UrlSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout: DEFAULT_URL_TIMEOUT,
        }
    }

    pub fn with_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn format(&self) -> TableFormat {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        TableFormat::from_path(Path::new(path))
    }

    async fn fetch(&self) -> Result<Vec<u8>, TableLoadError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl TableSource for UrlSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn load(&self) -> Result<TableSet, SourceError> {
        let bytes = self.fetch().await?;

        let format = self.format();
        let tables = TableLoader::parse(bytes.as_slice(), format)?;

        info!(url = %self.url, ?format, "loaded table bundle from URL");

        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn url_format_ignores_query_string() {
        let source = UrlSource::new("https://example.org/tabelas.csv?v=2");

        assert_eq!(source.format(), TableFormat::Csv);
    }

    #[test]
    fn url_format_defaults_to_json() {
        let source = UrlSource::new("https://example.org/tabelas");

        assert_eq!(source.format(), TableFormat::Json);
    }

    #[test]
    fn describe_reports_location() {
        assert_eq!(
            FileSource::new("config/sample_tables.json").describe(),
            "config/sample_tables.json"
        );
        assert_eq!(
            UrlSource::new("https://example.org/t.json").describe(),
            "https://example.org/t.json"
        );
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let source = FileSource::new("does/not/exist.json");

        let result = source.load().await;

        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn unreachable_url_is_a_connection_error() {
        let source = UrlSource::new("http://127.0.0.1:9/tables.json")
            .with_timeout(Duration::from_millis(500));

        let result = source.load().await;

        assert!(matches!(result, Err(SourceError::Connection(_))));
    }
}
