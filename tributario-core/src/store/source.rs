use async_trait::async_trait;
use thiserror::Error;

use crate::models::TableSet;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Table source not found: {0}")]
    NotFound(String),

    #[error("Read error: {0}")]
    Read(String),

    #[error("Invalid table bundle: {0}")]
    Invalid(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Somewhere a table bundle can be loaded from.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Label recorded as the `source` of the loaded set (a path or URL).
    fn describe(&self) -> String;

    async fn load(&self) -> Result<TableSet, SourceError>;
}
