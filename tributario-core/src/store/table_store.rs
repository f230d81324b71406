use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{SourceError, TableSource};
use crate::models::TableSet;

/// Name under which the service keeps its active table set.
pub const DEFAULT_TABLE_SET: &str = "tax_tables";

/// Where a table set came from and when it was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
}

impl TableMeta {
    /// Metadata stamped with the current time.
    pub fn now(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    tables: Arc<TableSet>,
    meta: TableMeta,
}

/// Named table sets with their load metadata.
///
/// Sets are stored behind an [`Arc`] so readers can keep calculating over a
/// set while a newer one replaces it.
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    entries: BTreeMap<String, Entry>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tables` under `name`, replacing any previous set, and stamps
    /// the metadata with the current time.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        tables: TableSet,
        source: impl Into<String>,
    ) -> TableMeta {
        let meta = TableMeta::now(source);
        self.record(name, tables, meta.clone());
        meta
    }

    /// Stores `tables` under `name` with explicit metadata.
    pub fn record(
        &mut self,
        name: impl Into<String>,
        tables: TableSet,
        meta: TableMeta,
    ) {
        let name = name.into();
        info!(name = %name, source = %meta.source, "stored table set");
        self.entries.insert(
            name,
            Entry {
                tables: Arc::new(tables),
                meta,
            },
        );
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<Arc<TableSet>> {
        self.entries.get(name).map(|entry| Arc::clone(&entry.tables))
    }

    pub fn meta(
        &self,
        name: &str,
    ) -> Option<&TableMeta> {
        self.entries.get(name).map(|entry| &entry.meta)
    }

    /// Metadata of every stored set, by name.
    pub fn status(&self) -> BTreeMap<String, TableMeta> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.meta.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Loads a set from `source` and stores it under `name`.
    ///
    /// # Errors
    ///
    /// Returns the source's [`SourceError`]; the store is left unchanged.
    pub async fn load_into(
        &mut self,
        name: impl Into<String>,
        source: &dyn TableSource,
    ) -> Result<TableMeta, SourceError> {
        let tables = source.load().await?;
        Ok(self.insert(name, tables, source.describe()))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Bracket, BracketTable};

    struct StaticSource(TableSet);

    #[async_trait]
    impl TableSource for StaticSource {
        fn describe(&self) -> String {
            "memory://static".to_string()
        }

        async fn load(&self) -> Result<TableSet, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct MissingSource;

    #[async_trait]
    impl TableSource for MissingSource {
        fn describe(&self) -> String {
            "memory://missing".to_string()
        }

        async fn load(&self) -> Result<TableSet, SourceError> {
            Err(SourceError::NotFound("memory://missing".to_string()))
        }
    }

    fn sample() -> TableSet {
        TableSet {
            irrf_table: Some(BracketTable::new(vec![Bracket::new(
                dec!(2259.20),
                dec!(0),
                dec!(0),
            )])),
            ..TableSet::default()
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = TableStore::new();

        assert!(store.is_empty());
        assert!(store.get(DEFAULT_TABLE_SET).is_none());
        assert!(store.status().is_empty());
    }

    #[test]
    fn insert_records_metadata() {
        let mut store = TableStore::new();
        let before = Utc::now();

        let meta = store.insert(DEFAULT_TABLE_SET, sample(), "config/sample_tables.json");

        assert_eq!(meta.source, "config/sample_tables.json");
        assert!(meta.loaded_at >= before);
        assert_eq!(store.meta(DEFAULT_TABLE_SET), Some(&meta));
        assert_eq!(*store.get(DEFAULT_TABLE_SET).unwrap(), sample());
    }

    #[test]
    fn insert_replaces_previous_set() {
        let mut store = TableStore::new();
        store.insert(DEFAULT_TABLE_SET, TableSet::default(), "first");

        store.insert(DEFAULT_TABLE_SET, sample(), "upload");

        assert_eq!(store.len(), 1);
        assert_eq!(store.meta(DEFAULT_TABLE_SET).unwrap().source, "upload");
        assert_eq!(*store.get(DEFAULT_TABLE_SET).unwrap(), sample());
    }

    #[test]
    fn readers_keep_their_snapshot() {
        let mut store = TableStore::new();
        store.insert(DEFAULT_TABLE_SET, sample(), "first");
        let snapshot = store.get(DEFAULT_TABLE_SET).unwrap();

        store.insert(DEFAULT_TABLE_SET, TableSet::default(), "upload");

        assert_eq!(*snapshot, sample());
    }

    #[test]
    fn status_lists_sets_by_name() {
        let mut store = TableStore::new();
        store.insert("tax_tables", sample(), "a");
        store.insert("alt", sample(), "b");

        let status = store.status();

        assert_eq!(status.keys().cloned().collect::<Vec<_>>(), vec!["alt", "tax_tables"]);
        assert_eq!(status["alt"].source, "b");
    }

    #[tokio::test]
    async fn load_into_uses_source_description() {
        let mut store = TableStore::new();

        let meta = store
            .load_into(DEFAULT_TABLE_SET, &StaticSource(sample()))
            .await
            .unwrap();

        assert_eq!(meta.source, "memory://static");
        assert_eq!(*store.get(DEFAULT_TABLE_SET).unwrap(), sample());
    }

    #[tokio::test]
    async fn failed_load_leaves_store_unchanged() {
        let mut store = TableStore::new();

        let result = store.load_into(DEFAULT_TABLE_SET, &MissingSource).await;

        assert!(matches!(result, Err(SourceError::NotFound(_))));
        assert!(store.is_empty());
    }
}
