//! # Application State
//!
//! The service owns one [`TableStore`] behind a read/write lock. Handlers
//! clone the active set (an `Arc`) out of the lock and calculate without
//! holding it, so an upload never changes a set under a running request.

use std::sync::Arc;

use parking_lot::RwLock;
use tributario_core::store::DEFAULT_TABLE_SET;
use tributario_core::{SourceError, TableMeta, TableSet, TableSource, TableStore};

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    tables: Arc<RwLock<TableStore>>,
}

impl AppState {
    /// State with an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: TableStore) -> Self {
        Self {
            tables: Arc::new(RwLock::new(store)),
        }
    }

    /// The active table set and its metadata, if one is loaded.
    pub fn active_tables(&self) -> Option<(Arc<TableSet>, TableMeta)> {
        let store = self.tables.read();
        let tables = store.get(DEFAULT_TABLE_SET)?;
        let meta = store.meta(DEFAULT_TABLE_SET)?.clone();
        Some((tables, meta))
    }

    /// Replaces the active table set.
    pub fn replace_tables(
        &self,
        tables: TableSet,
        source: impl Into<String>,
    ) -> TableMeta {
        self.tables.write().insert(DEFAULT_TABLE_SET, tables, source)
    }

    /// Loads the active table set from `source`.
    ///
    /// The lock is only taken once the source has produced the set.
    ///
    /// # Errors
    ///
    /// Returns the source's [`SourceError`]; the current set is kept.
    pub async fn load_tables(
        &self,
        source: &dyn TableSource,
    ) -> Result<TableMeta, SourceError> {
        let tables = source.load().await?;
        Ok(self.replace_tables(tables, source.describe()))
    }

    pub fn table_status(&self) -> std::collections::BTreeMap<String, TableMeta> {
        self.tables.read().status()
    }

    pub fn has_tables(&self) -> bool {
        !self.tables.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_state_has_no_tables() {
        let state = AppState::new();

        assert!(!state.has_tables());
        assert!(state.active_tables().is_none());
    }

    #[test]
    fn replace_tables_is_visible_through_clones() {
        let state = AppState::new();
        let handle = state.clone();

        handle.replace_tables(TableSet::default(), "upload");

        let (_, meta) = state.active_tables().expect("tables should be loaded");
        assert_eq!(meta.source, "upload");
        assert_eq!(state.table_status().len(), 1);
    }

    #[test]
    fn snapshot_survives_replacement() {
        let state = AppState::new();
        state.replace_tables(TableSet::default(), "first");
        let (before, _) = state.active_tables().expect("first set");

        let mut next = TableSet::default();
        next.cnae_rules.insert(
            "6201-5/01".to_string(),
            tributario_core::CnaeRule::FactorR,
        );
        state.replace_tables(next, "second");

        assert!(before.cnae_rules.is_empty());
        let (after, meta) = state.active_tables().expect("second set");
        assert_eq!(after.cnae_rules.len(), 1);
        assert_eq!(meta.source, "second");
    }
}
