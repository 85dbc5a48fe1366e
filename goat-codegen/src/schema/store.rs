//! Schema store contract and a snapshot-backed implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::metadata::{ColumnDefinition, TableDefinition};
use crate::error::{CodegenError, Result};

/// Read-only access to table and column metadata
///
/// Generation only ever reads through this trait; implementations must be
/// safe to share between concurrent invocations if the caller does so.
pub trait SchemaStore {
    /// Fetch a table by id, `CodegenError::TableNotFound` if absent
    fn get_table(&self, id: i64) -> Result<TableDefinition>;

    /// Fetch every column owned by a table
    fn get_columns(&self, table_id: i64) -> Result<Vec<ColumnDefinition>>;
}

impl<S: SchemaStore + ?Sized> SchemaStore for &S {
    fn get_table(&self, id: i64) -> Result<TableDefinition> {
        (**self).get_table(id)
    }

    fn get_columns(&self, table_id: i64) -> Result<Vec<ColumnDefinition>> {
        (**self).get_columns(table_id)
    }
}

/// Flat dump of the metadata tables, as stored relationally
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub tables: Vec<TableDefinition>,

    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl SchemaSnapshot {
    /// Load a JSON snapshot file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            CodegenError::SnapshotError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

/// In-memory store over a [`SchemaSnapshot`]
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaStore {
    tables: HashMap<i64, TableDefinition>,
    columns: HashMap<i64, Vec<ColumnDefinition>>,
}

impl InMemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: SchemaSnapshot) -> Self {
        let mut store = Self::new();
        for table in snapshot.tables {
            store.insert_table(table);
        }
        for column in snapshot.columns {
            store.insert_column(column);
        }
        store
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let store = Self::from_snapshot(SchemaSnapshot::from_file(path)?);
        debug!(
            "Loaded snapshot {}: {} tables",
            path.display(),
            store.tables.len()
        );
        Ok(store)
    }

    pub fn insert_table(&mut self, table: TableDefinition) {
        self.tables.insert(table.id, table);
    }

    pub fn insert_column(&mut self, column: ColumnDefinition) {
        self.columns.entry(column.table_id).or_default().push(column);
    }

    /// All tables ordered by id
    pub fn tables(&self) -> Vec<&TableDefinition> {
        let mut tables: Vec<&TableDefinition> = self.tables.values().collect();
        tables.sort_by_key(|t| t.id);
        tables
    }
}

impl SchemaStore for InMemorySchemaStore {
    fn get_table(&self, id: i64) -> Result<TableDefinition> {
        self.tables
            .get(&id)
            .cloned()
            .ok_or(CodegenError::TableNotFound(id))
    }

    fn get_columns(&self, table_id: i64) -> Result<Vec<ColumnDefinition>> {
        let mut columns = self.columns.get(&table_id).cloned().unwrap_or_default();
        columns.sort_by_key(|c| c.align_seq);
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataTypeClass;

    const SNAPSHOT: &str = r#"{
        "tables": [
            { "id": 1, "project_id": 7, "name": "user" },
            { "id": 2, "project_id": 7, "name": "project", "deleted": true }
        ],
        "columns": [
            { "id": 11, "table_id": 1, "name": "name", "data_type_class": "11",
              "precision": 50, "not_null": true, "align_seq": 2 },
            { "id": 10, "table_id": 1, "name": "user_id", "data_type_class": "serial",
              "primary_key": true, "align_seq": 1 }
        ]
    }"#;

    #[test]
    fn test_snapshot_lookup() {
        let snapshot: SchemaSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let store = InMemorySchemaStore::from_snapshot(snapshot);

        let table = store.get_table(1).unwrap();
        assert_eq!(table.name, "user");
        assert_eq!(table.project_id, 7);

        let columns = store.get_columns(1).unwrap();
        assert_eq!(columns[0].name, "user_id");
        assert_eq!(columns[0].data_type_class, DataTypeClass::Serial);
        assert_eq!(columns[1].precision, 50);
        assert!(columns[1].not_null);
    }

    #[test]
    fn test_missing_table() {
        let store = InMemorySchemaStore::new();
        assert!(matches!(
            store.get_table(42),
            Err(CodegenError::TableNotFound(42))
        ));
        assert!(store.get_columns(42).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let store = InMemorySchemaStore::from_file(&path).unwrap();
        assert_eq!(store.tables().len(), 2);
        assert!(store.get_table(2).unwrap().deleted);
    }
}
