//! Metadata records for tables and columns as held by the schema store

use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract, dialect-independent column kind
///
/// Stored either as the two-character classification code (`"01"`, `"11"`, ...)
/// or as the variant name. Values outside the known set are kept verbatim in
/// [`DataTypeClass::Unrecognised`] so generation can degrade per column instead
/// of rejecting the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataTypeClass {
    Serial,
    Text,
    Varchar,
    Char,
    Integer,
    Numeric,
    Timestamp,
    Date,
    Blob,
    Unrecognised(String),
}

impl DataTypeClass {
    /// All recognised classifications in code order
    pub const KNOWN: [DataTypeClass; 9] = [
        DataTypeClass::Serial,
        DataTypeClass::Text,
        DataTypeClass::Varchar,
        DataTypeClass::Char,
        DataTypeClass::Integer,
        DataTypeClass::Numeric,
        DataTypeClass::Timestamp,
        DataTypeClass::Date,
        DataTypeClass::Blob,
    ];

    /// Classification code as stored by the metadata screens
    pub fn code(&self) -> &str {
        match self {
            DataTypeClass::Serial => "01",
            DataTypeClass::Text => "10",
            DataTypeClass::Varchar => "11",
            DataTypeClass::Char => "12",
            DataTypeClass::Integer => "20",
            DataTypeClass::Numeric => "30",
            DataTypeClass::Timestamp => "40",
            DataTypeClass::Date => "41",
            DataTypeClass::Blob => "50",
            DataTypeClass::Unrecognised(raw) => raw,
        }
    }

    /// Human-readable variant name
    pub fn name(&self) -> &str {
        match self {
            DataTypeClass::Serial => "Serial",
            DataTypeClass::Text => "Text",
            DataTypeClass::Varchar => "Varchar",
            DataTypeClass::Char => "Char",
            DataTypeClass::Integer => "Integer",
            DataTypeClass::Numeric => "Numeric",
            DataTypeClass::Timestamp => "Timestamp",
            DataTypeClass::Date => "Date",
            DataTypeClass::Blob => "Blob",
            DataTypeClass::Unrecognised(raw) => raw,
        }
    }

    pub fn is_serial(&self) -> bool {
        matches!(self, DataTypeClass::Serial)
    }

    /// Whether literal defaults are emitted without quotes
    pub fn is_numeric_literal(&self) -> bool {
        matches!(self, DataTypeClass::Integer | DataTypeClass::Numeric)
    }

    /// Parse a stored value, accepting either the code or the variant name
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self::KNOWN
            .iter()
            .find(|class| class.code() == trimmed || class.name().eq_ignore_ascii_case(trimmed))
            .cloned()
            .unwrap_or_else(|| DataTypeClass::Unrecognised(raw.to_string()))
    }
}

impl From<String> for DataTypeClass {
    fn from(raw: String) -> Self {
        DataTypeClass::parse(&raw)
    }
}

impl From<DataTypeClass> for String {
    fn from(class: DataTypeClass) -> Self {
        class.name().to_string()
    }
}

impl fmt::Display for DataTypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata for a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub id: i64,

    #[serde(default)]
    pub project_id: i64,

    /// Physical table name (snake_case)
    pub name: String,

    #[serde(default)]
    pub logical_name: String,

    #[serde(default)]
    pub deleted: bool,
}

/// Metadata for a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub id: i64,

    /// Owning table
    pub table_id: i64,

    /// Physical column name (snake_case)
    pub name: String,

    #[serde(default)]
    pub logical_name: String,

    pub data_type_class: DataTypeClass,

    /// Length for VARCHAR/CHAR, total digits for NUMERIC; 0 means unspecified
    #[serde(default)]
    pub precision: u32,

    #[serde(default)]
    pub scale: u32,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub not_null: bool,

    #[serde(default)]
    pub unique: bool,

    /// Default literal; empty means no DEFAULT clause
    #[serde(default)]
    pub default_value: String,

    #[serde(default)]
    pub remark: String,

    /// Emission order within the table
    pub align_seq: i32,

    #[serde(default)]
    pub deleted: bool,
}

/// A table together with its live columns in emission order
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub table: TableDefinition,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    /// Build from store records: drops deleted columns and stable-sorts by `align_seq`
    pub fn new(table: TableDefinition, columns: Vec<ColumnDefinition>) -> Self {
        let mut columns: Vec<ColumnDefinition> =
            columns.into_iter().filter(|c| !c.deleted).collect();
        columns.sort_by_key(|c| c.align_seq);
        Self { table, columns }
    }

    pub fn name(&self) -> &str {
        &self.table.name
    }

    /// Primary-key columns in `align_seq` order
    pub fn primary_keys(&self) -> Vec<&ColumnDefinition> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Columns the store assigns values to on insert are excluded
    pub fn insertable_columns(&self) -> Vec<&ColumnDefinition> {
        self.columns
            .iter()
            .filter(|c| !c.data_type_class.is_serial())
            .collect()
    }

    /// The single Serial column when it alone forms the primary key
    pub fn sole_serial_key(&self) -> Option<&ColumnDefinition> {
        match self.primary_keys().as_slice() {
            [only] if only.data_type_class.is_serial() => Some(*only),
            _ => None,
        }
    }

    /// `align_seq` values shared by more than one live column
    pub fn duplicate_align_seqs(&self) -> Vec<i32> {
        let mut dups: Vec<i32> = self
            .columns
            .windows(2)
            .filter(|w| w[0].align_seq == w[1].align_seq)
            .map(|w| w[0].align_seq)
            .collect();
        dups.dedup();
        dups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, class: DataTypeClass, seq: i32, pk: bool) -> ColumnDefinition {
        ColumnDefinition {
            id: seq as i64,
            table_id: 1,
            name: name.to_string(),
            logical_name: String::new(),
            data_type_class: class,
            precision: 0,
            scale: 0,
            primary_key: pk,
            not_null: false,
            unique: false,
            default_value: String::new(),
            remark: String::new(),
            align_seq: seq,
            deleted: false,
        }
    }

    fn table(name: &str) -> TableDefinition {
        TableDefinition {
            id: 1,
            project_id: 1,
            name: name.to_string(),
            logical_name: String::new(),
            deleted: false,
        }
    }

    #[test]
    fn test_parse_data_type_class() {
        assert_eq!(DataTypeClass::parse("01"), DataTypeClass::Serial);
        assert_eq!(DataTypeClass::parse("11"), DataTypeClass::Varchar);
        assert_eq!(DataTypeClass::parse("numeric"), DataTypeClass::Numeric);
        assert_eq!(DataTypeClass::parse("TIMESTAMP"), DataTypeClass::Timestamp);
        assert_eq!(
            DataTypeClass::parse("99"),
            DataTypeClass::Unrecognised("99".to_string())
        );
    }

    #[test]
    fn test_data_type_class_serde() {
        let class: DataTypeClass = serde_json::from_str("\"41\"").unwrap();
        assert_eq!(class, DataTypeClass::Date);
        assert_eq!(serde_json::to_string(&class).unwrap(), "\"Date\"");
    }

    #[test]
    fn test_table_schema_orders_and_filters() {
        let mut gone = column("gone", DataTypeClass::Text, 2, false);
        gone.deleted = true;
        let schema = TableSchema::new(
            table("user"),
            vec![
                column("name", DataTypeClass::Text, 3, false),
                gone,
                column("user_id", DataTypeClass::Serial, 1, true),
            ],
        );

        let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["user_id", "name"]);
        assert_eq!(schema.sole_serial_key().unwrap().name, "user_id");
        assert_eq!(schema.insertable_columns().len(), 1);
    }

    #[test]
    fn test_composite_key_has_no_sole_serial() {
        let schema = TableSchema::new(
            table("user_project"),
            vec![
                column("user_id", DataTypeClass::Integer, 1, true),
                column("project_id", DataTypeClass::Integer, 2, true),
            ],
        );
        assert_eq!(schema.primary_keys().len(), 2);
        assert!(schema.sole_serial_key().is_none());
    }

    #[test]
    fn test_duplicate_align_seqs() {
        let schema = TableSchema::new(
            table("t"),
            vec![
                column("a", DataTypeClass::Text, 1, false),
                column("b", DataTypeClass::Text, 1, false),
                column("c", DataTypeClass::Text, 2, false),
            ],
        );
        assert_eq!(schema.duplicate_align_seqs(), vec![1]);
    }
}
