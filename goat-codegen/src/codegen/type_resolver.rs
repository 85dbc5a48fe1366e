//! Data-type classification to SQL / Go type mapping

use super::dialect::SqlDialect;
use crate::schema::{ColumnDefinition, DataTypeClass};

/// Immutable classification -> keyword table
///
/// Built as `static` data and only ever read; a missing entry is a mapping gap
/// that callers degrade to an empty token.
#[derive(Debug)]
pub struct TypeTable {
    entries: &'static [(DataTypeClass, &'static str)],
}

impl TypeTable {
    pub const fn new(entries: &'static [(DataTypeClass, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, class: &DataTypeClass) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, keyword)| *keyword)
    }
}

static SQLITE_ENTRIES: [(DataTypeClass, &str); 9] = [
    (DataTypeClass::Serial, "INTEGER"),
    (DataTypeClass::Text, "TEXT"),
    (DataTypeClass::Varchar, "TEXT"),
    (DataTypeClass::Char, "TEXT"),
    (DataTypeClass::Integer, "INTEGER"),
    (DataTypeClass::Numeric, "NUMERIC"),
    (DataTypeClass::Timestamp, "TEXT"),
    (DataTypeClass::Date, "TEXT"),
    (DataTypeClass::Blob, "BLOB"),
];

/// SQLite storage classes (type affinity; precision is never rendered)
pub static SQLITE_TYPES: TypeTable = TypeTable::new(&SQLITE_ENTRIES);

static POSTGRES_ENTRIES: [(DataTypeClass, &str); 9] = [
    (DataTypeClass::Serial, "SERIAL"),
    (DataTypeClass::Text, "TEXT"),
    (DataTypeClass::Varchar, "VARCHAR"),
    (DataTypeClass::Char, "CHAR"),
    (DataTypeClass::Integer, "INTEGER"),
    (DataTypeClass::Numeric, "NUMERIC"),
    (DataTypeClass::Timestamp, "TIMESTAMP"),
    (DataTypeClass::Date, "DATE"),
    (DataTypeClass::Blob, "BYTEA"),
];

/// PostgreSQL base type keywords
pub static POSTGRES_TYPES: TypeTable = TypeTable::new(&POSTGRES_ENTRIES);

static HOST_ENTRIES: [(DataTypeClass, &str); 9] = [
    (DataTypeClass::Serial, "int"),
    (DataTypeClass::Text, "string"),
    (DataTypeClass::Varchar, "string"),
    (DataTypeClass::Char, "string"),
    (DataTypeClass::Integer, "int"),
    (DataTypeClass::Numeric, "float64"),
    (DataTypeClass::Timestamp, "string"),
    (DataTypeClass::Date, "string"),
    (DataTypeClass::Blob, "string"),
];

/// Go storage types used for entity fields and key parameters
pub static HOST_TYPES: TypeTable = TypeTable::new(&HOST_ENTRIES);

/// Resolve column classifications to concrete type names
pub struct TypeResolver;

impl TypeResolver {
    /// SQL column type for a dialect, `None` for an unmapped classification
    pub fn sql_type(dialect: &dyn SqlDialect, column: &ColumnDefinition) -> Option<String> {
        let base = dialect.type_table().lookup(&column.data_type_class)?;
        let suffix = dialect
            .size_suffix(&column.data_type_class, column.precision, column.scale)
            .unwrap_or_default();
        Some(format!("{}{}", base, suffix))
    }

    /// Go storage type, `None` for an unmapped classification
    pub fn host_type(class: &DataTypeClass) -> Option<&'static str> {
        HOST_TYPES.lookup(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::dialect::Dialect;

    fn make_column(class: DataTypeClass, precision: u32, scale: u32) -> ColumnDefinition {
        ColumnDefinition {
            id: 1,
            table_id: 1,
            name: "c".to_string(),
            logical_name: String::new(),
            data_type_class: class,
            precision,
            scale,
            primary_key: false,
            not_null: false,
            unique: false,
            default_value: String::new(),
            remark: String::new(),
            align_seq: 1,
            deleted: false,
        }
    }

    #[test]
    fn test_tables_cover_every_known_class() {
        for class in DataTypeClass::KNOWN.iter() {
            assert!(SQLITE_TYPES.lookup(class).is_some(), "sqlite {class}");
            assert!(POSTGRES_TYPES.lookup(class).is_some(), "postgres {class}");
            assert!(HOST_TYPES.lookup(class).is_some(), "host {class}");
        }
    }

    #[test]
    fn test_postgres_precision_rules() {
        let pg = Dialect::Postgresql.sql();

        let col = make_column(DataTypeClass::Varchar, 50, 0);
        assert_eq!(TypeResolver::sql_type(pg, &col).unwrap(), "VARCHAR(50)");

        let col = make_column(DataTypeClass::Char, 0, 0);
        assert_eq!(TypeResolver::sql_type(pg, &col).unwrap(), "CHAR");

        let col = make_column(DataTypeClass::Numeric, 10, 2);
        assert_eq!(TypeResolver::sql_type(pg, &col).unwrap(), "NUMERIC(10,2)");

        let col = make_column(DataTypeClass::Numeric, 0, 2);
        assert_eq!(TypeResolver::sql_type(pg, &col).unwrap(), "NUMERIC");

        // precision on other classes is ignored
        let col = make_column(DataTypeClass::Integer, 8, 0);
        assert_eq!(TypeResolver::sql_type(pg, &col).unwrap(), "INTEGER");
    }

    #[test]
    fn test_sqlite_ignores_precision() {
        let sqlite = Dialect::Sqlite.sql();

        let col = make_column(DataTypeClass::Varchar, 50, 0);
        assert_eq!(TypeResolver::sql_type(sqlite, &col).unwrap(), "TEXT");

        let col = make_column(DataTypeClass::Numeric, 10, 2);
        assert_eq!(TypeResolver::sql_type(sqlite, &col).unwrap(), "NUMERIC");
    }

    #[test]
    fn test_unmapped_class() {
        let col = make_column(DataTypeClass::Unrecognised("77".to_string()), 0, 0);
        assert!(TypeResolver::sql_type(Dialect::Sqlite.sql(), &col).is_none());
        assert!(TypeResolver::host_type(&col.data_type_class).is_none());
    }

    #[test]
    fn test_host_types() {
        assert_eq!(TypeResolver::host_type(&DataTypeClass::Serial), Some("int"));
        assert_eq!(TypeResolver::host_type(&DataTypeClass::Numeric), Some("float64"));
        assert_eq!(TypeResolver::host_type(&DataTypeClass::Date), Some("string"));
    }
}
