//! SQL dialects (Strategy pattern)
//!
//! Everything that differs between database families lives behind
//! [`SqlDialect`]: type keywords, precision rendering, bind placeholders,
//! audit column definitions and update-timestamp triggers. Generators only
//! talk to the trait, so a new family is one more implementation plus a
//! [`Dialect`] variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::type_resolver::{TypeTable, POSTGRES_TYPES, SQLITE_TYPES};
use crate::error::CodegenError;
use crate::schema::DataTypeClass;

/// Audit column holding the row creation time
pub const CREATED_AT_COLUMN: &str = "create_at";

/// Audit column refreshed on every update
pub const UPDATED_AT_COLUMN: &str = "update_at";

/// Supported target database families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "sqlite3")]
    Sqlite,
    #[serde(alias = "postgres")]
    Postgresql,
}

impl Dialect {
    /// Identifier as accepted on the command line and in config
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgresql => "postgresql",
        }
    }

    /// Syntax strategy for this dialect
    pub fn sql(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Sqlite => &SqliteDialect,
            Dialect::Postgresql => &PostgresDialect,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgresql" | "postgres" => Ok(Dialect::Postgresql),
            other => Err(CodegenError::UnsupportedDialect(other.to_string())),
        }
    }
}

/// Dialect-specific SQL syntax
pub trait SqlDialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Base keyword table for column types
    fn type_table(&self) -> &'static TypeTable;

    /// Length / precision suffix appended to the base keyword, if any
    fn size_suffix(&self, _class: &DataTypeClass, _precision: u32, _scale: u32) -> Option<String> {
        None
    }

    /// Column type used in place of the mapped keyword when a Serial column is
    /// the sole primary key and the key must be declared inline
    fn inline_serial_key_type(&self) -> Option<&'static str> {
        None
    }

    /// Bind placeholder for the 1-based parameter `index`
    fn placeholder(&self, index: usize) -> String;

    /// Type, constraints and default shared by both audit columns
    fn audit_column_definition(&self) -> &'static str;

    /// Shared maintenance function emitted once ahead of the triggers
    fn update_timestamp_function(&self) -> Option<String> {
        None
    }

    /// Trigger keeping `update_at` current for one table
    fn update_trigger(&self, table_name: &str) -> String;
}

/// SQLite-family dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_table(&self) -> &'static TypeTable {
        &SQLITE_TYPES
    }

    fn inline_serial_key_type(&self) -> Option<&'static str> {
        // AUTOINCREMENT is only legal on an inline INTEGER PRIMARY KEY
        Some("INTEGER PRIMARY KEY AUTOINCREMENT")
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn audit_column_definition(&self) -> &'static str {
        "TEXT NOT NULL DEFAULT (DATETIME('now', 'localtime'))"
    }

    fn update_trigger(&self, table_name: &str) -> String {
        format!(
            "CREATE TRIGGER IF NOT EXISTS trg_{table}_upd AFTER UPDATE ON {table}\n\
             BEGIN\n\
             \tUPDATE {table}\n\
             \tSET {updated} = DATETIME('now', 'localtime')\n\
             \tWHERE rowid == NEW.rowid;\n\
             END;",
            table = table_name,
            updated = UPDATED_AT_COLUMN,
        )
    }
}

/// PostgreSQL-family dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn type_table(&self) -> &'static TypeTable {
        &POSTGRES_TYPES
    }

    fn size_suffix(&self, class: &DataTypeClass, precision: u32, scale: u32) -> Option<String> {
        if precision == 0 {
            return None;
        }
        match class {
            DataTypeClass::Varchar | DataTypeClass::Char => Some(format!("({})", precision)),
            DataTypeClass::Numeric => Some(format!("({},{})", precision, scale)),
            _ => None,
        }
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn audit_column_definition(&self) -> &'static str {
        "TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"
    }

    fn update_timestamp_function(&self) -> Option<String> {
        Some(format!(
            "CREATE OR REPLACE FUNCTION set_update_time() RETURNS trigger AS $$\n\
             BEGIN\n\
             \tNEW.{updated} := CURRENT_TIMESTAMP;\n\
             \tRETURN NEW;\n\
             END;\n\
             $$ LANGUAGE plpgsql;",
            updated = UPDATED_AT_COLUMN,
        ))
    }

    fn update_trigger(&self, table_name: &str) -> String {
        // NEW can only be rewritten before the row is stored
        format!(
            "CREATE TRIGGER trg_{table}_upd BEFORE UPDATE ON {table} FOR EACH ROW\n\
             \tEXECUTE PROCEDURE set_update_time();",
            table = table_name,
        )
    }
}
