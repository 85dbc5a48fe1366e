//! DDL generator - CREATE TABLE and update-timestamp trigger scripts

use tracing::debug;

use super::dialect::{Dialect, SqlDialect, CREATED_AT_COLUMN, UPDATED_AT_COLUMN};
use super::type_resolver::TypeResolver;
use crate::report::{GenerationWarning, Rendered};
use crate::schema::{ColumnDefinition, TableSchema};

/// Render the full schema script for tables in request order
///
/// All CREATE TABLE statements come first, then the trigger block. Output
/// depends only on the metadata and dialect.
pub fn generate_schema_script(dialect: Dialect, tables: &[TableSchema]) -> Rendered<String> {
    let sql = dialect.sql();
    let mut warnings = Vec::new();
    let mut statements: Vec<String> = Vec::new();

    for table in tables {
        debug!("Rendering CREATE TABLE {} ({})", table.name(), sql.name());
        statements.push(generate_create_table(sql, table, &mut warnings));
    }

    if !tables.is_empty() {
        statements.extend(sql.update_timestamp_function());
        statements.extend(tables.iter().map(|t| sql.update_trigger(t.name())));
    }

    let mut output = statements.join("\n\n");
    if !output.is_empty() {
        output.push('\n');
    }
    Rendered { output, warnings }
}

/// Render one CREATE TABLE statement
pub fn generate_create_table(
    sql: &dyn SqlDialect,
    table: &TableSchema,
    warnings: &mut Vec<GenerationWarning>,
) -> String {
    let inline_key = table
        .sole_serial_key()
        .filter(|_| sql.inline_serial_key_type().is_some())
        .map(|c| c.name.as_str());

    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|col| {
            let inline = inline_key == Some(col.name.as_str());
            format!("\t{}", generate_column(sql, table, col, inline, warnings))
        })
        .collect();

    for audit in [CREATED_AT_COLUMN, UPDATED_AT_COLUMN] {
        lines.push(format!("\t{} {}", audit, sql.audit_column_definition()));
    }

    if inline_key.is_none() {
        if let Some(pk) = generate_primary_key(table) {
            lines.push(format!("\t{}", pk));
        }
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        table.name(),
        lines.join(",\n")
    )
}

/// `name type constraints default`, skipping empty parts
fn generate_column(
    sql: &dyn SqlDialect,
    table: &TableSchema,
    col: &ColumnDefinition,
    inline_key: bool,
    warnings: &mut Vec<GenerationWarning>,
) -> String {
    let data_type = match (inline_key, sql.inline_serial_key_type()) {
        (true, Some(key_type)) => key_type.to_string(),
        _ => TypeResolver::sql_type(sql, col).unwrap_or_else(|| {
            warnings.push(GenerationWarning::UnmappedType {
                table: table.name().to_string(),
                column: col.name.clone(),
                class: col.data_type_class.to_string(),
            });
            String::new()
        }),
    };

    let parts = [
        Some(col.name.clone()),
        Some(data_type),
        generate_constraints(col),
        generate_default(col),
    ];

    parts
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `NOT NULL` and/or `UNIQUE`, `None` if neither applies
fn generate_constraints(col: &ColumnDefinition) -> Option<String> {
    let mut constraints = Vec::new();
    if col.not_null {
        constraints.push("NOT NULL");
    }
    if col.unique {
        constraints.push("UNIQUE");
    }
    if constraints.is_empty() {
        None
    } else {
        Some(constraints.join(" "))
    }
}

/// `DEFAULT <value>`: bare for Integer/Numeric, single-quoted otherwise
fn generate_default(col: &ColumnDefinition) -> Option<String> {
    if col.default_value.is_empty() {
        return None;
    }
    if col.data_type_class.is_numeric_literal() {
        Some(format!("DEFAULT {}", col.default_value))
    } else {
        Some(format!("DEFAULT '{}'", col.default_value.replace('\'', "''")))
    }
}

/// `PRIMARY KEY(a, b)` in `align_seq` order
fn generate_primary_key(table: &TableSchema) -> Option<String> {
    let keys: Vec<&str> = table
        .primary_keys()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if keys.is_empty() {
        None
    } else {
        Some(format!("PRIMARY KEY({})", keys.join(", ")))
    }
}
