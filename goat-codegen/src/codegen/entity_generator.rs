//! Entity generator - one Go struct per table

use std::path::PathBuf;
use tracing::debug;

use super::dialect::{CREATED_AT_COLUMN, UPDATED_AT_COLUMN};
use super::naming::{to_pascal_case, SOURCE_EXTENSION};
use super::type_resolver::TypeResolver;
use crate::report::GenerationWarning;
use crate::schema::TableSchema;

/// Directory holding entity files inside the source tree
pub const ENTITY_ROOT: &str = "model/entity";

/// Relative path of a table's entity file, named after the type
pub fn entity_file_path(table: &TableSchema) -> PathBuf {
    PathBuf::from(ENTITY_ROOT).join(format!(
        "{}.{}",
        to_pascal_case(table.name()),
        SOURCE_EXTENSION
    ))
}

/// Generate the entity source for a table
pub fn generate_entity(table: &TableSchema, warnings: &mut Vec<GenerationWarning>) -> String {
    let struct_name = to_pascal_case(table.name());
    debug!("Generating entity {} for {}", struct_name, table.name());

    let mut code = String::new();
    code.push_str("package entity\n\n\n");

    code.push_str(&format!("// {} maps table `{}`", struct_name, table.name()));
    if !table.table.logical_name.is_empty() {
        code.push_str(&format!(" ({})", table.table.logical_name));
    }
    code.push_str(".\n");
    code.push_str(&format!("type {} struct {{\n", struct_name));

    for col in &table.columns {
        let host_type = TypeResolver::host_type(&col.data_type_class).unwrap_or_else(|| {
            warnings.push(GenerationWarning::UnmappedType {
                table: table.name().to_string(),
                column: col.name.clone(),
                class: col.data_type_class.to_string(),
            });
            ""
        });
        code.push_str(&generate_field(&col.name, host_type));
        if !col.logical_name.is_empty() {
            code.push_str(&format!(" // {}", col.logical_name));
        }
        code.push('\n');
    }

    for audit in [CREATED_AT_COLUMN, UPDATED_AT_COLUMN] {
        code.push_str(&generate_field(audit, "string"));
        code.push('\n');
    }

    code.push_str("}\n");
    code
}

/// `\tFieldName type `db:"col" json:"col"``
fn generate_field(column_name: &str, host_type: &str) -> String {
    let tag = column_name.to_lowercase();
    format!(
        "\t{} {} `db:\"{}\" json:\"{}\"`",
        to_pascal_case(column_name),
        host_type,
        tag,
        tag
    )
}
