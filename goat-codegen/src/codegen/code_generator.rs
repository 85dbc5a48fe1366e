//! Main code generator orchestrator
//!
//! Pure rendering: metadata in, text out. Nothing here touches the
//! filesystem; staging and archiving belong to the packager.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use super::ddl_generator::generate_schema_script;
use super::dialect::Dialect;
use super::entity_generator::{entity_file_path, generate_entity};
use super::repository_generator::{generate_repository, repository_file_path, RepositoryOptions};
use crate::report::{GenerationWarning, Rendered};
use crate::schema::TableSchema;

/// Render the schema script for `tables`, in order
pub fn render_schema_script(dialect: Dialect, tables: &[TableSchema]) -> Rendered<String> {
    generate_schema_script(dialect, tables)
}

/// Render the entity and repository files for `tables`
///
/// Keys are paths relative to the source tree root.
pub fn render_source_tree(
    dialect: Dialect,
    tables: &[TableSchema],
    options: &RepositoryOptions,
) -> Rendered<BTreeMap<PathBuf, String>> {
    let mut warnings = Vec::new();
    let mut files: BTreeMap<PathBuf, String> = BTreeMap::new();

    for table in tables {
        debug!("Rendering source files for {}", table.name());
        let entity_path = entity_file_path(table);
        let repository_path = repository_file_path(table);

        // First table to claim a path keeps it
        if let Some(path) = [&entity_path, &repository_path]
            .into_iter()
            .find(|p| files.contains_key(*p))
        {
            warnings.push(GenerationWarning::PathCollision {
                table_id: table.table.id,
                table: table.name().to_string(),
                path: path.clone(),
            });
            continue;
        }

        files.insert(entity_path, generate_entity(table, &mut warnings));
        files.insert(
            repository_path,
            generate_repository(dialect, table, options, &mut warnings),
        );
    }

    Rendered {
        output: files,
        warnings,
    }
}

/// Main code generator bound to one dialect and scaffold options
pub struct CodeGenerator {
    dialect: Dialect,
    options: RepositoryOptions,
}

impl CodeGenerator {
    /// Create a new code generator
    pub fn new(dialect: Dialect, options: RepositoryOptions) -> Self {
        Self { dialect, options }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Render the schema script
    pub fn schema_script(&self, tables: &[TableSchema]) -> Rendered<String> {
        render_schema_script(self.dialect, tables)
    }

    /// Render the source tree
    pub fn source_tree(&self, tables: &[TableSchema]) -> Rendered<BTreeMap<PathBuf, String>> {
        render_source_tree(self.dialect, tables, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDefinition, DataTypeClass, TableDefinition};

    fn make_table(id: i64, name: &str, columns: &[(&str, DataTypeClass, bool)]) -> TableSchema {
        let columns = columns
            .iter()
            .enumerate()
            .map(|(i, (col, class, pk))| ColumnDefinition {
                id: i as i64,
                table_id: id,
                name: col.to_string(),
                logical_name: String::new(),
                data_type_class: class.clone(),
                precision: 0,
                scale: 0,
                primary_key: *pk,
                not_null: false,
                unique: false,
                default_value: String::new(),
                remark: String::new(),
                align_seq: i as i32,
                deleted: false,
            })
            .collect();
        TableSchema::new(
            TableDefinition {
                id,
                project_id: 1,
                name: name.to_string(),
                logical_name: String::new(),
                deleted: false,
            },
            columns,
        )
    }

    fn generator(dialect: Dialect) -> CodeGenerator {
        CodeGenerator::new(
            dialect,
            RepositoryOptions {
                go_module: "example.com/app".to_string(),
                select_all: false,
            },
        )
    }

    #[test]
    fn test_source_tree_layout() {
        let tables = vec![
            make_table(1, "user", &[("user_id", DataTypeClass::Serial, true)]),
            make_table(2, "user_project", &[("role", DataTypeClass::Text, false)]),
        ];
        let rendered = generator(Dialect::Postgresql).source_tree(&tables);

        let paths: Vec<PathBuf> = rendered.output.keys().cloned().collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("model/entity/User.go"),
                PathBuf::from("model/entity/UserProject.go"),
                PathBuf::from("model/repository/user-project.go"),
                PathBuf::from("model/repository/user.go"),
            ]
        );
    }

    #[test]
    fn test_colliding_paths_keep_first_table() {
        let tables = vec![
            make_table(1, "user_name", &[("id", DataTypeClass::Serial, true)]),
            make_table(2, "user-name", &[("id", DataTypeClass::Serial, true)]),
            make_table(3, "audit", &[("message", DataTypeClass::Text, false)]),
            make_table(4, "audit", &[("message", DataTypeClass::Text, false)]),
        ];
        let rendered = generator(Dialect::Sqlite).source_tree(&tables);

        assert_eq!(rendered.output.len(), 4);
        assert!(rendered.output[&PathBuf::from("model/entity/UserName.go")]
            .contains("maps table `user_name`"));
        let collisions: Vec<(i64, PathBuf)> = rendered
            .warnings
            .iter()
            .filter_map(|w| match w {
                GenerationWarning::PathCollision { table_id, path, .. } => {
                    Some((*table_id, path.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            collisions,
            vec![
                (2, PathBuf::from("model/repository/user-name.go")),
                (4, PathBuf::from("model/entity/Audit.go")),
            ]
        );
    }

    #[test]
    fn test_unmapped_warning_reported_once() {
        let tables = vec![make_table(
            1,
            "odd",
            &[("x", DataTypeClass::Unrecognised("77".to_string()), false)],
        )];
        let rendered = generator(Dialect::Sqlite).source_tree(&tables);
        assert_eq!(rendered.warnings.len(), 1);
    }

    #[test]
    fn test_schema_script_follows_dialect() {
        let tables = vec![make_table(1, "t", &[("id", DataTypeClass::Serial, true)])];
        let sqlite = generator(Dialect::Sqlite).schema_script(&tables).output;
        let postgres = generator(Dialect::Postgresql).schema_script(&tables).output;
        assert!(sqlite.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(postgres.contains("id SERIAL"));
    }
}
