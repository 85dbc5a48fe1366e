//! Repository generator - Go CRUD data-access unit per table
//!
//! Every repository gets an interface, an implementation struct over
//! `*sql.DB` and a constructor returning the interface. `Insert` is always
//! present; `Select`, `Update` and `Delete` address a single row through the
//! primary key and are only emitted for tables that declare one.

use std::path::PathBuf;
use tracing::debug;

use super::dialect::{Dialect, SqlDialect, CREATED_AT_COLUMN, UPDATED_AT_COLUMN};
use super::naming::{
    column_variable_name, escape_identifier, to_file_slug, to_lower_camel_case, to_pascal_case,
    type_abbreviation,
};
use super::type_resolver::TypeResolver;
use crate::report::GenerationWarning;
use crate::schema::{ColumnDefinition, TableSchema};

/// Directory holding repository files inside the source tree
pub const REPOSITORY_ROOT: &str = "model/repository";

/// Options shared by every generated repository
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Go module path used in import statements
    pub go_module: String,
    /// Also emit `SelectAll`
    pub select_all: bool,
}

/// Relative path of a table's repository file
pub fn repository_file_path(table: &TableSchema) -> PathBuf {
    PathBuf::from(REPOSITORY_ROOT).join(to_file_slug(table.name()))
}

/// Generate the repository source for a table
pub fn generate_repository(
    dialect: Dialect,
    table: &TableSchema,
    options: &RepositoryOptions,
    warnings: &mut Vec<GenerationWarning>,
) -> String {
    let ctx = RepositoryContext::new(dialect.sql(), table);
    debug!(
        "Generating repository {} for {} ({} key columns)",
        ctx.interface_name,
        table.name(),
        ctx.key_params.len()
    );

    let has_key = !ctx.key_params.is_empty();
    let has_update = has_key && !ctx.update_columns().is_empty();
    if has_key && !has_update {
        warnings.push(GenerationWarning::EmptyUpdate {
            table: table.name().to_string(),
        });
    }

    let mut signatures = vec![ctx.insert_signature()];
    if has_key {
        signatures.push(ctx.select_signature());
        if has_update {
            signatures.push(ctx.update_signature());
        }
        signatures.push(ctx.delete_signature());
    }
    if options.select_all {
        signatures.push(ctx.select_all_signature());
    }

    let mut code = String::new();
    code.push_str(&generate_header(&options.go_module));
    code.push_str(&ctx.generate_interface(&signatures));
    code.push_str("\n\n\n");
    code.push_str(&ctx.generate_constructor());

    let mut methods = vec![ctx.generate_insert()];
    if has_key {
        methods.push(ctx.generate_select());
        if has_update {
            methods.push(ctx.generate_update());
        }
        methods.push(ctx.generate_delete());
    }
    if options.select_all {
        methods.push(ctx.generate_select_all());
    }

    for method in methods {
        code.push_str("\n\n\n");
        code.push_str(&method);
    }
    code.push('\n');
    code
}

fn generate_header(go_module: &str) -> String {
    format!(
        "package repository\n\n\n\
         import (\n\
         \t\"database/sql\"\n\n\
         \t\"{module}/internal/core/db\"\n\
         \t\"{module}/internal/model/entity\"\n\
         )\n\n\n",
        module = go_module
    )
}

/// Identifiers the generated method bodies declare or import themselves
const GENERATED_LOCALS: [&str; 7] = ["rep", "err", "ret", "rows", "db", "sql", "entity"];

/// Escape `base` until it is neither a Go keyword, a generated local nor
/// already `taken` in the same method scope, then claim it
fn local_identifier(base: String, taken: &mut Vec<String>) -> String {
    let mut name = escape_identifier(&base);
    while GENERATED_LOCALS.contains(&name.as_str()) || taken.contains(&name) {
        name.push('_');
    }
    taken.push(name.clone());
    name
}

/// Names and key parameters derived once per table
struct RepositoryContext<'a> {
    sql: &'a dyn SqlDialect,
    table: &'a TableSchema,
    entity_name: String,
    interface_name: String,
    impl_name: String,
    alias: String,
    /// (column, variable name, Go type) per primary-key column
    key_params: Vec<(&'a ColumnDefinition, String, &'static str)>,
}

impl<'a> RepositoryContext<'a> {
    fn new(sql: &'a dyn SqlDialect, table: &'a TableSchema) -> Self {
        let entity_name = to_pascal_case(table.name());
        let mut taken = Vec::new();
        let alias = local_identifier(type_abbreviation(&entity_name), &mut taken);
        let key_params = table
            .primary_keys()
            .into_iter()
            .map(|col| {
                let var =
                    local_identifier(column_variable_name(table.name(), &col.name), &mut taken);
                let host = TypeResolver::host_type(&col.data_type_class).unwrap_or_default();
                (col, var, host)
            })
            .collect();

        Self {
            sql,
            table,
            interface_name: format!("{}Repository", entity_name),
            impl_name: format!("{}Repository", to_lower_camel_case(table.name())),
            alias,
            entity_name,
            key_params,
        }
    }

    fn table_name(&self) -> &str {
        self.table.name()
    }

    /// `id int, projectId int`
    fn key_param_list(&self) -> String {
        self.key_params
            .iter()
            .map(|(_, var, host)| format!("{} {}", var, host))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn entity_param(&self) -> String {
        format!("{} *entity.{}", self.alias, self.entity_name)
    }

    fn update_columns(&self) -> Vec<&'a ColumnDefinition> {
        self.table
            .columns
            .iter()
            .filter(|c| !c.data_type_class.is_serial())
            .collect()
    }

    // ── signatures ───────────────────────────────────────────────────────

    fn insert_signature(&self) -> String {
        format!("Insert({}) error", self.entity_param())
    }

    fn select_signature(&self) -> String {
        format!(
            "Select({}) (entity.{}, error)",
            self.key_param_list(),
            self.entity_name
        )
    }

    fn update_signature(&self) -> String {
        format!(
            "Update({}, {}) error",
            self.key_param_list(),
            self.entity_param()
        )
    }

    fn delete_signature(&self) -> String {
        format!("Delete({}) error", self.key_param_list())
    }

    fn select_all_signature(&self) -> String {
        format!("SelectAll() ([]entity.{}, error)", self.entity_name)
    }

    // ── scaffolding ──────────────────────────────────────────────────────

    fn generate_interface(&self, signatures: &[String]) -> String {
        let mut code = format!("type {} interface {{\n", self.interface_name);
        for sig in signatures {
            code.push_str(&format!("\t{}\n", sig));
        }
        code.push('}');
        code
    }

    fn generate_constructor(&self) -> String {
        format!(
            "type {impl_name} struct {{\n\
             \tdb *sql.DB\n\
             }}\n\n\n\
             func New{interface}() {interface} {{\n\
             \tdb := db.GetDB()\n\
             \treturn &{impl_name}{{db}}\n\
             }}",
            impl_name = self.impl_name,
            interface = self.interface_name,
        )
    }

    fn method_header(&self, signature: &str) -> String {
        format!("func (rep *{}) {} {{\n", self.impl_name, signature)
    }

    // ── SQL fragments ────────────────────────────────────────────────────

    /// One column per line inside a raw string literal
    fn column_lines(names: &[&str]) -> String {
        names
            .iter()
            .map(|n| format!("\t\t\t{}", n))
            .collect::<Vec<_>>()
            .join(",\n")
    }

    /// Every column plus the audit columns
    fn select_column_names(&self) -> Vec<&str> {
        self.table
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .chain([CREATED_AT_COLUMN, UPDATED_AT_COLUMN])
            .collect()
    }

    /// Scan targets matching `select_column_names`
    fn scan_targets(&self, target: &str, indent: &str) -> String {
        self.table
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .chain([CREATED_AT_COLUMN, UPDATED_AT_COLUMN])
            .map(|n| format!("{}&{}.{},\n", indent, target, to_pascal_case(n)))
            .collect()
    }

    /// WHERE clause over the key columns, numbering placeholders from `first`
    fn where_clause(&self, first: usize) -> String {
        let predicates: Vec<String> = self
            .key_params
            .iter()
            .enumerate()
            .map(|(i, (col, _, _))| format!("{} = {}", col.name, self.sql.placeholder(first + i)))
            .collect();
        format!("\t\t WHERE {}", predicates.join("\n\t\t   AND "))
    }

    fn key_args(&self) -> String {
        self.key_params
            .iter()
            .map(|(_, var, _)| format!("\t\t{},\n", var))
            .collect()
    }

    fn entity_args(&self, columns: &[&ColumnDefinition]) -> String {
        columns
            .iter()
            .map(|c| format!("\t\t{}.{},\n", self.alias, to_pascal_case(&c.name)))
            .collect()
    }

    // ── methods ──────────────────────────────────────────────────────────

    fn generate_insert(&self) -> String {
        let columns = self.table.insertable_columns();
        let mut code = self.method_header(&self.insert_signature());
        code.push_str("\t_, err := rep.db.Exec(\n");

        if columns.is_empty() {
            code.push_str(&format!(
                "\t\t`INSERT INTO {} DEFAULT VALUES`,\n",
                self.table_name()
            ));
        } else {
            let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
            let placeholders: Vec<String> =
                (1..=columns.len()).map(|i| self.sql.placeholder(i)).collect();
            code.push_str(&format!(
                "\t\t`INSERT INTO {} (\n{}\n\t\t ) VALUES({})`,\n",
                self.table_name(),
                Self::column_lines(&names),
                placeholders.join(",")
            ));
            code.push_str(&self.entity_args(&columns));
        }

        code.push_str("\t)\n\n\treturn err\n}");
        code
    }

    fn generate_select(&self) -> String {
        let mut code = self.method_header(&self.select_signature());
        code.push_str(&format!("\tvar ret entity.{}\n\n", self.entity_name));
        code.push_str("\terr := rep.db.QueryRow(\n");
        code.push_str(&format!(
            "\t\t`SELECT\n{}\n\t\t FROM {}\n{}`,\n",
            Self::column_lines(&self.select_column_names()),
            self.table_name(),
            self.where_clause(1)
        ));
        code.push_str(&self.key_args());
        code.push_str("\t).Scan(\n");
        code.push_str(&self.scan_targets("ret", "\t\t"));
        code.push_str("\t)\n\n\treturn ret, err\n}");
        code
    }

    fn generate_update(&self) -> String {
        let columns = self.update_columns();
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("\t\t\t{} = {}", c.name, self.sql.placeholder(i + 1)))
            .collect();

        let mut code = self.method_header(&self.update_signature());
        code.push_str("\t_, err := rep.db.Exec(\n");
        code.push_str(&format!(
            "\t\t`UPDATE {}\n\t\t SET\n{}\n{}`,\n",
            self.table_name(),
            assignments.join(",\n"),
            self.where_clause(columns.len() + 1)
        ));
        code.push_str(&self.entity_args(&columns));
        code.push_str(&self.key_args());
        code.push_str("\t)\n\n\treturn err\n}");
        code
    }

    fn generate_delete(&self) -> String {
        let mut code = self.method_header(&self.delete_signature());
        code.push_str("\t_, err := rep.db.Exec(\n");
        code.push_str(&format!(
            "\t\t`DELETE FROM {}\n{}`,\n",
            self.table_name(),
            self.where_clause(1)
        ));
        code.push_str(&self.key_args());
        code.push_str("\t)\n\n\treturn err\n}");
        code
    }

    fn generate_select_all(&self) -> String {
        let row = &self.alias;
        let mut code = self.method_header(&self.select_all_signature());
        code.push_str(&format!("\tvar ret []entity.{}\n\n", self.entity_name));
        code.push_str("\trows, err := rep.db.Query(\n");
        code.push_str(&format!(
            "\t\t`SELECT\n{}\n\t\t FROM {}`,\n",
            Self::column_lines(&self.select_column_names()),
            self.table_name()
        ));
        code.push_str("\t)\n\n");
        code.push_str("\tif err != nil {\n\t\treturn nil, err\n\t}\n");
        code.push_str("\tdefer rows.Close()\n\n");
        code.push_str("\tfor rows.Next() {\n");
        code.push_str(&format!("\t\t{} := entity.{}{{}}\n", row, self.entity_name));
        code.push_str("\t\terr = rows.Scan(\n");
        code.push_str(&self.scan_targets(row, "\t\t\t"));
        code.push_str("\t\t)\n\t\tif err != nil {\n\t\t\tbreak\n\t\t}\n");
        code.push_str(&format!("\t\tret = append(ret, {})\n", row));
        code.push_str("\t}\n\n\treturn ret, err\n}");
        code
    }
}
