//! goat-codegen: Generate SQL schema scripts and Go CRUD scaffolds from table metadata
//!
//! Tables and columns defined elsewhere (a [`schema::SchemaStore`]) are turned
//! into two kinds of artifact:
//!
//! - A dialect-specific schema script: `CREATE TABLE` statements followed by
//!   triggers keeping an `update_at` audit column current (SQLite or
//!   PostgreSQL)
//! - A Go source tree: one entity struct and one `database/sql` repository per
//!   table, staged on disk and packaged as a zip archive
//!
//! Every invocation returns a [`GenerationReport`] carrying the artifact path
//! together with tables that were skipped, non-fatal warnings and any files
//! that could not be written.
//!
//! # Library usage
//!
//! ```rust,ignore
//! use goat_codegen::{CodegenBuilder, Dialect};
//! use goat_codegen::schema::InMemorySchemaStore;
//!
//! let store = InMemorySchemaStore::from_file("schema.json".as_ref())?;
//! let service = CodegenBuilder::new()
//!     .staging_dir("./tmp")
//!     .go_module("github.com/acme/shop")
//!     .build(store)?;
//!
//! let report = service.generate_source_scaffold(Dialect::Postgresql, &[1, 2, 3])?;
//! println!("archive: {}", report.path().display());
//! ```
//!
//! Rendering without touching the filesystem goes through
//! [`codegen::render_schema_script`] and [`codegen::render_source_tree`].
//!
//! # CLI Usage
//!
//! ```bash
//! goat-codegen --schema schema.json --dialect postgresql ddl --tables 1,2,3
//! goat-codegen --schema schema.json scaffold --tables 1,2
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod packager;
pub mod report;
pub mod schema;

use std::path::Path;

use tracing::{debug, info, warn};

pub use codegen::Dialect;
pub use config::{CodegenConfig, MissingTablePolicy};
pub use error::{CodegenError, Result};
pub use report::{GeneratedArtifact, GenerationReport, GenerationWarning, SkippedTable};

use codegen::{CodeGenerator, RepositoryOptions};
use packager::Packager;
use schema::{SchemaStore, TableSchema};

/// Tables fetched for one request, in request order
#[derive(Debug, Clone, Default)]
pub struct LoadedTables {
    pub tables: Vec<TableSchema>,
    pub skipped: Vec<SkippedTable>,
    pub warnings: Vec<GenerationWarning>,
}

/// Generation entry points over a schema store
pub struct CodegenService<S> {
    store: S,
    config: CodegenConfig,
}

impl<S: SchemaStore> CodegenService<S> {
    pub fn new(store: S, config: CodegenConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch each requested table and its columns, once per id
    ///
    /// Missing or deleted tables and store errors follow
    /// `config.on_missing_table`: skipped and reported, or returned as the
    /// error before anything is rendered.
    pub fn load_tables(&self, table_ids: &[i64]) -> Result<LoadedTables> {
        let mut loaded = LoadedTables::default();

        for &id in table_ids {
            match self.load_table(id) {
                Ok(table) => {
                    for align_seq in table.duplicate_align_seqs() {
                        debug!("{}: duplicate align_seq {}", table.name(), align_seq);
                        loaded.warnings.push(GenerationWarning::DuplicateAlignSeq {
                            table: table.name().to_string(),
                            align_seq,
                        });
                    }
                    loaded.tables.push(table);
                }
                Err(e) => match self.config.on_missing_table {
                    MissingTablePolicy::Fail => return Err(e),
                    MissingTablePolicy::Skip => {
                        warn!("Skipping table {}: {}", id, e);
                        loaded.skipped.push(SkippedTable {
                            table_id: id,
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        debug!(
            "Loaded {} of {} requested tables",
            loaded.tables.len(),
            table_ids.len()
        );
        Ok(loaded)
    }

    fn load_table(&self, id: i64) -> Result<TableSchema> {
        let table = self.store.get_table(id)?;
        if table.deleted {
            return Err(CodegenError::TableNotFound(id));
        }
        let columns = self.store.get_columns(id)?;
        Ok(TableSchema::new(table, columns))
    }

    fn generator(&self, dialect: Dialect) -> CodeGenerator {
        CodeGenerator::new(
            dialect,
            RepositoryOptions {
                go_module: self.config.go_module.clone(),
                select_all: self.config.generate_select_all,
            },
        )
    }

    /// Render the schema script for `table_ids` and stage it as `ddl-….sql`
    pub fn generate_schema_script(
        &self,
        dialect: Dialect,
        table_ids: &[i64],
    ) -> Result<GenerationReport> {
        info!(
            "Generating {} schema script for {} tables",
            dialect,
            table_ids.len()
        );
        let loaded = self.load_tables(table_ids)?;
        let rendered = self.generator(dialect).schema_script(&loaded.tables);

        let packager = Packager::new(&self.config.staging_dir);
        let (path, write_failures) = packager.stage_script(&rendered.output)?;

        let report = finish_report(
            dialect,
            GeneratedArtifact::DdlScript {
                path,
                text: rendered.output,
            },
            loaded,
            rendered.warnings,
            write_failures,
        );
        info!("Schema script staged at {}", report.path().display());
        Ok(report)
    }

    /// Render entity and repository files for `table_ids`, stage and archive them
    pub fn generate_source_scaffold(
        &self,
        dialect: Dialect,
        table_ids: &[i64],
    ) -> Result<GenerationReport> {
        info!(
            "Generating {} source scaffold for {} tables",
            dialect,
            table_ids.len()
        );
        let loaded = self.load_tables(table_ids)?;
        let rendered = self.generator(dialect).source_tree(&loaded.tables);

        let packager = Packager::new(&self.config.staging_dir);
        let staged = packager.stage_source_tree(&rendered.output)?;

        let report = finish_report(
            dialect,
            GeneratedArtifact::SourceTree {
                root: staged.root,
                archive: staged.archive,
                files: rendered.output,
            },
            loaded,
            rendered.warnings,
            staged.write_failures,
        );
        info!("Source scaffold archived at {}", report.path().display());
        Ok(report)
    }
}

fn finish_report(
    dialect: Dialect,
    artifact: GeneratedArtifact,
    loaded: LoadedTables,
    render_warnings: Vec<GenerationWarning>,
    write_failures: Vec<report::WriteFailure>,
) -> GenerationReport {
    let mut warnings = loaded.warnings;
    warnings.extend(render_warnings);
    for w in &warnings {
        warn!("{}", w);
    }

    let mut rendered = loaded.tables;
    let mut skipped = loaded.skipped;
    for w in &warnings {
        if let GenerationWarning::PathCollision { table_id, .. } = w {
            if let Some(pos) = rendered.iter().rposition(|t| t.table.id == *table_id) {
                rendered.remove(pos);
            }
            skipped.push(SkippedTable {
                table_id: *table_id,
                reason: w.to_string(),
            });
        }
    }

    GenerationReport {
        dialect,
        artifact,
        generated: rendered.iter().map(|t| t.name().to_string()).collect(),
        skipped,
        warnings,
        write_failures,
    }
}

/// Builder pattern for programmatic configuration
#[derive(Debug, Clone, Default)]
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: CodegenConfig) -> Self {
        Self { config }
    }

    /// Set the directory artifacts are staged under
    pub fn staging_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.staging_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the default dialect
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.config.dialect = dialect;
        self
    }

    /// Set the Go module path used in generated imports
    pub fn go_module(mut self, module: &str) -> Self {
        self.config.go_module = module.to_string();
        self
    }

    /// Abort on the first table the store cannot supply
    pub fn fail_on_missing_table(mut self) -> Self {
        self.config.on_missing_table = MissingTablePolicy::Fail;
        self
    }

    /// Add `SelectAll` to generated repositories
    pub fn with_select_all(mut self) -> Self {
        self.config.generate_select_all = true;
        self
    }

    /// Validate and bind to a store
    pub fn build<S: SchemaStore>(self, store: S) -> Result<CodegenService<S>> {
        self.config.validate()?;
        Ok(CodegenService::new(store, self.config))
    }
}
