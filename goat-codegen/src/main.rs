//! CLI entry point for goat-codegen

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use goat_codegen::codegen::{self, RepositoryOptions};
use goat_codegen::config::CodegenConfig;
use goat_codegen::schema::{InMemorySchemaStore, SchemaStore};
use goat_codegen::{CodegenService, Dialect, GenerationReport, MissingTablePolicy};

#[derive(Parser)]
#[command(name = "goat-codegen")]
#[command(about = "Generate SQL schema scripts and Go CRUD scaffolds from table metadata")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to JSON schema snapshot (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Staging directory (overrides config)
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Target dialect: sqlite or postgresql (overrides config)
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// Missing or deleted tables: skip or fail (overrides config)
    #[arg(long)]
    on_missing_table: Option<MissingTablePolicy>,

    /// Dry run - print generated text without staging files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the schema script (CREATE TABLE + triggers)
    Ddl {
        /// Table ids in output order, comma-separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        tables: Vec<i64>,
    },
    /// Generate entity and repository sources as a zip archive
    Scaffold {
        /// Table ids in output order, comma-separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        tables: Vec<i64>,
    },
    /// Inspect snapshot (show tables and columns for debugging)
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = CodegenConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(dir) = cli.staging_dir {
        config.staging_dir = dir;
    }
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    if let Some(policy) = cli.on_missing_table {
        config.on_missing_table = policy;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    if config.schema_file.as_os_str().is_empty() {
        bail!("schema_file is required (use --schema or set it in the config file)");
    }
    config.validate()?;

    let store = InMemorySchemaStore::from_file(&config.schema_file)?;
    let dialect = config.dialect;
    let service = CodegenService::new(store, config);

    match &cli.command {
        Commands::Inspect => inspect_snapshot(service.store()),
        Commands::Ddl { tables } if service.config().dry_run => {
            let loaded = service.load_tables(tables)?;
            let rendered = codegen::render_schema_script(dialect, &loaded.tables);
            print!("{}", rendered.output);
            Ok(())
        }
        Commands::Scaffold { tables } if service.config().dry_run => {
            let loaded = service.load_tables(tables)?;
            let options = RepositoryOptions {
                go_module: service.config().go_module.clone(),
                select_all: service.config().generate_select_all,
            };
            let rendered = codegen::render_source_tree(dialect, &loaded.tables, &options);
            for (path, content) in &rendered.output {
                println!("// ===== {} =====", path.display());
                println!("{}", content);
            }
            Ok(())
        }
        Commands::Ddl { tables } => {
            let report = service.generate_schema_script(dialect, tables)?;
            print_report(&report);
            Ok(())
        }
        Commands::Scaffold { tables } => {
            let report = service.generate_source_scaffold(dialect, tables)?;
            print_report(&report);
            Ok(())
        }
    }
}

fn print_report(report: &GenerationReport) {
    info!(
        "Generated {} tables ({} dialect)",
        report.generated.len(),
        report.dialect
    );
    println!("{}", report.path().display());

    for skipped in &report.skipped {
        eprintln!("skipped table {}: {}", skipped.table_id, skipped.reason);
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    for failure in &report.write_failures {
        eprintln!(
            "write failed: {}: {}",
            failure.path.display(),
            failure.message
        );
    }
}

fn inspect_snapshot(store: &InMemorySchemaStore) -> Result<()> {
    let tables = store.tables();
    println!("Snapshot holds {} tables:\n", tables.len());

    for table in tables {
        let deleted = if table.deleted { " (deleted)" } else { "" };
        println!("Table {}: {}{}", table.id, table.name, deleted);
        if !table.logical_name.is_empty() {
            println!("  Logical name: {}", table.logical_name);
        }
        println!("  Columns:");
        for col in store.get_columns(table.id)? {
            let mut flags = Vec::new();
            if col.primary_key {
                flags.push("PK");
            }
            if col.not_null {
                flags.push("NOT NULL");
            }
            if col.unique {
                flags.push("UNIQUE");
            }
            if col.deleted {
                flags.push("deleted");
            }
            println!(
                "    - [{}] {} {}({},{}) {}",
                col.align_seq,
                col.name,
                col.data_type_class,
                col.precision,
                col.scale,
                flags.join(" ")
            );
        }
        println!();
    }

    Ok(())
}
