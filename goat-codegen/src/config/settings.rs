//! Configuration settings for goat-codegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::defaults;
use crate::codegen::Dialect;
use crate::error::{CodegenError, Result};

/// What to do when a requested table cannot be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTablePolicy {
    /// Leave the table out and report it in the skip list
    Skip,
    /// Abort the invocation before anything is written
    Fail,
}

impl fmt::Display for MissingTablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingTablePolicy::Skip => f.write_str("skip"),
            MissingTablePolicy::Fail => f.write_str("fail"),
        }
    }
}

impl FromStr for MissingTablePolicy {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(MissingTablePolicy::Skip),
            "fail" => Ok(MissingTablePolicy::Fail),
            other => Err(CodegenError::ConfigError(format!(
                "on_missing_table must be 'skip' or 'fail', got '{}'",
                other
            ))),
        }
    }
}

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the JSON schema snapshot (CLI only)
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Directory under which scripts and source trees are staged
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Target SQL dialect
    #[serde(default = "default_dialect")]
    pub dialect: Dialect,

    /// Go module path prefixed to generated imports
    #[serde(default = "default_go_module")]
    pub go_module: String,

    /// Lookup failure policy
    #[serde(default = "default_on_missing_table")]
    pub on_missing_table: MissingTablePolicy,

    /// Emit `SelectAll` in generated repositories
    #[serde(default = "default_generate_select_all")]
    pub generate_select_all: bool,

    /// Dry run mode - print generated text instead of staging it
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_staging_dir() -> PathBuf {
    PathBuf::from(defaults::STAGING_DIR)
}
fn default_dialect() -> Dialect {
    defaults::DIALECT
}
fn default_go_module() -> String {
    defaults::GO_MODULE.to_string()
}
fn default_on_missing_table() -> MissingTablePolicy {
    defaults::ON_MISSING_TABLE
}
fn default_generate_select_all() -> bool {
    defaults::GENERATE_SELECT_ALL
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            staging_dir: default_staging_dir(),
            dialect: default_dialect(),
            go_module: default_go_module(),
            on_missing_table: default_on_missing_table(),
            generate_select_all: default_generate_select_all(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name("goat-codegen").required(false));
        }

        // GOAT_CODEGEN_STAGING_DIR -> staging_dir
        builder = builder.add_source(Environment::with_prefix("GOAT_CODEGEN").try_parsing(true));

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.staging_dir.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "staging_dir is required".into(),
            ));
        }

        if self.go_module.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "go_module is required".into(),
            ));
        }

        if self.go_module.chars().any(char::is_whitespace) {
            return Err(CodegenError::ValidationError(format!(
                "go_module must not contain whitespace: '{}'",
                self.go_module
            )));
        }

        if !self.schema_file.as_os_str().is_empty() && !self.schema_file.exists() {
            return Err(CodegenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = CodegenConfig::default();
        assert_eq!(config.staging_dir, PathBuf::from("./tmp"));
        assert_eq!(config.dialect, Dialect::Sqlite);
        assert_eq!(config.go_module, "example.com/app");
        assert_eq!(config.on_missing_table, MissingTablePolicy::Skip);
        assert!(!config.generate_select_all);
        assert!(config.log_level.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_schema() {
        let config = CodegenConfig {
            schema_file: PathBuf::from("/definitely/not/here.json"),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CodegenError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_go_module() {
        let config = CodegenConfig {
            go_module: "example.com/my app".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
            staging_dir = "out"
            dialect = "postgres"
            on_missing_table = "fail"
            generate_select_all = true
            log_level = "debug"
        "#;
        let config: CodegenConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.staging_dir, PathBuf::from("out"));
        assert_eq!(config.dialect, Dialect::Postgresql);
        assert_eq!(config.on_missing_table, MissingTablePolicy::Fail);
        assert!(config.generate_select_all);
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.go_module, "example.com/app");
    }

    #[test]
    fn test_from_file_rejects_unknown_dialect() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "dialect = \"mysql\"").unwrap();
        assert!(matches!(
            CodegenConfig::from_file(file.path()),
            Err(CodegenError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "go_module = \"github.com/acme/shop\"").unwrap();
        writeln!(file, "dialect = \"sqlite3\"").unwrap();

        let config = CodegenConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.go_module, "github.com/acme/shop");
        assert_eq!(config.dialect, Dialect::Sqlite);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "Fail".parse::<MissingTablePolicy>().unwrap(),
            MissingTablePolicy::Fail
        );
        assert!("retry".parse::<MissingTablePolicy>().is_err());
    }
}
