//! Default configuration values - single source of truth

use crate::codegen::Dialect;
use super::MissingTablePolicy;

/// Default directory under which artifacts are staged
pub const STAGING_DIR: &str = "./tmp";

/// Default target dialect
pub const DIALECT: Dialect = Dialect::Sqlite;

/// Default handling of requested tables the store cannot supply
pub const ON_MISSING_TABLE: MissingTablePolicy = MissingTablePolicy::Skip;

/// Default Go module path used in generated imports
pub const GO_MODULE: &str = "example.com/app";

/// Whether repositories get a `SelectAll` operation by default
pub const GENERATE_SELECT_ALL: bool = false;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;
