//! Error types for goat-codegen

use thiserror::Error;

/// Result type alias for goat-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Schema store error: {0}")]
    StoreError(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Failed to load schema snapshot: {0}")]
    SnapshotError(String),

    #[error("Failed to build archive: {0}")]
    ArchiveError(String),
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for CodegenError {
    fn from(err: serde_json::Error) -> Self {
        CodegenError::SnapshotError(err.to_string())
    }
}

impl From<zip::result::ZipError> for CodegenError {
    fn from(err: zip::result::ZipError) -> Self {
        CodegenError::ArchiveError(err.to_string())
    }
}

impl From<walkdir::Error> for CodegenError {
    fn from(err: walkdir::Error) -> Self {
        CodegenError::ArchiveError(err.to_string())
    }
}
