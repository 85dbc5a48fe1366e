//! Generation results: artifact handles plus partial-success details

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::codegen::Dialect;

/// Non-fatal problems found while rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationWarning {
    /// Classification missing from the type tables; rendered as an empty token
    UnmappedType {
        table: String,
        column: String,
        class: String,
    },
    /// Several live columns share one `align_seq`; declaration order breaks the tie
    DuplicateAlignSeq { table: String, align_seq: i32 },
    /// Every column is store-assigned, so no Update operation was emitted
    EmptyUpdate { table: String },
    /// An earlier table in the request already produced a file at `path`;
    /// this table was left out of the source tree
    PathCollision {
        table_id: i64,
        table: String,
        path: PathBuf,
    },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::UnmappedType {
                table,
                column,
                class,
            } => write!(
                f,
                "{}.{}: data type class '{}' has no mapping, type left empty",
                table, column, class
            ),
            GenerationWarning::DuplicateAlignSeq { table, align_seq } => write!(
                f,
                "{}: align_seq {} is shared by more than one column",
                table, align_seq
            ),
            GenerationWarning::EmptyUpdate { table } => {
                write!(f, "{}: no updatable columns, Update omitted", table)
            }
            GenerationWarning::PathCollision {
                table_id,
                table,
                path,
            } => write!(
                f,
                "{} (id {}): {} is already generated by another table, skipped",
                table,
                table_id,
                path.display()
            ),
        }
    }
}

/// Output of a pure rendering pass
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered<T> {
    pub output: T,
    pub warnings: Vec<GenerationWarning>,
}

/// A requested table that produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTable {
    pub table_id: i64,
    pub reason: String,
}

/// A staged file or archive that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub message: String,
}

/// The artifact produced by one invocation
///
/// Identity is the staging path allocated at generation time, so two runs over
/// identical metadata yield equal contents under different paths.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedArtifact {
    DdlScript {
        path: PathBuf,
        text: String,
    },
    SourceTree {
        root: PathBuf,
        archive: PathBuf,
        /// Relative path -> file contents
        files: BTreeMap<PathBuf, String>,
    },
}

impl GeneratedArtifact {
    /// Handle returned to callers: the script file or the archive
    pub fn path(&self) -> &Path {
        match self {
            GeneratedArtifact::DdlScript { path, .. } => path,
            GeneratedArtifact::SourceTree { archive, .. } => archive,
        }
    }
}

/// Result of a generation entry point
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub dialect: Dialect,
    pub artifact: GeneratedArtifact,
    /// Names of tables rendered, in request order
    pub generated: Vec<String>,
    pub skipped: Vec<SkippedTable>,
    pub warnings: Vec<GenerationWarning>,
    pub write_failures: Vec<WriteFailure>,
}

impl GenerationReport {
    pub fn path(&self) -> &Path {
        self.artifact.path()
    }

    /// Every requested table rendered and every file written
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.write_failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = GenerationWarning::UnmappedType {
            table: "user".to_string(),
            column: "avatar".to_string(),
            class: "99".to_string(),
        };
        assert_eq!(
            w.to_string(),
            "user.avatar: data type class '99' has no mapping, type left empty"
        );

        let w = GenerationWarning::PathCollision {
            table_id: 7,
            table: "user-name".to_string(),
            path: PathBuf::from("model/repository/user-name.go"),
        };
        assert_eq!(
            w.to_string(),
            "user-name (id 7): model/repository/user-name.go is already generated by another table, skipped"
        );
    }

    #[test]
    fn test_report_completeness() {
        let mut report = GenerationReport {
            dialect: Dialect::Sqlite,
            artifact: GeneratedArtifact::DdlScript {
                path: PathBuf::from("tmp/ddl.sql"),
                text: String::new(),
            },
            generated: vec!["user".to_string()],
            skipped: vec![],
            warnings: vec![],
            write_failures: vec![],
        };
        assert!(report.is_complete());
        assert_eq!(report.path(), Path::new("tmp/ddl.sql"));

        report.skipped.push(SkippedTable {
            table_id: 9,
            reason: "Table not found: 9".to_string(),
        });
        assert!(!report.is_complete());
    }
}
