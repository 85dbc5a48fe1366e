//! Artifact packager - staging paths, file writes and zip archiving
//!
//! Every artifact lands under a fresh path
//! `<staging_dir>/<prefix>-<YYYY-MM-DD-HH-MM-SS>-<7 random chars>`. Uniqueness
//! is probabilistic: two calls in the same second collide only if their
//! random suffixes do too.
//!
//! Only failing to create the staging location is an error. Individual file
//! and archive failures are logged and handed back as [`WriteFailure`]s so the
//! caller can still return the computed path.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Local;
use tracing::{debug, error, info};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::codegen::{ENTITY_ROOT, REPOSITORY_ROOT};
use crate::error::{CodegenError, Result};
use crate::report::WriteFailure;

/// Prefix of schema script file names
pub const DDL_PREFIX: &str = "ddl";

/// Prefix of source tree directories and archives
pub const SCAFFOLD_PREFIX: &str = "goat";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
const SUFFIX_LEN: usize = 7;

/// Paths produced by staging a source tree
#[derive(Debug, Clone)]
pub struct StagedTree {
    pub root: PathBuf,
    pub archive: PathBuf,
    pub write_failures: Vec<WriteFailure>,
}

/// Writes artifacts below a staging directory
#[derive(Debug, Clone)]
pub struct Packager {
    staging_dir: PathBuf,
}

impl Packager {
    pub fn new(staging_dir: impl AsRef<Path>) -> Self {
        Self {
            staging_dir: staging_dir.as_ref().to_path_buf(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Allocate a fresh, not yet existing path for `prefix`
    pub fn staging_path(&self, prefix: &str) -> PathBuf {
        self.staging_dir.join(staging_name(prefix))
    }

    /// Write a schema script to `ddl-<stamp>.sql`
    pub fn stage_script(&self, text: &str) -> Result<(PathBuf, Vec<WriteFailure>)> {
        self.ensure_dir(&self.staging_dir)?;

        let mut path = self.staging_path(DDL_PREFIX);
        path.set_extension("sql");
        info!("Staging schema script at {}", path.display());

        let failures = write_file(&path, text).into_iter().collect();
        Ok((path, failures))
    }

    /// Write a source tree under `goat-<stamp>/` and archive it as `goat-<stamp>.zip`
    ///
    /// `files` maps paths relative to the tree root to file contents.
    pub fn stage_source_tree(&self, files: &BTreeMap<PathBuf, String>) -> Result<StagedTree> {
        let root = self.staging_path(SCAFFOLD_PREFIX);
        let mut archive = root.clone();
        archive.set_extension("zip");

        for dir in [ENTITY_ROOT, REPOSITORY_ROOT] {
            self.ensure_dir(&root.join(dir))?;
        }
        info!("Staging source tree at {}", root.display());

        let mut write_failures: Vec<WriteFailure> = files
            .iter()
            .filter_map(|(rel, content)| write_file(&root.join(rel), content))
            .collect();

        if let Err(e) = archive_dir(&root, &archive) {
            error!("Failed to archive {}: {}", root.display(), e);
            write_failures.push(WriteFailure {
                path: archive.clone(),
                message: e.to_string(),
            });
        }

        Ok(StagedTree {
            root,
            archive,
            write_failures,
        })
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| {
            CodegenError::IoError(io::Error::new(
                e.kind(),
                format!("Failed to create staging directory {}: {}", dir.display(), e),
            ))
        })
    }
}

/// `<prefix>-<local timestamp>-<random suffix>`
pub fn staging_name(prefix: &str) -> String {
    let stamp = Local::now().format(TIMESTAMP_FORMAT);
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect();
    format!("{}-{}-{}", prefix, stamp, suffix)
}

/// Write one file, creating parent directories; a failure is logged and returned
pub fn write_file(path: &Path, content: &str) -> Option<WriteFailure> {
    let result = match path.parent() {
        Some(parent) => fs::create_dir_all(parent).and_then(|_| fs::write(path, content)),
        None => fs::write(path, content),
    };

    match result {
        Ok(()) => {
            debug!("Wrote {}", path.display());
            None
        }
        Err(e) => {
            error!("Failed to write {}: {}", path.display(), e);
            Some(WriteFailure {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }
}

/// Zip every entry below `root` into `zip_path`, names relative to `root`
pub fn archive_dir(root: &Path, zip_path: &Path) -> Result<()> {
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| CodegenError::ArchiveError(e.to_string()))?;
        if rel.as_os_str().is_empty() {
            continue;
        }

        let name = entry_name(rel);
        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
        }
    }

    zip.finish()?;
    debug!("Archived {} into {}", root.display(), zip_path.display());
    Ok(())
}

/// Archive entry names always use `/`
fn entry_name(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn test_staging_name_shape() {
        let name = staging_name("ddl");
        // ddl-YYYY-MM-DD-HH-MM-SS-xxxxxxx
        let parts: Vec<&str> = name.split('-').collect();
        assert_eq!(parts.len(), 8);
        assert_eq!(parts[0], "ddl");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[7].len(), SUFFIX_LEN);
        assert!(parts[7].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_staging_paths_differ() {
        let packager = Packager::new("tmp");
        assert_ne!(packager.staging_path("goat"), packager.staging_path("goat"));
    }

    #[test]
    fn test_stage_script() {
        let dir = TempDir::new().unwrap();
        let packager = Packager::new(dir.path().join("staging"));

        let (path, failures) = packager.stage_script("CREATE TABLE t (x TEXT);\n").unwrap();
        assert!(failures.is_empty());
        assert_eq!(path.extension().unwrap(), "sql");
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("ddl-"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "CREATE TABLE t (x TEXT);\n"
        );
    }

    #[test]
    fn test_stage_source_tree_archives_relative_entries() {
        let dir = TempDir::new().unwrap();
        let packager = Packager::new(dir.path());

        let mut files = BTreeMap::new();
        files.insert(
            PathBuf::from("model/entity/User.go"),
            "package entity\n".to_string(),
        );
        files.insert(
            PathBuf::from("model/repository/user.go"),
            "package repository\n".to_string(),
        );

        let staged = packager.stage_source_tree(&files).unwrap();
        assert!(staged.write_failures.is_empty());
        assert!(staged.root.join("model/entity/User.go").is_file());
        assert_eq!(staged.archive.extension().unwrap(), "zip");

        let mut archive = ZipArchive::new(File::open(&staged.archive).unwrap()).unwrap();
        let mut entity = String::new();
        archive
            .by_name("model/entity/User.go")
            .unwrap()
            .read_to_string(&mut entity)
            .unwrap();
        assert_eq!(entity, "package entity\n");
        assert!(archive.by_name("model/repository/user.go").is_ok());
    }

    #[test]
    fn test_empty_tree_still_has_roots() {
        let dir = TempDir::new().unwrap();
        let packager = Packager::new(dir.path());

        let staged = packager.stage_source_tree(&BTreeMap::new()).unwrap();
        assert!(staged.root.join(ENTITY_ROOT).is_dir());
        assert!(staged.root.join(REPOSITORY_ROOT).is_dir());
        assert!(staged.archive.is_file());
    }

    #[test]
    fn test_write_failure_is_recorded() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let failure = write_file(&blocker.join("child.go"), "x").unwrap();
        assert_eq!(failure.path, blocker.join("child.go"));
    }

    #[test]
    fn test_unwritable_staging_dir_is_hard_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let packager = Packager::new(&blocker);
        assert!(packager.stage_script("x").is_err());
        assert!(packager.stage_source_tree(&BTreeMap::new()).is_err());
    }
}
