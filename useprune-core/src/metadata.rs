//! Installed-package database reader.
//!
//! The database is laid out as `<pkg_dir>/<category>/<name>-<version>/` with
//! one plain-text file per metadata key. A directory only counts as an
//! installed record when it carries the [`PRESENCE_MARKER`]; anything else
//! (merge leftovers, lock dirs) is skipped without error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::atom::{canonicalize, PackageIdentity};
use crate::error::{IoResultExt, UsePruneError, UsePruneResult};

/// Default location of the installed-package database.
pub const DEFAULT_PKG_DIR: &str = "/var/db/pkg";

/// File present in every genuine installed record.
pub const PRESENCE_MARKER: &str = "environment.bz2";

/// Enabled USE flags of the installed build.
pub const USE_FILE: &str = "USE";

/// `SLOT` or `SLOT/SUBSLOT`.
pub const SLOT_FILE: &str = "SLOT";

/// Suffix shared by `DEPEND`, `RDEPEND`, `PDEPEND`, `BDEPEND`, `IDEPEND`.
pub const DEPEND_SUFFIX: &str = "DEPEND";

/// One dependency-declaration file of a record.
#[derive(Debug, Clone)]
pub struct DependFile {
    /// File name, e.g. `RDEPEND`.
    pub role: String,
    /// Raw file content.
    pub content: String,
}

impl DependFile {
    /// Whitespace-separated tokens of the declaration.
    pub fn atoms(&self) -> impl Iterator<Item = &str> {
        self.content.split_whitespace()
    }
}

/// One installed package as read from disk.
#[derive(Debug, Clone)]
pub struct PackageRecord {
    /// Record directory.
    pub dir: PathBuf,
    /// Canonical `category/name:slot`.
    pub identity: PackageIdentity,
    /// Enabled flags, in file order.
    pub use_flags: Vec<String>,
    /// Dependency files sorted by role name.
    pub depends: Vec<DependFile>,
}

/// Reads every installed record under `pkg_dir`, in file-name order.
pub fn read_installed(pkg_dir: &Path) -> UsePruneResult<Vec<PackageRecord>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(pkg_dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| walk_error(pkg_dir, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        match read_record(entry.path())? {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                tracing::debug!(dir = %entry.path().display(), "no presence marker, skipping");
            }
        }
    }

    tracing::info!(
        pkg_dir = %pkg_dir.display(),
        records = records.len(),
        skipped,
        "scanned installed-package database"
    );
    Ok(records)
}

/// Reads a single record directory.
///
/// Returns `Ok(None)` when the directory lacks the presence marker.
pub fn read_record(dir: &Path) -> UsePruneResult<Option<PackageRecord>> {
    if !dir.join(PRESENCE_MARKER).is_file() {
        return Ok(None);
    }

    let category = file_name(dir.parent().unwrap_or(dir));
    let pf = file_name(dir);

    let slot_raw = read_required(dir, SLOT_FILE)?;
    let slot = slot_raw.trim().split('/').next().unwrap_or_default();
    let identity = if slot.is_empty() {
        canonicalize(&format!("{}/{}", category, pf))?
    } else {
        canonicalize(&format!("{}/{}:{}", category, pf, slot))?
    };

    let use_flags = read_required(dir, USE_FILE)?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut depends = Vec::new();
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let role = entry.file_name().to_string_lossy().to_string();
        if !role.ends_with(DEPEND_SUFFIX) || !entry.path().is_file() {
            continue;
        }
        let content = fs::read_to_string(entry.path()).with_path(entry.path())?;
        depends.push(DependFile { role, content });
    }
    depends.sort_by(|a, b| a.role.cmp(&b.role));

    Ok(Some(PackageRecord {
        dir: dir.to_path_buf(),
        identity,
        use_flags,
        depends,
    }))
}

fn read_required(dir: &Path, file: &str) -> UsePruneResult<String> {
    let path = dir.join(file);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(UsePruneError::missing_file(dir, file)),
        Err(e) => Err(UsePruneError::io(path, e)),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn walk_error(root: &Path, err: walkdir::Error) -> UsePruneError {
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.into_io_error() {
        Some(io) => UsePruneError::io(path, io),
        None => UsePruneError::Io {
            path,
            message: "filesystem loop detected".to_string(),
            source: None,
        },
    }
}
