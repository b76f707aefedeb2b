//! Builder pattern API for useprune audits.
//!
//! ```rust,ignore
//! use useprune_core::prelude::*;
//!
//! let report = UsePrune::new()
//!     .pkg_dir("/var/db/pkg")
//!     .world_file("/var/lib/portage/world")
//!     .only_flags(["python_targets_python3_11"])
//!     .analyze()?;
//!
//! for entry in &report.unpulled {
//!     println!("{}", entry);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::error::UsePruneResult;
use crate::flag::{TargetPattern, DEFAULT_TARGET_PATTERN};
use crate::metadata::{read_installed, DEFAULT_PKG_DIR};
use crate::report::AuditReport;
use crate::session::AuditSession;
use crate::world::{WorldSet, DEFAULT_EXTRA_WORLD, DEFAULT_WORLD_FILE};

/// Builder for configuring an audit.
#[derive(Debug, Clone)]
pub struct UsePrune {
    /// Installed-package database root
    pkg_dir: PathBuf,

    /// World file
    world_file: PathBuf,

    /// Always-requested packages added to the world set
    extra_world: Vec<String>,

    /// Regex selecting the target flags
    target_pattern: String,

    /// Flags excluded even when they match the pattern
    ignored_flags: Vec<String>,

    /// When non-empty, only these flags are reported
    only_flags: Vec<String>,
}

impl Default for UsePrune {
    fn default() -> Self {
        Self::new()
    }
}

impl UsePrune {
    /// An audit of the system database with the stock world file.
    pub fn new() -> Self {
        Self {
            pkg_dir: PathBuf::from(DEFAULT_PKG_DIR),
            world_file: PathBuf::from(DEFAULT_WORLD_FILE),
            extra_world: DEFAULT_EXTRA_WORLD.iter().map(|s| s.to_string()).collect(),
            target_pattern: DEFAULT_TARGET_PATTERN.to_string(),
            ignored_flags: Vec::new(),
            only_flags: Vec::new(),
        }
    }

    /// Set the installed-package database root.
    pub fn pkg_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pkg_dir = dir.into();
        self
    }

    /// Set the world file.
    pub fn world_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.world_file = path.into();
        self
    }

    /// Replace the always-requested packages.
    pub fn extra_world(mut self, entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_world = entries.into_iter().map(Into::into).collect();
        self
    }

    /// Add always-requested packages on top of the current list.
    pub fn add_extra_world(mut self, entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_world.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Replace the target-flag pattern.
    pub fn target_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.target_pattern = pattern.into();
        self
    }

    /// Exclude flags from the audit.
    pub fn ignore_flags(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Report only these flags.
    pub fn only_flags(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.only_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    pub fn pkg_dir_path(&self) -> &Path {
        &self.pkg_dir
    }

    pub fn world_file_path(&self) -> &Path {
        &self.world_file
    }

    /// The compiled target pattern with the ignore list applied.
    pub fn audited_flags(&self) -> UsePruneResult<TargetPattern> {
        Ok(TargetPattern::new(&self.target_pattern)?
            .with_ignored(self.ignored_flags.iter().cloned()))
    }

    /// Read the world file and the database and build the session.
    pub fn session(&self) -> UsePruneResult<AuditSession> {
        let pattern = self.audited_flags()?;
        for flag in &self.only_flags {
            pattern.require(flag)?;
        }

        let mut world = WorldSet::load(&self.world_file)?;
        world.extend(&self.extra_world)?;

        let records = read_installed(&self.pkg_dir)?;
        let mut session = AuditSession::from_records(&records, &pattern, world)?;

        if !self.only_flags.is_empty() {
            session.retain_flags(|flag| self.only_flags.iter().any(|f| f == flag));
        }
        Ok(session)
    }

    /// Run the audit and return the report.
    pub fn analyze(&self) -> UsePruneResult<AuditReport> {
        Ok(self.session()?.run())
    }
}
