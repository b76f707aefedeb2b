//! The world set: packages the user asked for explicitly.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::atom::{canonicalize, PackageIdentity};
use crate::error::{IoResultExt, UsePruneResult};

/// Default location of the world file.
pub const DEFAULT_WORLD_FILE: &str = "/var/lib/portage/world";

/// Always treated as requested: the tool that syncs the metadata tree.
pub const DEFAULT_EXTRA_WORLD: &[&str] = &["dev-vcs/git"];

/// Canonical world entries: `category/name`, or `category/name:slot` when the
/// token named a slot.
#[derive(Debug, Clone, Default)]
pub struct WorldSet {
    entries: HashSet<String>,
}

/// Membership key for one world token. Versions and operators are dropped;
/// the slot is kept only when the token spelled one out.
fn world_key(token: &str) -> UsePruneResult<String> {
    let identity = canonicalize(token)?;
    let names_slot = token
        .split_once('/')
        .and_then(|(_, rest)| rest.split_once(':'))
        .is_some_and(|(_, slot)| !slot.trim_end_matches(['=', '*']).is_empty());

    if names_slot {
        Ok(identity.as_str().to_string())
    } else {
        Ok(identity.without_slot().to_string())
    }
}

impl WorldSet {
    /// Builds a world set from raw tokens.
    ///
    /// Fails with `MalformedSpec` on a token without a category.
    pub fn from_entries<S: AsRef<str>>(
        entries: impl IntoIterator<Item = S>,
    ) -> UsePruneResult<Self> {
        let mut world = Self::default();
        world.extend(entries)?;
        Ok(world)
    }

    /// Reads a whitespace-separated world file.
    pub fn load(path: &Path) -> UsePruneResult<Self> {
        let content = fs::read_to_string(path).with_path(path)?;
        let world = Self::from_entries(content.split_whitespace())?;
        tracing::info!(path = %path.display(), entries = world.len(), "loaded world file");
        Ok(world)
    }

    /// Adds extra entries such as [`DEFAULT_EXTRA_WORLD`].
    pub fn extend<S: AsRef<str>>(
        &mut self,
        entries: impl IntoIterator<Item = S>,
    ) -> UsePruneResult<()> {
        for token in entries {
            self.entries.insert(world_key(token.as_ref())?);
        }
        Ok(())
    }

    /// Membership with or without the identity's slot suffix.
    pub fn contains(&self, pkg: &PackageIdentity) -> bool {
        self.entries.contains(pkg.as_str()) || self.entries.contains(pkg.without_slot())
    }

    /// [`contains`](Self::contains) for an identity already rendered as text.
    pub fn contains_str(&self, identity: &str) -> bool {
        let bare = identity.rsplit_once(':').map_or(identity, |(base, _)| base);
        self.entries.contains(identity) || self.entries.contains(bare)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UsePruneError;

    #[test]
    fn test_contains_bare_entry() {
        let world = WorldSet::from_entries(["dev-python/python-slip"]).unwrap();
        assert!(world.contains(&canonicalize("dev-python/python-slip:0").unwrap()));
        assert!(world.contains(&canonicalize("dev-python/python-slip:1").unwrap()));
        assert!(!world.contains(&canonicalize("dev-python/six").unwrap()));
    }

    #[test]
    fn test_contains_slotted_entry() {
        let world = WorldSet::from_entries(["dev-lang/python:3.12"]).unwrap();
        assert!(world.contains(&canonicalize("dev-lang/python-3.12.3:3.12").unwrap()));
        assert!(!world.contains(&canonicalize("dev-lang/python-3.11.8:3.11").unwrap()));
        assert!(world.contains_str("dev-lang/python:3.12"));
        assert!(!world.contains_str("dev-lang/python:3.11"));
    }

    #[test]
    fn test_versioned_entries_are_normalized() {
        let world =
            WorldSet::from_entries([">=app-portage/eix-0.36", "=dev-lang/ruby-3.2.2:3.2/3.2"])
                .unwrap();
        assert!(world.contains(&canonicalize("app-portage/eix-0.36.7").unwrap()));
        assert!(world.contains_str("dev-lang/ruby:3.2"));
        assert!(!world.contains_str("dev-lang/ruby:3.1"));
    }

    #[test]
    fn test_slot_operator_is_not_a_slot() {
        let world = WorldSet::from_entries(["dev-libs/openssl:="]).unwrap();
        assert!(world.contains_str("dev-libs/openssl:3"));
    }

    #[test]
    fn test_malformed_entry_rejected() {
        let err = WorldSet::from_entries(["python-slip"]).unwrap_err();
        assert!(matches!(err, UsePruneError::MalformedSpec { .. }));

        let mut world = WorldSet::default();
        assert!(world.extend(["eix"]).is_err());
        assert!(world.is_empty());
    }

    #[test]
    fn test_extend_with_defaults() {
        let mut world = WorldSet::default();
        assert!(world.is_empty());
        world.extend(DEFAULT_EXTRA_WORLD.iter().copied()).unwrap();
        assert!(world.contains(&canonicalize("dev-vcs/git-2.45.2").unwrap()));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = WorldSet::load(Path::new("/nonexistent/useprune/world")).unwrap_err();
        assert!(err.path().is_some());
    }
}
