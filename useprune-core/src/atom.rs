//! Package spec canonicalization.
//!
//! Every spec that enters the graph or the world check goes through
//! [`canonicalize`] first, so `>=dev-python/python-slip-0.2.7` and
//! `dev-python/python-slip-0.6.5:0` compare equal as `dev-python/python-slip:0`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{UsePruneError, UsePruneResult};

/// Slot assumed when a spec does not name one.
pub const DEFAULT_SLOT: &str = "0";

/// Comparison operators that may prefix a dependency atom.
const OPERATOR_CHARS: &[char] = &['<', '=', '>', '~'];

/// `name-version` split: greedy so the last `-<number>` boundary wins.
fn version_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: hardcoded pattern, exercised by the tests below.
    REGEX.get_or_init(|| {
        Regex::new(r"^(.*)-[0-9]+(?:\.[0-9]+)*").expect("Hardcoded regex pattern is valid")
    })
}

/// A normalized `category/name:slot` package identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PackageIdentity(String);

impl PackageIdentity {
    /// Full `category/name:slot` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `category/name` without the slot suffix.
    pub fn without_slot(&self) -> &str {
        self.0.rsplit_once(':').map_or(self.0.as_str(), |(base, _)| base)
    }

    /// Blockers (`!cat/pkg`, `!!cat/pkg`) mean "must not be installed".
    pub fn is_blocker(&self) -> bool {
        self.0.starts_with('!')
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a raw package spec into a [`PackageIdentity`].
///
/// Accepts installed-record triples (`cat/pf:slot`), dependency atoms with
/// operators and sub-slots (`>=cat/pkg-2:2/2=`) and bare `cat/pkg` names.
/// Fails with [`UsePruneError::MalformedSpec`] when there is no category.
pub fn canonicalize(raw: &str) -> UsePruneResult<PackageIdentity> {
    let spec = raw.trim_start_matches(OPERATOR_CHARS);

    let (category, rest) = spec
        .split_once('/')
        .ok_or_else(|| UsePruneError::malformed(raw))?;
    if category.is_empty() {
        return Err(UsePruneError::malformed(raw));
    }

    let (name_version, slot) = match rest.split_once(':') {
        Some((nv, slot_part)) => (nv, parse_slot(slot_part)),
        None => (rest, DEFAULT_SLOT),
    };
    if name_version.is_empty() {
        return Err(UsePruneError::malformed(raw));
    }

    let name = version_regex()
        .captures(name_version)
        .and_then(|caps| caps.get(1))
        .map_or(name_version, |m| m.as_str());

    Ok(PackageIdentity(format!("{}/{}:{}", category, name, slot)))
}

/// Slot text up to the sub-slot separator, with slot operators dropped.
fn parse_slot(slot_part: &str) -> &str {
    let slot = slot_part.split('/').next().unwrap_or_default();
    let slot = slot.trim_end_matches(['=', '*']);
    if slot.is_empty() {
        DEFAULT_SLOT
    } else {
        slot
    }
}
