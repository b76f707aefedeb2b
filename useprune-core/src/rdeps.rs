//! Reverse-dependency graph construction.
//!
//! Edges point from a dependency to its dependent and are scoped by flag:
//! `graph[flag][D]` holds every installed `P` whose dependency on `D` asks
//! for `flag` (e.g. `dev-python/six[python_targets_python3_12(-)]`).
//! Unconditional atoms carry no flag requirement and never produce edges.

use std::collections::{HashMap, HashSet};

use crate::atom::{canonicalize, PackageIdentity};
use crate::error::UsePruneResult;
use crate::flag::{FlagState, TargetPattern};
use crate::metadata::PackageRecord;

/// Dependency → dependents, one edge map per flag.
#[derive(Debug, Clone, Default)]
pub struct ReverseDepGraph {
    edges: HashMap<String, HashMap<PackageIdentity, HashSet<PackageIdentity>>>,
}

impl ReverseDepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `dependent` needs `dependency` built with `flag`.
    ///
    /// Returns `false` when the edge was already present.
    pub fn add_edge(
        &mut self,
        flag: &str,
        dependency: PackageIdentity,
        dependent: PackageIdentity,
    ) -> bool {
        self.edges
            .entry(flag.to_string())
            .or_default()
            .entry(dependency)
            .or_default()
            .insert(dependent)
    }

    /// The edge map of one flag.
    pub fn for_flag(&self, flag: &str) -> Option<&HashMap<PackageIdentity, HashSet<PackageIdentity>>> {
        self.edges.get(flag)
    }

    /// Packages depending on `pkg` under `flag`.
    pub fn dependents(&self, flag: &str, pkg: &PackageIdentity) -> Option<&HashSet<PackageIdentity>> {
        self.edges.get(flag).and_then(|m| m.get(pkg))
    }

    /// Flags that have at least one edge.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Total number of edges across all flags.
    pub fn edge_count(&self) -> usize {
        self.edges
            .values()
            .flat_map(|m| m.values())
            .map(HashSet::len)
            .sum()
    }
}

/// Flag → packages that have it enabled, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct UsingPackages {
    order: Vec<String>,
    by_flag: HashMap<String, Vec<PackageIdentity>>,
}

impl UsingPackages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `pkg` to the enabling list of `flag`.
    pub fn push(&mut self, flag: &str, pkg: PackageIdentity) {
        match self.by_flag.get_mut(flag) {
            Some(pkgs) => pkgs.push(pkg),
            None => {
                self.order.push(flag.to_string());
                self.by_flag.insert(flag.to_string(), vec![pkg]);
            }
        }
    }

    /// Enabling packages of one flag.
    pub fn get(&self, flag: &str) -> Option<&[PackageIdentity]> {
        self.by_flag.get(flag).map(Vec::as_slice)
    }

    /// `(flag, enabling packages)` in first-discovery order of the flags.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PackageIdentity])> {
        self.order
            .iter()
            .filter_map(|flag| self.by_flag.get(flag).map(|p| (flag.as_str(), p.as_slice())))
    }

    pub fn flag_count(&self) -> usize {
        self.order.len()
    }

    /// Total (package, flag) pairs.
    pub fn pair_count(&self) -> usize {
        self.by_flag.values().map(Vec::len).sum()
    }

    /// Keeps only the flags accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.order.retain(|flag| keep(flag));
        let order = &self.order;
        self.by_flag.retain(|flag, _| order.contains(flag));
    }
}

/// A dependency atom carrying a `[...]` flag requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseDepAtom<'a> {
    /// Canonical identity of the depended-upon package.
    pub package: PackageIdentity,
    /// Raw comma-separated tokens from inside the brackets.
    pub flags: Vec<&'a str>,
}

/// Splits `cat/pkg-1.0:slot[a,b(-),-c]` into package and flag tokens.
///
/// Returns `Ok(None)` for atoms without a bracket suffix and for any other
/// dependency-string token (`||`, `(`, `ssl?`).
pub fn parse_use_dep(token: &str) -> UsePruneResult<Option<UseDepAtom<'_>>> {
    let Some((spec, flags)) = token
        .strip_suffix(']')
        .and_then(|t| t.rsplit_once('['))
    else {
        return Ok(None);
    };

    Ok(Some(UseDepAtom {
        package: canonicalize(spec)?,
        flags: flags.split(',').collect(),
    }))
}

/// Incrementally folds installed records into the graph.
#[derive(Debug)]
pub struct RdepGraphBuilder<'p> {
    pattern: &'p TargetPattern,
    graph: ReverseDepGraph,
    using: UsingPackages,
    records: usize,
}

impl<'p> RdepGraphBuilder<'p> {
    pub fn new(pattern: &'p TargetPattern) -> Self {
        Self {
            pattern,
            graph: ReverseDepGraph::new(),
            using: UsingPackages::new(),
            records: 0,
        }
    }

    /// Adds one record's enabled flags and flag-gated dependencies.
    pub fn add_record(&mut self, record: &PackageRecord) -> UsePruneResult<()> {
        self.records += 1;
        let current = &record.identity;

        for flag in &record.use_flags {
            if self.pattern.matches(flag) {
                self.using.push(flag, current.clone());
            }
        }

        for depend in &record.depends {
            for token in depend.atoms() {
                let Some(atom) = parse_use_dep(token)? else {
                    continue;
                };
                if atom.package.is_blocker() {
                    continue;
                }
                for raw in &atom.flags {
                    let state = FlagState::parse(raw);
                    if state.disabled || !self.pattern.matches(state.name) {
                        continue;
                    }
                    self.graph
                        .add_edge(state.name, atom.package.clone(), current.clone());
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> (ReverseDepGraph, UsingPackages) {
        tracing::info!(
            records = self.records,
            flags = self.using.flag_count(),
            edges = self.graph.edge_count(),
            "built reverse-dependency graph"
        );
        (self.graph, self.using)
    }
}

/// Builds the reverse graph and the enabling lists from scanned records.
pub fn build_rdep_graph(
    records: &[PackageRecord],
    pattern: &TargetPattern,
) -> UsePruneResult<(ReverseDepGraph, UsingPackages)> {
    let mut builder = RdepGraphBuilder::new(pattern);
    for record in records {
        builder.add_record(record)?;
    }
    Ok(builder.finish())
}
