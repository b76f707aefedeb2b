//! World reachability over one flag's reverse-dependency edges.
//!
//! A package is justified under a flag when following "who depends on me
//! with this flag" edges leads to a world package. The search is an
//! explicit-stack traversal with a per-query visited set, so dependency
//! cycles terminate regardless of graph depth.
//!
//! Results are memoized per flag: once a package is resolved, later queries
//! that run into it take its world set instead of walking its dependents
//! again.

use std::collections::{HashMap, HashSet};

use crate::atom::PackageIdentity;
use crate::rdeps::ReverseDepGraph;
use crate::world::WorldSet;

/// Resolved world sets of one flag's query batch.
///
/// An empty set is a real answer: the package reaches no world package.
#[derive(Debug, Clone, Default)]
pub struct ReachMemo {
    resolved: HashMap<PackageIdentity, HashSet<PackageIdentity>>,
}

impl ReachMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pkg: &PackageIdentity) -> Option<&HashSet<PackageIdentity>> {
        self.resolved.get(pkg)
    }

    pub fn contains(&self, pkg: &PackageIdentity) -> bool {
        self.resolved.contains_key(pkg)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    fn insert(&mut self, pkg: PackageIdentity, world: HashSet<PackageIdentity>) {
        self.resolved.insert(pkg, world);
    }
}

/// World packages reachable from `start` through `flag`'s reverse edges.
///
/// `start` itself counts when it is a world package. Packages already in
/// `memo` (other than `start`) contribute their stored set and are not
/// expanded. The result is stored in `memo` before returning.
pub fn reaches_world(
    flag: &str,
    start: &PackageIdentity,
    graph: &ReverseDepGraph,
    world: &WorldSet,
    memo: &mut ReachMemo,
) -> HashSet<PackageIdentity> {
    let mut found: HashSet<PackageIdentity> = HashSet::new();
    let mut visited: HashSet<&PackageIdentity> = HashSet::new();
    let mut frontier: Vec<&PackageIdentity> = vec![start];

    while let Some(head) = frontier.pop() {
        if !visited.insert(head) {
            continue;
        }

        if head != start {
            if let Some(prior) = memo.get(head) {
                found.extend(prior.iter().cloned());
                continue;
            }
        }

        if world.contains(head) {
            found.insert(head.clone());
            continue;
        }

        if let Some(dependents) = graph.dependents(flag, head) {
            frontier.extend(dependents.iter().filter(|d| !visited.contains(*d)));
        }
    }

    tracing::trace!(flag, package = %start, world = found.len(), visited = visited.len(), "resolved");
    memo.insert(start.clone(), found.clone());
    found
}

/// Reachability queries for a single flag, owning that flag's memo.
///
/// Keeping the memo inside the query makes it impossible to reuse results
/// computed under another flag.
#[derive(Debug)]
pub struct FlagQuery<'s> {
    flag: &'s str,
    graph: &'s ReverseDepGraph,
    world: &'s WorldSet,
    memo: ReachMemo,
}

impl<'s> FlagQuery<'s> {
    pub fn new(flag: &'s str, graph: &'s ReverseDepGraph, world: &'s WorldSet) -> Self {
        Self {
            flag,
            graph,
            world,
            memo: ReachMemo::new(),
        }
    }

    pub fn flag(&self) -> &str {
        self.flag
    }

    /// World packages that justify `pkg` keeping this flag.
    pub fn reaches_world(&mut self, pkg: &PackageIdentity) -> HashSet<PackageIdentity> {
        reaches_world(self.flag, pkg, self.graph, self.world, &mut self.memo)
    }

    /// Whether no world package needs `pkg` built with this flag.
    pub fn is_unpulled(&mut self, pkg: &PackageIdentity) -> bool {
        self.reaches_world(pkg).is_empty()
    }

    pub fn memo(&self) -> &ReachMemo {
        &self.memo
    }
}
