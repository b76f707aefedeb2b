//! One audit run: the graph, the enabling lists and the world set.

use crate::error::UsePruneResult;
use crate::flag::TargetPattern;
use crate::metadata::PackageRecord;
use crate::rdeps::{build_rdep_graph, ReverseDepGraph, UsingPackages};
use crate::reach::FlagQuery;
use crate::report::{AuditReport, AuditStats, JustifiedFlag, UnpulledFlag};
use crate::world::WorldSet;

/// Everything one report pass needs, built once and queried read-only.
#[derive(Debug, Clone)]
pub struct AuditSession {
    graph: ReverseDepGraph,
    using: UsingPackages,
    world: WorldSet,
    records: usize,
}

impl AuditSession {
    /// Wraps prebuilt structures (synthetic graphs in tests, for instance).
    pub fn new(graph: ReverseDepGraph, using: UsingPackages, world: WorldSet) -> Self {
        Self {
            graph,
            using,
            world,
            records: 0,
        }
    }

    /// Builds the graph from scanned records.
    pub fn from_records(
        records: &[PackageRecord],
        pattern: &TargetPattern,
        world: WorldSet,
    ) -> UsePruneResult<Self> {
        let (graph, using) = build_rdep_graph(records, pattern)?;
        Ok(Self {
            graph,
            using,
            world,
            records: records.len(),
        })
    }

    pub fn graph(&self) -> &ReverseDepGraph {
        &self.graph
    }

    pub fn using(&self) -> &UsingPackages {
        &self.using
    }

    pub fn world(&self) -> &WorldSet {
        &self.world
    }

    /// Restricts the audit to flags accepted by `keep`.
    pub fn retain_flags(&mut self, keep: impl FnMut(&str) -> bool) {
        self.using.retain(keep);
    }

    /// A fresh reachability query (with an empty memo) for `flag`.
    pub fn query<'s>(&'s self, flag: &'s str) -> FlagQuery<'s> {
        FlagQuery::new(flag, &self.graph, &self.world)
    }

    /// Checks every enabling package of every flag.
    pub fn run(&self) -> AuditReport {
        let mut unpulled = Vec::new();
        let mut justified = Vec::new();

        for (flag, pkgs) in self.using.iter() {
            let mut query = self.query(flag);
            for pkg in pkgs {
                let reached = query.reaches_world(pkg);
                if reached.is_empty() {
                    unpulled.push(UnpulledFlag {
                        package: pkg.clone(),
                        flag: flag.to_string(),
                    });
                } else {
                    let mut world: Vec<_> = reached.into_iter().collect();
                    world.sort();
                    justified.push(JustifiedFlag {
                        package: pkg.clone(),
                        flag: flag.to_string(),
                        world,
                    });
                }
            }
            tracing::debug!(flag, packages = pkgs.len(), resolved = query.memo().len(), "flag audited");
        }

        let stats = AuditStats {
            records: self.records,
            flags: self.using.flag_count(),
            enabling_pairs: self.using.pair_count(),
            edges: self.graph.edge_count(),
            unpulled: unpulled.len(),
        };
        tracing::info!(
            flags = stats.flags,
            pairs = stats.enabling_pairs,
            unpulled = stats.unpulled,
            "audit complete"
        );

        AuditReport {
            unpulled,
            justified,
            stats,
        }
    }
}
