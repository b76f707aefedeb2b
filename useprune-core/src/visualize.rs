//! Graphviz DOT export of one flag's reverse-dependency graph.
//!
//! - edges run dependency -> dependent ("who needs me")
//! - world packages are lightgreen
//! - enabling packages with no world justification are lightcoral

use std::collections::HashSet;
use std::fmt::Write;

use petgraph::graphmap::DiGraphMap;

use crate::rdeps::ReverseDepGraph;
use crate::report::AuditReport;
use crate::session::AuditSession;

/// Builds a `DiGraphMap` view of `flag`'s edges.
///
/// Nodes borrow the identities stored in `graph`.
pub fn flag_graphmap<'a>(graph: &'a ReverseDepGraph, flag: &str) -> DiGraphMap<&'a str, ()> {
    let mut g = DiGraphMap::new();
    if let Some(edges) = graph.for_flag(flag) {
        for (dependency, dependents) in edges {
            g.add_node(dependency.as_str());
            for dependent in dependents {
                g.add_edge(dependency.as_str(), dependent.as_str(), ());
            }
        }
    }
    g
}

/// Generate a Graphviz DOT representation of `flag`'s graph.
pub fn generate_dot(session: &AuditSession, report: &AuditReport, flag: &str) -> String {
    let mut g = flag_graphmap(session.graph(), flag);
    if let Some(pkgs) = session.using().get(flag) {
        for pkg in pkgs {
            g.add_node(pkg.as_str());
        }
    }

    let unpulled: HashSet<&str> = report
        .unpulled_for(flag)
        .map(|u| u.package.as_str())
        .collect();

    let mut nodes: Vec<&str> = g.nodes().collect();
    nodes.sort_unstable();
    let mut edges: Vec<(&str, &str)> = g.all_edges().map(|(a, b, _)| (a, b)).collect();
    edges.sort_unstable();

    let mut dot = String::with_capacity(nodes.len() * 80 + edges.len() * 60 + 150);
    if let Err(e) = write_dot_content(&mut dot, flag, &nodes, &edges, |node| {
        if unpulled.contains(node) {
            "lightcoral"
        } else if session.world().contains_str(node) {
            "lightgreen"
        } else {
            "white"
        }
    }) {
        tracing::error!(error = %e, "failed to generate DOT string");
        return "digraph useprune {\n}\n".to_string();
    }
    dot
}

fn write_dot_content(
    dot: &mut String,
    flag: &str,
    nodes: &[&str],
    edges: &[(&str, &str)],
    color: impl Fn(&str) -> &'static str,
) -> std::fmt::Result {
    writeln!(dot, "digraph useprune {{")?;
    writeln!(dot, "  label=\"{}\";", flag)?;
    writeln!(dot, "  rankdir=LR;")?;
    writeln!(dot, "  node [shape=box, style=filled];")?;
    writeln!(dot)?;

    for &node in nodes {
        writeln!(dot, "  \"{}\" [fillcolor={}];", node, color(node))?;
    }

    writeln!(dot)?;

    for (from, to) in edges {
        writeln!(dot, "  \"{}\" -> \"{}\";", from, to)?;
    }

    writeln!(dot, "}}")?;
    Ok(())
}
