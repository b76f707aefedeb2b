//! Audit results and their output formats - plain text and JSON.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;
use serde_json::json;

use crate::atom::PackageIdentity;

/// A flag enabled on a package that no world package needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnpulledFlag {
    pub package: PackageIdentity,
    pub flag: String,
}

impl fmt::Display for UnpulledFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] is not pulled by any world packages", self.package, self.flag)
    }
}

/// A flag enabled on a package together with the world packages needing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JustifiedFlag {
    pub package: PackageIdentity,
    pub flag: String,
    /// Sorted.
    pub world: Vec<PackageIdentity>,
}

impl fmt::Display for JustifiedFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] is pulled by ", self.package, self.flag)?;
        for (i, pkg) in self.world.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", pkg)?;
        }
        Ok(())
    }
}

/// Counters for one audit run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    /// Installed records scanned.
    pub records: usize,
    /// Target flags enabled on at least one package.
    pub flags: usize,
    /// (package, flag) pairs checked.
    pub enabling_pairs: usize,
    /// Reverse-dependency edges across all flags.
    pub edges: usize,
    pub unpulled: usize,
}

/// Outcome of an audit.
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    /// Report order: flags by first discovery, packages by scan order.
    pub unpulled: Vec<UnpulledFlag>,
    pub justified: Vec<JustifiedFlag>,
    pub stats: AuditStats,
}

impl AuditReport {
    pub fn has_unpulled(&self) -> bool {
        !self.unpulled.is_empty()
    }

    /// Unpulled entries of a single flag.
    pub fn unpulled_for<'a>(&'a self, flag: &'a str) -> impl Iterator<Item = &'a UnpulledFlag> {
        self.unpulled.iter().filter(move |u| u.flag == flag)
    }
}

/// Writes one line per unpulled (package, flag) pair.
pub fn write_plain(out: &mut impl Write, report: &AuditReport) -> io::Result<()> {
    for entry in &report.unpulled {
        writeln!(out, "{}", entry)?;
    }
    Ok(())
}

/// Writes one line per justified pair naming the world packages behind it.
pub fn write_explain(out: &mut impl Write, report: &AuditReport) -> io::Result<()> {
    for entry in &report.justified {
        writeln!(out, "{}", entry)?;
    }
    Ok(())
}

/// JSON document for `--json`.
pub fn to_json(report: &AuditReport, explain: bool) -> serde_json::Value {
    let mut value = json!({
        "unpulled": report.unpulled,
        "stats": report.stats,
    });
    if explain {
        value["justified"] = json!(report.justified);
    }
    value
}

/// Prints the plain report to stdout.
pub fn print_plain(report: &AuditReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plain(&mut out, report)
}

/// Prints the JSON report to stdout.
///
/// Falls back to the plain lines if serialization fails.
pub fn print_json(report: &AuditReport, explain: bool) -> io::Result<()> {
    match serde_json::to_string_pretty(&to_json(report, explain)) {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed, printing plain report");
            print_plain(report)
        }
    }
}
