//! useprune-core: find language/ABI target flags no world package needs.
//!
//! Installed packages often keep target flags (`python_targets_*`,
//! `ruby_targets_*`, `abi_x86_*`) long after anything explicitly requested
//! stopped depending on them. This library reads the installed-package
//! database, builds a per-flag reverse-dependency graph and reports every
//! (package, flag) pair that no world package reaches.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use useprune_core::prelude::*;
//!
//! let report = UsePrune::new().analyze()?;
//! for entry in &report.unpulled {
//!     println!("{}", entry);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`atom`]: package spec canonicalization to `category/name:slot`
//! - [`flag`]: flag tokens and the target-flag pattern
//! - [`metadata`]: installed-package database reader
//! - [`world`]: the world set
//! - [`rdeps`]: per-flag reverse-dependency graph construction
//! - [`reach`]: memoized world reachability
//! - [`session`]: one audit run over the above
//! - [`builder`]: fluent configuration API
//! - [`report`]: results and output formats
//! - [`error`]: typed error handling
//!
//! # Cargo Features
//!
//! - `dot` (default): Graphviz export of a flag's graph

pub mod atom;
pub mod builder;
pub mod config;
pub mod error;
pub mod flag;
pub mod logging;
pub mod metadata;
pub mod prelude;
pub mod rdeps;
pub mod reach;
pub mod report;
pub mod session;
pub mod world;

#[cfg(feature = "dot")]
pub mod visualize;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{IoResultExt, UsePruneError, UsePruneResult};

// Canonicalization and flags
pub use atom::{canonicalize, PackageIdentity, DEFAULT_SLOT};
pub use flag::{canonical_flag, is_disabled, FlagState, TargetPattern, DEFAULT_TARGET_PATTERN};

// Inputs
pub use metadata::{read_installed, read_record, DependFile, PackageRecord, DEFAULT_PKG_DIR};
pub use world::{WorldSet, DEFAULT_EXTRA_WORLD, DEFAULT_WORLD_FILE};

// Graph and reachability
pub use rdeps::{
    build_rdep_graph, parse_use_dep, RdepGraphBuilder, ReverseDepGraph, UseDepAtom,
    UsingPackages,
};
pub use reach::{reaches_world, FlagQuery, ReachMemo};

// Session and builder API
pub use builder::UsePrune;
pub use session::AuditSession;

// Configuration
pub use config::{load_config, load_default_config, UsePruneConfig, DEFAULT_CONFIG_FILE};

// Logging
pub use logging::{init_structured_logging, log_error, log_warn};

// Reporting
pub use report::{
    print_json, print_plain, to_json, write_explain, write_plain, AuditReport, AuditStats,
    JustifiedFlag, UnpulledFlag,
};

#[cfg(feature = "dot")]
pub use visualize::{flag_graphmap, generate_dot};

#[cfg(test)]
mod tests;
