//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use useprune_core::prelude::*;
//! ```

// Core types
pub use crate::atom::{canonicalize, PackageIdentity};
pub use crate::error::{UsePruneError, UsePruneResult};

// Graph and reachability
pub use crate::rdeps::{build_rdep_graph, ReverseDepGraph, UsingPackages};
pub use crate::reach::{reaches_world, FlagQuery, ReachMemo};
pub use crate::world::WorldSet;

// Audit API
pub use crate::builder::UsePrune;
pub use crate::report::{AuditReport, UnpulledFlag};
pub use crate::session::AuditSession;
