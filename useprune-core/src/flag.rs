//! USE flag tokens and the target-flag filter.
//!
//! Only flags that select language or ABI build targets take part in the
//! audit; [`TargetPattern`] decides which ones those are.

use regex::Regex;

use crate::error::{UsePruneError, UsePruneResult};

/// Flags selecting Python/Ruby implementations and x86 ABIs.
pub const DEFAULT_TARGET_PATTERN: &str =
    r"^((?:ruby|python)_targets_|python_single_target_|abi_x86_)";

/// A flag token as it appears inside a dependency's `[...]` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagState<'a> {
    /// Bare flag name with annotations stripped.
    pub name: &'a str,
    /// Token carried a leading `-` or `!`.
    pub disabled: bool,
}

impl<'a> FlagState<'a> {
    /// Parses a bracket token such as `python_targets_python3_6(-)?`.
    ///
    /// A trailing `?`/`=` conditional marker is removed first, then the
    /// `(+)`/`(-)` default-state annotation. Neither counts as disablement.
    pub fn parse(token: &'a str) -> Self {
        let disabled = is_disabled(token);
        let name = token.trim_start_matches(['-', '!']);
        let name = name
            .strip_suffix('?')
            .or_else(|| name.strip_suffix('='))
            .unwrap_or(name);
        Self {
            name: canonical_flag(name),
            disabled,
        }
    }
}

/// True for the disabled form `-flag` (and the negated conditional `!flag?`).
pub fn is_disabled(token: &str) -> bool {
    token.starts_with('-') || token.starts_with('!')
}

/// Strips a `(+)`/`(-)` default-state annotation.
pub fn canonical_flag(token: &str) -> &str {
    token
        .strip_suffix("(-)")
        .or_else(|| token.strip_suffix("(+)"))
        .unwrap_or(token)
}

/// Compiled filter for the flags that participate in the graph.
#[derive(Debug, Clone)]
pub struct TargetPattern {
    regex: Regex,
    ignored: Vec<String>,
}

impl TargetPattern {
    /// Compiles a target pattern.
    pub fn new(pattern: &str) -> UsePruneResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| UsePruneError::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self {
            regex,
            ignored: Vec::new(),
        })
    }

    /// Flags excluded even when they match the pattern.
    pub fn with_ignored(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Whether `flag` takes part in the audit.
    pub fn matches(&self, flag: &str) -> bool {
        self.regex.is_match(flag) && !self.ignored.iter().any(|f| f == flag)
    }

    /// Fails with `InvalidArgument` when `flag` is not audited.
    pub fn require(&self, flag: &str) -> UsePruneResult<()> {
        if self.matches(flag) {
            return Ok(());
        }
        Err(UsePruneError::invalid_argument(format!(
            "'{}' is not an audited flag (pattern {})",
            flag,
            self.as_str()
        )))
    }

    /// The source pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for TargetPattern {
    fn default() -> Self {
        Self {
            // SAFETY: hardcoded pattern, exercised by the tests below.
            regex: Regex::new(DEFAULT_TARGET_PATTERN).expect("Hardcoded regex pattern is valid"),
            ignored: Vec::new(),
        }
    }
}
