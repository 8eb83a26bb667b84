//! Ordering rules and extension handling policy.
//!
//! A `Configuration` is built once per invocation (see `crate::config`) and
//! then only read. Every filter that is `None` acts as a wildcard.

use crate::models::declaration::MemberKind;

/// Selects static-like or instance members in a method rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodScope {
    Type,
    Instance,
}

impl MethodScope {
    /// Maps a `kind:` attribute value; unknown values become a wildcard.
    pub fn from_config_value(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "static" | "type" | "class" => Some(MethodScope::Type),
            "instance" => Some(MethodScope::Instance),
            _ => None,
        }
    }
}

/// One entry of `ordering.members`, tried in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRule {
    Simple(MemberKind),
    Property {
        annotated: Option<bool>,
        visibility: Option<String>,
    },
    Method {
        scope: Option<MethodScope>,
        visibility: Option<String>,
        annotated: Option<bool>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionsStrategy {
    /// Each body and extension block is ordered on its own.
    #[default]
    Separate,
    /// A type's body and its extensions are ordered as one pool.
    Merge,
}

impl ExtensionsStrategy {
    pub fn from_config_value(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "separate" => Some(ExtensionsStrategy::Separate),
            "merge" => Some(ExtensionsStrategy::Merge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub version: u32,
    pub rules: Vec<MemberRule>,
    pub extensions_strategy: ExtensionsStrategy,
    /// Forbid members from moving between blocks of the same type.
    pub respect_boundaries: bool,
}

impl Configuration {
    pub fn new(rules: Vec<MemberRule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn with_extensions(mut self, strategy: ExtensionsStrategy, respect_boundaries: bool) -> Self {
        self.extensions_strategy = strategy;
        self.respect_boundaries = respect_boundaries;
        self
    }

    /// Bucket assigned to members no rule matches.
    pub fn unmatched_bucket(&self) -> usize {
        self.rules.len()
    }
}

impl Default for Configuration {
    /// Every member kind in conventional Swift order, extensions separate.
    fn default() -> Self {
        Self {
            version: 1,
            rules: MemberKind::ALL.into_iter().map(MemberRule::Simple).collect(),
            extensions_strategy: ExtensionsStrategy::Separate,
            respect_boundaries: true,
        }
    }
}
