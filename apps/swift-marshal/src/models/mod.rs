//! Shared data models: declaration tree, configuration, and per-file results.

pub mod configuration;
pub mod declaration;

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Ordering verdict for one type container.
pub struct TypeReorderResult {
    pub name: String,
    pub line: usize,
    pub needs_reordering: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of `check` for one file.
pub struct CheckResult {
    pub path: PathBuf,
    pub results: Vec<TypeReorderResult>,
    pub needs_reorder: bool,
}

impl CheckResult {
    pub fn new(path: PathBuf, results: Vec<TypeReorderResult>) -> Self {
        let needs_reorder = results.iter().any(|r| r.needs_reordering);
        Self {
            path,
            results,
            needs_reorder,
        }
    }

    pub fn types_needing_reorder(&self) -> usize {
        self.results.iter().filter(|r| r.needs_reordering).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of `fix` for one file.
pub struct FixResult {
    pub path: PathBuf,
    /// Final file text (the rewritten text, or the original when unchanged).
    #[serde(skip)]
    pub source: String,
    pub modified: bool,
}
