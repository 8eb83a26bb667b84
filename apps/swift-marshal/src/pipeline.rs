//! Pipeline coordinator for `check` and `fix`.
//!
//! Each file is one task on the rayon pool: read through the gateway,
//! parse, plan, then report (check) or rewrite and write back (fix). A
//! batch is fail-fast. The first failing task halts it: tasks that have not
//! started are skipped, and a task about to write gives up instead. The
//! first error is what the caller sees.

use crate::boundary::{assign, Assignment};
use crate::error::{MarshalError, MarshalResult};
use crate::gateway::FileGateway;
use crate::models::configuration::Configuration;
use crate::models::declaration::SyntaxTree;
use crate::models::{CheckResult, FixResult, TypeReorderResult};
use crate::rewrite::rewrite;
use crate::syntax::StructureParser;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

pub struct Pipeline<'a, P> {
    parser: P,
    config: &'a Configuration,
    gateway: &'a FileGateway,
}

impl<'a, P: StructureParser> Pipeline<'a, P> {
    pub fn new(parser: P, config: &'a Configuration, gateway: &'a FileGateway) -> Self {
        Self {
            parser,
            config,
            gateway,
        }
    }

    /// Reports ordering for every file. Results follow `paths` order.
    pub fn run_check(&self, paths: &[PathBuf]) -> MarshalResult<Vec<CheckResult>> {
        run_batch(paths, |path, _batch| {
            let text = self.gateway.read(path)?;
            Ok(self.check_source(path, &text)?)
        })
    }

    /// Reorders every file, writing those that change unless `dry_run`.
    /// Results follow `paths` order.
    pub fn run_fix(&self, paths: &[PathBuf], dry_run: bool) -> MarshalResult<Vec<FixResult>> {
        run_batch(paths, |path, batch| {
            self.gateway.exclusive(path, |file| -> Result<FixResult, Interrupt> {
                let text = file.read()?;
                let result = self.fix_source(path, text)?;
                if result.modified && !dry_run {
                    if batch.is_halted() {
                        return Err(Interrupt::Halted);
                    }
                    file.write(&result.source)?;
                    debug!(path = %path.display(), "wrote reordered file");
                }
                Ok(result)
            })
        })
    }

    /// Check stage on in-memory text.
    pub fn check_source(&self, path: &Path, text: &str) -> MarshalResult<CheckResult> {
        let (tree, assignment) = self.plan(path, text)?;
        let results: Vec<TypeReorderResult> = tree
            .walk()
            .into_iter()
            .map(|id| {
                let container = tree.container(id);
                TypeReorderResult {
                    name: container.qualified_name.clone(),
                    line: container.line,
                    needs_reordering: assignment.needs_reordering(id),
                }
            })
            .collect();
        let result = CheckResult::new(path.to_path_buf(), results);
        debug!(
            path = %path.display(),
            types = result.results.len(),
            needs_reorder = result.needs_reorder,
            "checked file"
        );
        Ok(result)
    }

    /// Fix stage on in-memory text. `source` in the result is the text the
    /// file should hold afterwards.
    pub fn fix_source(&self, path: &Path, text: String) -> MarshalResult<FixResult> {
        let (tree, assignment) = self.plan(path, &text)?;
        let source = if assignment.any_reordered() {
            rewrite(&text, &tree, &assignment)
        } else {
            text.clone()
        };
        let modified = source != text;
        debug!(path = %path.display(), modified, "fixed file");
        Ok(FixResult {
            path: path.to_path_buf(),
            source,
            modified,
        })
    }

    fn plan(&self, path: &Path, text: &str) -> MarshalResult<(SyntaxTree, Assignment)> {
        let tree = self.parser.parse(text).map_err(|source| MarshalError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let assignment = assign(&tree, self.config);
        Ok((tree, assignment))
    }
}

/// Why a task stopped without a result.
enum Interrupt {
    /// Another task failed first.
    Halted,
    Failed(MarshalError),
}

impl From<MarshalError> for Interrupt {
    fn from(err: MarshalError) -> Self {
        Interrupt::Failed(err)
    }
}

/// Shared failure state of one fail-fast batch.
#[derive(Default)]
struct Batch {
    halted: AtomicBool,
    first_error: Mutex<Option<MarshalError>>,
}

impl Batch {
    fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    fn fail(&self, err: MarshalError) {
        let mut slot = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            debug!(error = %err, "halting batch");
            *slot = Some(err);
        }
        self.halted.store(true, Ordering::Release);
    }

    fn into_error(self) -> Option<MarshalError> {
        self.first_error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn run_batch<T, F>(paths: &[PathBuf], task: F) -> MarshalResult<Vec<T>>
where
    T: Send,
    F: Fn(&Path, &Batch) -> Result<T, Interrupt> + Sync,
{
    let batch = Batch::default();
    let outcomes: Vec<Option<T>> = paths
        .par_iter()
        .map(|path| {
            if batch.is_halted() {
                return None;
            }
            match task(path, &batch) {
                Ok(value) => Some(value),
                Err(Interrupt::Halted) => None,
                Err(Interrupt::Failed(err)) => {
                    batch.fail(err);
                    None
                }
            }
        })
        .collect();
    match batch.into_error() {
        Some(err) => Err(err),
        None => Ok(outcomes.into_iter().flatten().collect()),
    }
}
