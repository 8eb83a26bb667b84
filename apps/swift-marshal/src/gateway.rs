//! Per-path serialized file access.
//!
//! Every read-modify-write sequence on a path runs under that path's lock,
//! so two tasks touching the same file (a path listed twice, or reached
//! both explicitly and through `--path`) never interleave. Distinct paths
//! use distinct locks.

use crate::error::{MarshalError, MarshalResult};
use fs_err as fs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct FileGateway {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

/// Access to one path while its lock is held.
#[derive(Debug)]
pub struct LockedPath<'p> {
    path: &'p Path,
}

impl FileGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with exclusive access to `path`.
    pub fn exclusive<T>(&self, path: &Path, f: impl FnOnce(&LockedPath<'_>) -> T) -> T {
        let lock = self.lock_for(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f(&LockedPath { path })
    }

    pub fn read(&self, path: &Path) -> MarshalResult<String> {
        self.exclusive(path, |file| file.read())
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }
}

impl LockedPath<'_> {
    pub fn read(&self) -> MarshalResult<String> {
        fs::read_to_string(self.path).map_err(|source| MarshalError::Io {
            path: self.path.to_path_buf(),
            source,
        })
    }

    pub fn write(&self, contents: &str) -> MarshalResult<()> {
        fs::write(self.path, contents).map_err(|source| MarshalError::Io {
            path: self.path.to_path_buf(),
            source,
        })
    }
}
