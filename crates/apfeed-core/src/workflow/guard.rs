//! Process-wide mutual exclusion per workflow root.
//!
//! Uses an advisory lock via fs2 on a hidden lock file named after the
//! running executable. The lock is non-blocking: a second run fails at once.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::WorkflowError;

/// Holds the instance lock until dropped.
#[derive(Debug)]
pub struct SingleInstanceGuard {
    file: File,
    path: PathBuf,
}

impl SingleInstanceGuard {
    /// Lock `root` for the current executable.
    pub fn acquire(root: &Path) -> Result<Self, WorkflowError> {
        Self::acquire_named(root, &executable_name())
    }

    /// Lock `root` under an explicit name.
    pub fn acquire_named(root: &Path, name: &str) -> Result<Self, WorkflowError> {
        let path = root.join(format!(".{name}.lock"));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| WorkflowError::Lock {
                path: path.clone(),
                source,
            })?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(WorkflowError::AlreadyRunning(path));
            }
            return Err(WorkflowError::Lock { path, source: e });
        }

        debug!("Acquired instance lock {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("Released instance lock {}", self.path.display());
    }
}

fn executable_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "apfeed".to_string())
}
