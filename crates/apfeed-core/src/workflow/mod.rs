//! Directory-based job workflow.
//!
//! Source files move `inbox → todo → success | failure`; the batch built from
//! successful files moves `outbox → <destination>/inbox`. Every state change
//! is a single `rename`, so a file is always in exactly one directory.

mod batch;
mod guard;
mod queue;

pub use batch::{finalize_batch, BatchDisposition, BatchFile, RecordSink};
pub use guard::SingleInstanceGuard;
pub use queue::{claim_pending, list_job_files, process_each, ClaimOutcome, FileOutcome, ProcessOutcome};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::WorkflowError;

/// Extension of job files.
pub const JOB_EXTENSION: &str = "xml";

/// Lifecycle state of a job file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobState {
    /// Waiting in `inbox/`.
    Pending,
    /// Owned by the current run, in `todo/`.
    Claimed,
    /// Processed, in `success/`.
    Succeeded,
    /// Rejected, in `failure/`.
    Failed,
}

/// A job file and the state implied by its directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub path: PathBuf,
    pub state: JobState,
}

impl FileJob {
    pub fn new(path: impl Into<PathBuf>, state: JobState) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }

    /// File name without directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Rename the file into `dir`, advancing to `state`.
    ///
    /// On failure the job is returned unchanged with the error.
    pub fn move_to(self, dir: &Path, state: JobState) -> Result<FileJob, (FileJob, WorkflowError)> {
        debug_assert!(state > self.state, "job states only move forward");
        self.rename_into(dir, state)
    }

    /// Return a succeeded job to `todo` when its records never reached the batch.
    pub fn requeue(self, todo: &Path) -> Result<FileJob, (FileJob, WorkflowError)> {
        debug_assert_eq!(self.state, JobState::Succeeded);
        self.rename_into(todo, JobState::Claimed)
    }

    fn rename_into(self, dir: &Path, state: JobState) -> Result<FileJob, (FileJob, WorkflowError)> {
        let Some(name) = self.path.file_name() else {
            let error = WorkflowError::Rename {
                from: self.path.clone(),
                to: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            };
            return Err((self, error));
        };
        let target = dir.join(name);

        match fs::rename(&self.path, &target) {
            Ok(()) => {
                debug!("Moved {} to {} ({:?})", self.path.display(), target.display(), state);
                Ok(FileJob::new(target, state))
            }
            Err(source) => {
                let error = WorkflowError::Rename {
                    from: self.path.clone(),
                    to: target,
                    source,
                };
                Err((self, error))
            }
        }
    }
}

/// The directories of one workflow root plus the delivery target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowDirs {
    pub root: PathBuf,
    pub inbox: PathBuf,
    pub todo: PathBuf,
    pub outbox: PathBuf,
    pub success: PathBuf,
    pub failure: PathBuf,
    pub destination_inbox: PathBuf,
}

impl WorkflowDirs {
    pub fn new(root: &Path, destination: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            inbox: root.join("inbox"),
            todo: root.join("todo"),
            outbox: root.join("outbox"),
            success: root.join("success"),
            failure: root.join("failure"),
            destination_inbox: destination.join("inbox"),
        }
    }

    /// Every directory the run touches.
    pub fn all(&self) -> [&Path; 6] {
        [
            &self.inbox,
            &self.todo,
            &self.outbox,
            &self.success,
            &self.failure,
            &self.destination_inbox,
        ]
    }

    /// Fail on the first directory that does not exist.
    pub fn verify(&self) -> Result<(), WorkflowError> {
        for dir in self.all() {
            if !dir.is_dir() {
                return Err(WorkflowError::MissingDirectory(dir.to_path_buf()));
            }
        }
        Ok(())
    }

    /// Create any missing directory.
    pub fn create_all(&self) -> Result<(), WorkflowError> {
        for dir in self.all() {
            fs::create_dir_all(dir).map_err(|e| WorkflowError::Scan {
                dir: dir.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}
