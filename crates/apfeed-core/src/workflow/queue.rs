//! Claiming and processing job files.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{error, info, warn};

use super::batch::RecordSink;
use super::{FileJob, JobState, WorkflowDirs, JOB_EXTENSION};
use crate::error::WorkflowError;

/// Result of handling one claimed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOutcome {
    /// Route to `success/` (true) or `failure/` (false).
    pub ok: bool,
    /// Rendered records to append to the batch when `ok`.
    pub records: Vec<String>,
}

impl FileOutcome {
    pub fn succeeded(records: Vec<String>) -> Self {
        Self { ok: true, records }
    }

    pub fn failed() -> Self {
        Self {
            ok: false,
            records: Vec::new(),
        }
    }
}

/// Files claimed from the inbox.
#[derive(Debug, Default)]
pub struct ClaimOutcome {
    pub claimed: Vec<FileJob>,
    /// Files that could not be moved; they remain in the inbox.
    pub errors: Vec<WorkflowError>,
}

/// Files processed from `todo/`.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// Jobs in their final state; a job whose last move failed stays `Claimed`.
    pub jobs: Vec<FileJob>,
    /// Records appended to the batch.
    pub appended: usize,
    pub errors: Vec<WorkflowError>,
}

impl ProcessOutcome {
    pub fn count(&self, state: JobState) -> usize {
        self.jobs.iter().filter(|j| j.state == state).count()
    }
}

/// Non-hidden regular `*.xml` files of `dir`, sorted by name.
pub fn list_job_files(dir: &Path) -> Result<Vec<PathBuf>, WorkflowError> {
    let dir_str = dir.to_str().ok_or_else(|| WorkflowError::Scan {
        dir: dir.to_path_buf(),
        message: "path is not valid UTF-8".to_string(),
    })?;
    let pattern = format!("{}/*.{}", Pattern::escape(dir_str), JOB_EXTENSION);
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let paths = glob::glob_with(&pattern, options).map_err(|e| WorkflowError::Scan {
        dir: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| WorkflowError::Scan {
            dir: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let is_regular = fs::symlink_metadata(&path)
            .map(|m| m.file_type().is_file())
            .unwrap_or(false);
        if is_regular {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Move every job file from `inbox/` into `todo/`.
///
/// Once renamed the file belongs to this run; a failed rename leaves the
/// file in the inbox and is reported.
pub fn claim_pending(dirs: &WorkflowDirs) -> Result<ClaimOutcome, WorkflowError> {
    let mut outcome = ClaimOutcome::default();

    for path in list_job_files(&dirs.inbox)? {
        match FileJob::new(path, JobState::Pending).move_to(&dirs.todo, JobState::Claimed) {
            Ok(job) => outcome.claimed.push(job),
            Err((job, e)) => {
                error!("Failed to claim {}: {}", job.path.display(), e);
                outcome.errors.push(e);
            }
        }
    }

    info!("Claimed {} files from {}", outcome.claimed.len(), dirs.inbox.display());
    Ok(outcome)
}

/// Handle every job file in `todo/` exactly once.
///
/// A file is moved to `success/` before its records are appended, so a file
/// that cannot be moved contributes nothing and is picked up again by the
/// next run. A failed append is fatal: every file that succeeded in this call
/// is returned to `todo/` so the caller can discard the partial batch.
pub fn process_each<S, F>(
    dirs: &WorkflowDirs,
    sink: &mut S,
    mut handler: F,
) -> Result<ProcessOutcome, WorkflowError>
where
    S: RecordSink + ?Sized,
    F: FnMut(&Path) -> FileOutcome,
{
    let mut outcome = ProcessOutcome::default();

    for path in list_job_files(&dirs.todo)? {
        let job = FileJob::new(path, JobState::Claimed);
        let result = handler(&job.path);

        let (target, state) = if result.ok {
            (&dirs.success, JobState::Succeeded)
        } else {
            (&dirs.failure, JobState::Failed)
        };

        match job.move_to(target, state) {
            Ok(job) => {
                if result.ok {
                    if let Err(e) = sink.append(&result.records) {
                        error!("Failed to append records of {}: {}", job.file_name(), e);
                        outcome.jobs.push(job);
                        requeue_succeeded(dirs, outcome.jobs);
                        return Err(e);
                    }
                    outcome.appended += result.records.len();
                    info!("{} succeeded with {} records", job.file_name(), result.records.len());
                } else {
                    warn!("{} failed", job.file_name());
                }
                outcome.jobs.push(job);
            }
            Err((job, e)) => {
                error!("Failed to route {}: {}", job.path.display(), e);
                outcome.errors.push(e);
                outcome.jobs.push(job);
            }
        }
    }

    Ok(outcome)
}

/// Move every succeeded job back to `todo/`.
fn requeue_succeeded(dirs: &WorkflowDirs, jobs: Vec<FileJob>) {
    for job in jobs.into_iter().filter(|j| j.state == JobState::Succeeded) {
        match job.requeue(&dirs.todo) {
            Ok(job) => warn!("Returned {} to {}", job.file_name(), dirs.todo.display()),
            Err((job, e)) => error!("Failed to return {} to todo: {}", job.path.display(), e),
        }
    }
}
