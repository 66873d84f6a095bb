//! The output batch file and its handoff to the destination.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::WorkflowError;

/// What happened to the batch at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchDisposition {
    /// Moved into the destination inbox at this path.
    Delivered(PathBuf),
    /// Deleted because nothing was written.
    Discarded,
}

/// Destination of rendered records.
pub trait RecordSink {
    /// Append rendered records verbatim.
    fn append(&mut self, records: &[String]) -> Result<(), WorkflowError>;
}

/// Batch being written in `outbox/`.
#[derive(Debug)]
pub struct BatchFile {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl BatchFile {
    /// Create a new, empty batch file; an existing file is never overwritten.
    pub fn create(outbox: &Path, name: &str) -> Result<Self, WorkflowError> {
        let path = outbox.join(name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| WorkflowError::Batch {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended so far.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Delete the batch without delivering it.
    pub fn discard(self) -> Result<(), WorkflowError> {
        let path = self.path;
        drop(self.writer);
        fs::remove_file(&path).map_err(|source| WorkflowError::Batch {
            path: path.clone(),
            source,
        })?;
        warn!("Discarded unfinished batch {}", path.display());
        Ok(())
    }

    fn close(self) -> Result<PathBuf, WorkflowError> {
        let path = self.path;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| WorkflowError::Batch {
                path: path.clone(),
                source: e.into_error(),
            })?;
        file.sync_all().map_err(|source| WorkflowError::Batch {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl RecordSink for BatchFile {
    fn append(&mut self, records: &[String]) -> Result<(), WorkflowError> {
        for record in records {
            self.writer
                .write_all(record.as_bytes())
                .map_err(|source| WorkflowError::Batch {
                    path: self.path.clone(),
                    source,
                })?;
        }
        self.records += records.len();
        Ok(())
    }
}

/// Deliver or discard the batch.
///
/// With `success_count > 0` the file is made group read/writable and moved
/// into `destination_inbox`; otherwise it is deleted. A file of the same name
/// already in the destination is never replaced: the batch stays in the
/// outbox and `DestinationExists` is returned.
pub fn finalize_batch(
    batch: BatchFile,
    destination_inbox: &Path,
    success_count: usize,
) -> Result<BatchDisposition, WorkflowError> {
    let path = batch.close()?;

    if success_count == 0 {
        fs::remove_file(&path).map_err(|source| WorkflowError::Batch {
            path: path.clone(),
            source,
        })?;
        info!("Discarded empty batch {}", path.display());
        return Ok(BatchDisposition::Discarded);
    }

    grant_group_access(&path)?;

    let name = path.file_name().map(PathBuf::from).unwrap_or_default();
    let target = destination_inbox.join(name);
    deliver(&path, &target)?;

    info!("Delivered batch with {} invoices to {}", success_count, target.display());
    Ok(BatchDisposition::Delivered(target))
}

/// Move `from` to `to` without replacing an existing `to`.
///
/// Linking fails atomically when the target exists. Filesystems without hard
/// links fall back to a checked rename.
fn deliver(from: &Path, to: &Path) -> Result<(), WorkflowError> {
    let exists = || WorkflowError::DestinationExists {
        batch: from.to_path_buf(),
        target: to.to_path_buf(),
    };
    let rename_error = |source| WorkflowError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    match fs::hard_link(from, to) {
        Ok(()) => fs::remove_file(from).map_err(rename_error),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(exists()),
        Err(_) if to.exists() => Err(exists()),
        Err(_) => fs::rename(from, to).map_err(rename_error),
    }
}

#[cfg(unix)]
fn grant_group_access(path: &Path) -> Result<(), WorkflowError> {
    use std::os::unix::fs::PermissionsExt;

    let batch_error = |source| WorkflowError::Batch {
        path: path.to_path_buf(),
        source,
    };
    let mut permissions = fs::metadata(path).map_err(batch_error)?.permissions();
    permissions.set_mode(permissions.mode() | 0o060);
    fs::set_permissions(path, permissions).map_err(batch_error)
}

#[cfg(not(unix))]
fn grant_group_access(_path: &Path) -> Result<(), WorkflowError> {
    Ok(())
}
