//! Error types for the apfeed-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the apfeed library.
#[derive(Error, Debug)]
pub enum ApfeedError {
    /// XML document could not be loaded.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Fixed-width rendering error.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Workflow directory or lock error.
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building the XML document tree.
#[derive(Error, Debug)]
pub enum XmlError {
    /// The underlying reader rejected the input.
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// The input ended while elements were still open.
    #[error("unexpected end of document, <{0}> is not closed")]
    Unclosed(String),

    /// A second top-level element was found.
    #[error("more than one root element (found <{0}>)")]
    MultipleRoots(String),

    /// Character data outside the root element.
    #[error("text outside the root element")]
    StrayText,

    /// The input contained no element at all.
    #[error("document has no root element")]
    Empty,
}

/// Outcome of a unique sub-element lookup that did not yield a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// No element exists at the path.
    #[error("field not found: {path}")]
    NotFound { path: String },

    /// More than one element exists at the path.
    #[error("field {path} is not unique ({count} matches)")]
    Ambiguous { path: String, count: usize },
}

/// Errors related to fixed-width record rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Column name is not part of the record layout.
    #[error("unknown column {column} in {record} record")]
    UnknownColumn {
        record: &'static str,
        column: String,
    },

    /// An invoice reached the formatter without line items.
    #[error("invoice has no line items")]
    EmptyInvoice,
}

/// Errors related to the directory workflow.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A required directory does not exist.
    #[error("directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// Moving a job file between directories failed.
    #[error("failed to move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Listing a queue directory failed.
    #[error("failed to scan {dir}: {message}")]
    Scan { dir: PathBuf, message: String },

    /// Another run holds the instance lock.
    #[error("another run is already active (lock held on {0})")]
    AlreadyRunning(PathBuf),

    /// The lock file could not be opened.
    #[error("failed to open lock file {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch with the same name is already waiting in the destination.
    #[error("batch {batch} not delivered: {target} already exists")]
    DestinationExists { batch: PathBuf, target: PathBuf },

    /// Batch file I/O failed.
    #[error("batch file {path}: {source}")]
    Batch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required path was not configured.
    #[error("missing required path: {0}")]
    MissingPath(&'static str),

    /// The configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Parse(String),

    /// Reading or writing the configuration file failed.
    #[error("configuration file I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the apfeed library.
pub type Result<T> = std::result::Result<T, ApfeedError>;
