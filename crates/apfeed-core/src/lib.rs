//! Core library for the vendor invoice feed.
//!
//! This crate provides:
//! - An XML document tree for invoice batch exports
//! - Business rules for invoice/line inclusion, dates and cost-center policy
//! - Fixed-width record rendering for the accounting interchange format
//! - A directory-based job queue with a single-instance guard
//! - The orchestrated run tying these together

pub mod error;
pub mod format;
pub mod invoice;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod workflow;
pub mod xml;

pub use error::{ApfeedError, ConfigError, FieldError, FormatError, Result, WorkflowError, XmlError};
pub use format::{Alignment, ColumnSpec, Record, RecordLayout, HEADER_LAYOUT, LINE_LAYOUT};
pub use invoice::{Extraction, InvoiceExtractor, InvoiceRejection};
pub use models::config::{AppConfig, RunConfig};
pub use models::invoice::{Invoice, InvoiceBuilder};
pub use pipeline::{FileReport, Pipeline, RunSummary};
pub use report::{ErrorCategory, ErrorLog};
pub use workflow::{BatchDisposition, FileJob, JobState, SingleInstanceGuard, WorkflowDirs};
pub use xml::{XmlDocument, XmlElement};
