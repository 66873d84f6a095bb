//! One complete run over a workflow root.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use crate::error::{Result, WorkflowError};
use crate::invoice::InvoiceExtractor;
use crate::models::config::RunConfig;
use crate::report::{ErrorCategory, ErrorLog};
use crate::workflow::{
    claim_pending, finalize_batch, process_each, BatchDisposition, BatchFile, FileOutcome,
    JobState, SingleInstanceGuard, WorkflowDirs,
};

/// Per-file result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Source file name.
    pub file: String,
    /// Final state; `Claimed` when the file could not be routed.
    pub status: JobState,
    /// Invoices written to the batch.
    pub invoices: usize,
    /// Errors recorded against the file.
    pub errors: usize,
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files claimed from the inbox in this run.
    pub claimed: usize,
    /// Files moved to `success/`.
    pub succeeded: usize,
    /// Files not moved to `success/`.
    pub failed: usize,
    /// Invoices written to the batch.
    pub invoices: usize,
    pub batch: BatchDisposition,
    pub files: Vec<FileReport>,
    pub errors: ErrorLog,
}

/// Claims, converts and routes every pending file, then delivers the batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RunConfig,
    extractor: InvoiceExtractor,
    started: NaiveDateTime,
}

impl Pipeline {
    /// Create a pipeline for a run started at `started`.
    pub fn new(config: RunConfig, started: NaiveDateTime) -> Self {
        Self {
            config,
            extractor: InvoiceExtractor::new(started),
            started,
        }
    }

    /// Replace the extractor.
    pub fn with_extractor(mut self, extractor: InvoiceExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn dirs(&self) -> WorkflowDirs {
        WorkflowDirs::new(&self.config.root, &self.config.destination)
    }

    /// Execute the run.
    ///
    /// Missing directories, a held lock, a batch of the same name still waiting
    /// in the destination and batch I/O failures abort the run.
    /// Everything else is recorded in the summary's error log.
    pub fn run(&self) -> Result<RunSummary> {
        let dirs = self.dirs();
        dirs.verify()?;
        let _guard = SingleInstanceGuard::acquire(&dirs.root)?;

        let name = self.config.batch.file_name(self.started);
        let target = dirs.destination_inbox.join(&name);
        if target.exists() {
            return Err(WorkflowError::DestinationExists {
                batch: dirs.outbox.join(&name),
                target,
            }
            .into());
        }

        let mut errors = ErrorLog::new();

        let claim = claim_pending(&dirs)?;
        for e in &claim.errors {
            errors.record(ErrorCategory::Workflow, e.to_string());
        }

        let mut batch = BatchFile::create(&dirs.outbox, &name)?;
        info!("Writing batch {}", batch.path().display());

        let mut handled: Vec<(usize, usize)> = Vec::new();
        let processed = match process_each(&dirs, &mut batch, |path| {
            let before = errors.len();
            let outcome = self.handle_file(path, &mut errors);
            handled.push((outcome.records.len(), errors.len() - before));
            outcome
        }) {
            Ok(processed) => processed,
            Err(e) => {
                if let Err(cleanup) = batch.discard() {
                    error!("Failed to discard partial batch: {}", cleanup);
                }
                return Err(e.into());
            }
        };

        for e in &processed.errors {
            errors.record(ErrorCategory::Workflow, e.to_string());
        }

        let files: Vec<FileReport> = processed
            .jobs
            .iter()
            .zip(&handled)
            .map(|(job, &(records, file_errors))| FileReport {
                file: job.file_name(),
                status: job.state,
                invoices: if job.state == JobState::Succeeded { records } else { 0 },
                errors: file_errors,
            })
            .collect();

        let batch = finalize_batch(batch, &dirs.destination_inbox, processed.appended)?;

        let summary = RunSummary {
            claimed: claim.claimed.len(),
            succeeded: processed.count(JobState::Succeeded),
            failed: processed.jobs.len() - processed.count(JobState::Succeeded),
            invoices: processed.appended,
            batch,
            files,
            errors,
        };

        info!(
            "Run finished: {} claimed, {} succeeded, {} failed, {} invoices, {} errors",
            summary.claimed,
            summary.succeeded,
            summary.failed,
            summary.invoices,
            summary.errors.len()
        );
        Ok(summary)
    }

    /// Convert one claimed file.
    fn handle_file(&self, path: &Path, errors: &mut ErrorLog) -> FileOutcome {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                errors.record(ErrorCategory::Workflow, format!("{file}: {e}"));
                return FileOutcome::failed();
            }
        };

        let extraction = match self.extractor.extract_str(&content) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("{} is not well-formed: {}", file, e);
                errors.record(ErrorCategory::XmlParse, format!("{file}: {e}"));
                return FileOutcome::failed();
            }
        };

        for rejection in &extraction.rejections {
            errors.record(ErrorCategory::InvoiceValidation, format!("{file}: {rejection}"));
        }

        FileOutcome::succeeded(extraction.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::BatchConfig;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const ONE_INVOICE: &str = "<payment_data><invoice_list><invoice>\
        <invoice_number>A-1</invoice_number>\
        <unique_identifier>U-1</unique_identifier>\
        <invoice_date>03/01/2016</invoice_date>\
        <vendor_FinancialSys_Code>100234</vendor_FinancialSys_Code>\
        <invoice_amount><sum>10.00</sum></invoice_amount>\
        <invoice_line_list><invoice_line><total_price>10.00</total_price>\
        <reporting_code>400100</reporting_code><external_id>CC1</external_id>\
        </invoice_line></invoice_line_list></invoice></invoice_list></payment_data>";

    fn started() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, 2)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap()
    }

    fn setup() -> (tempfile::TempDir, Pipeline) {
        let temp = tempfile::tempdir().unwrap();
        let config = RunConfig {
            root: temp.path().join("feed"),
            destination: temp.path().join("erp"),
            log: temp.path().join("apfeed.log"),
            report: None,
            batch: BatchConfig::default(),
        };
        let pipeline = Pipeline::new(config, started());
        pipeline.dirs().create_all().unwrap();
        (temp, pipeline)
    }

    #[test]
    fn test_run_requires_directories() {
        let temp = tempfile::tempdir().unwrap();
        let config = RunConfig {
            root: temp.path().join("missing"),
            destination: temp.path().join("erp"),
            log: temp.path().join("apfeed.log"),
            report: None,
            batch: BatchConfig::default(),
        };
        let result = Pipeline::new(config, started()).run();
        assert!(matches!(
            result,
            Err(crate::ApfeedError::Workflow(crate::WorkflowError::MissingDirectory(_)))
        ));
    }

    #[test]
    fn test_run_delivers_batch() {
        let (_temp, pipeline) = setup();
        let dirs = pipeline.dirs();
        fs::write(dirs.inbox.join("ok.xml"), ONE_INVOICE).unwrap();
        fs::write(dirs.inbox.join("broken.xml"), "<payment_data>").unwrap();

        let summary = pipeline.run().unwrap();
        assert_eq!(summary.claimed, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.invoices, 1);
        assert_eq!(summary.errors.messages(ErrorCategory::XmlParse).len(), 1);

        let delivered = dirs.destination_inbox.join("ALMA_SAP_2018-05-02-073000");
        assert_eq!(summary.batch, BatchDisposition::Delivered(delivered.clone()));
        let content = fs::read_to_string(delivered).unwrap();
        assert_eq!(content.matches("\r\n").count(), 2);

        assert_eq!(
            summary.files,
            vec![
                FileReport {
                    file: "broken.xml".to_string(),
                    status: JobState::Failed,
                    invoices: 0,
                    errors: 1,
                },
                FileReport {
                    file: "ok.xml".to_string(),
                    status: JobState::Succeeded,
                    invoices: 1,
                    errors: 0,
                },
            ]
        );
    }

    #[test]
    fn test_empty_run_discards_batch() {
        let (_temp, pipeline) = setup();
        let summary = pipeline.run().unwrap();
        assert_eq!(summary.batch, BatchDisposition::Discarded);
        assert_eq!(summary.claimed, 0);
        assert!(!summary.errors.has_errors());
        assert!(fs::read_dir(&pipeline.dirs().outbox).unwrap().next().is_none());
    }

    #[test]
    fn test_same_day_batch_is_not_replaced() {
        let temp = tempfile::tempdir().unwrap();
        let config = RunConfig {
            root: temp.path().join("feed"),
            destination: temp.path().join("erp"),
            log: temp.path().join("apfeed.log"),
            report: None,
            batch: BatchConfig {
                prefix: "ALMA_SAP".to_string(),
                timestamp_format: "%Y%m%d".to_string(),
            },
        };
        let day = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let morning = Pipeline::new(config.clone(), day.and_hms_opt(8, 0, 0).unwrap());
        let evening = Pipeline::new(config, day.and_hms_opt(18, 0, 0).unwrap());
        let dirs = morning.dirs();
        dirs.create_all().unwrap();

        fs::write(dirs.inbox.join("a.xml"), ONE_INVOICE).unwrap();
        let first = morning.run().unwrap();
        let delivered = dirs.destination_inbox.join("ALMA_SAP_20200102");
        assert_eq!(first.batch, BatchDisposition::Delivered(delivered.clone()));
        let first_content = fs::read_to_string(&delivered).unwrap();

        fs::write(dirs.inbox.join("b.xml"), ONE_INVOICE.replace("A-1", "B-2")).unwrap();
        assert!(matches!(
            evening.run(),
            Err(crate::ApfeedError::Workflow(WorkflowError::DestinationExists { .. }))
        ));

        assert_eq!(fs::read_to_string(&delivered).unwrap(), first_content);
        assert!(dirs.inbox.join("b.xml").exists());
        assert!(fs::read_dir(&dirs.outbox).unwrap().next().is_none());
    }

    #[test]
    fn test_second_run_is_locked_out() {
        let (_temp, pipeline) = setup();
        let _held = SingleInstanceGuard::acquire(&pipeline.dirs().root).unwrap();
        assert!(matches!(
            pipeline.run(),
            Err(crate::ApfeedError::Workflow(crate::WorkflowError::AlreadyRunning(_)))
        ));
    }
}
