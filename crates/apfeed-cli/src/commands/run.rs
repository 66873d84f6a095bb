//! Run command - one orchestrated pass over the workflow root.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use apfeed_core::{BatchDisposition, JobState, Pipeline, RunConfig, RunSummary};

use super::load_config;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Workflow root containing inbox, todo, outbox, success and failure
    #[arg(long)]
    root: Option<PathBuf>,

    /// Destination root; batches are delivered to its inbox
    #[arg(long)]
    destination: Option<PathBuf>,

    /// Debug log file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Error report file (default: stderr)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write a per-file summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub fn run(args: RunArgs, config_path: Option<&str>, verbose: u8) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(root) = args.root {
        config.paths.root = Some(root);
    }
    if let Some(destination) = args.destination {
        config.paths.destination = Some(destination);
    }
    if let Some(log) = args.log {
        config.paths.log = Some(log);
    }
    if let Some(report) = args.report {
        config.paths.report = Some(report);
    }
    let config = config.resolve()?;

    init_file_logging(&config.log, verbose)?;

    let pipeline = Pipeline::new(config.clone(), Local::now().naive_local());
    let summary = pipeline.run()?;

    if summary.errors.has_errors() {
        write_report(&config, &summary)?;
    }

    if let Some(path) = &args.summary {
        write_summary(path, &summary)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            path.display()
        );
    }

    print_summary(&summary, start);
    Ok(())
}

fn init_file_logging(path: &Path, verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("Cannot open log file {}: {}", path.display(), e))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn write_report(config: &RunConfig, summary: &RunSummary) -> anyhow::Result<()> {
    let report = summary.errors.render_report();
    match &config.report {
        Some(path) => fs::write(path, report)?,
        None => eprint!("{}", report),
    }
    Ok(())
}

fn status_label(state: JobState) -> &'static str {
    match state {
        JobState::Pending => "pending",
        JobState::Claimed => "stranded",
        JobState::Succeeded => "success",
        JobState::Failed => "failure",
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["file", "status", "invoices", "errors"])?;
    for file in &summary.files {
        wtr.write_record([
            file.file.as_str(),
            status_label(file.status),
            &file.invoices.to_string(),
            &file.errors.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_summary(summary: &RunSummary, start: Instant) {
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        summary.files.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} invoices",
        style(summary.succeeded).green(),
        style(summary.failed).red(),
        summary.invoices
    );

    match &summary.batch {
        BatchDisposition::Delivered(path) => {
            println!("   Batch delivered to {}", path.display());
        }
        BatchDisposition::Discarded => {
            println!("   {}", style("No invoices; batch discarded").yellow());
        }
    }

    if summary.errors.has_errors() {
        println!(
            "{} {} errors recorded",
            style("!").yellow(),
            summary.errors.len()
        );
    }
}
