//! Convert command - render one XML export without the workflow.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use console::style;
use tracing::debug;

use apfeed_core::invoice::rules::CostCenterPolicy;
use apfeed_core::InvoiceExtractor;

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Cost-center policy (default: the one in force now)
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PolicyArg {
    /// GL code and cost center split from `external_id`
    Combined,
    /// GL code from `reporting_code`, cost center from `external_id`
    Separate,
}

impl From<PolicyArg> for CostCenterPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Combined => CostCenterPolicy::Combined,
            PolicyArg::Separate => CostCenterPolicy::Separate,
        }
    }
}

pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let content = fs::read_to_string(&args.input)?;

    let mut extractor = InvoiceExtractor::new(Local::now().naive_local());
    if let Some(policy) = args.policy {
        extractor = extractor.with_policy(policy.into());
    }
    debug!("Converting {} with {:?} policy", args.input.display(), extractor.policy());

    let extraction = extractor
        .extract_str(&content)
        .map_err(|e| anyhow::anyhow!("{}: {}", args.input.display(), e))?;

    for rejection in &extraction.rejections {
        eprintln!("{} {}", style("✗").red(), rejection);
    }

    let output = extraction.records.concat();
    match args.output {
        Some(path) => {
            fs::write(&path, &output)?;
            eprintln!(
                "{} Wrote {} invoices to {}",
                style("✓").green(),
                extraction.invoice_count(),
                path.display()
            );
        }
        None => print!("{}", output),
    }

    if extraction.skipped > 0 {
        eprintln!(
            "{} Skipped {} zero-amount invoices",
            style("ℹ").blue(),
            extraction.skipped
        );
    }

    Ok(())
}
