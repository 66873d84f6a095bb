//! CLI for the vendor invoice to accounting feed pipeline.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, convert, run};

/// apfeed - Convert vendor invoice XML exports into fixed-width accounting batches
#[derive(Parser)]
#[command(name = "apfeed")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every pending file of the workflow root
    Run(run::RunArgs),

    /// Convert a single XML export without touching the workflow directories
    Convert(convert::ConvertArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Logs to the configured log file once the configuration is resolved
        Commands::Run(args) => run::run(args, cli.config.as_deref(), cli.verbose),
        Commands::Convert(args) => {
            init_stderr_logging(cli.verbose)?;
            convert::run(args)
        }
        Commands::Config(args) => {
            init_stderr_logging(cli.verbose)?;
            config::run(args, cli.config.as_deref())
        }
    }
}

fn init_stderr_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
