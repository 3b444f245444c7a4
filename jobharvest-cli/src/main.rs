// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `JobHarvest` CLI - harvest job postings from paginated career APIs.
//!
//! # Examples
//!
//! ```bash
//! # List the available sources
//! jobharvest sources
//!
//! # Probe a source's total count and page range
//! jobharvest discover --source amazon
//!
//! # Harvest listings as CSV
//! jobharvest run --source google
//!
//! # Harvest listings and detail records as JSON
//! jobharvest run --source microsoft --details --format json
//!
//! # Machine readable summary
//! jobharvest --json run --source netflix
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use jobharvest_fetch::HarvestError;
use jobharvest_sources::SourceError;
use jobharvest_store::{HarvestConfig, StoreError};

use commands::{discover, run, sources};

// ============================================================================
// CLI Definition
// ============================================================================

/// `JobHarvest` CLI - job posting harvester.
#[derive(Parser)]
#[command(name = "jobharvest")]
#[command(about = "Harvest job postings from paginated career APIs")]
#[command(long_about = r"
JobHarvest discovers how many postings a career site lists, fetches every
listing page concurrently and optionally fetches each posting's detail
record in spaced batches.

Built-in sources:
  • Microsoft (microsoft, msft)   listing + details
  • Google (google, alphabet)     listing
  • Amazon (amazon, aws)          listing, capped at 10 000 postings
  • Netflix (netflix)             listing

Further sources can be declared in the configuration file.

Examples:
  jobharvest sources                          # List sources
  jobharvest discover --source amazon         # Count and page range only
  jobharvest run --source google              # Listing harvest to CSV
  jobharvest run --source msft --details      # Listing + detail harvest
")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the platform config directory).
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Print summaries as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Loads the configuration file named by `--config`, or the default one.
    pub fn load_config(&self) -> Result<HarvestConfig> {
        let config = match &self.config {
            Some(path) => HarvestConfig::load_from(path)?,
            None => HarvestConfig::load()?,
        };
        Ok(config)
    }

    /// Returns the configuration file path in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(HarvestConfig::default_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List available sources.
    #[command(visible_alias = "ls")]
    Sources,

    /// Probe a source's total count and page range without harvesting.
    #[command(visible_alias = "d")]
    Discover(discover::DiscoverArgs),

    /// Harvest a source and write the records.
    #[command(visible_alias = "r")]
    Run(run::RunArgs),
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Source not found.
    UnknownSource = 2,
    /// The probe request could not establish a total count.
    DiscoveryFailed = 3,
    /// Interrupted; partial output was written.
    Cancelled = 130,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(err: &anyhow::Error) -> Self {
        let unknown = matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::UnknownSource(_))
        ) || matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Source(SourceError::UnknownSource(_)))
        );

        if unknown {
            Self::UnknownSource
        } else if matches!(err.downcast_ref::<HarvestError>(), Some(HarvestError::Discovery(_))) {
            Self::DiscoveryFailed
        } else {
            Self::Error
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("jobharvest=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobharvest=info"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Sources => sources::run(&cli),
        Commands::Discover(args) => discover::run(args, &cli).await,
        Commands::Run(args) => run::run(args, &cli).await,
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::for_error(&e) as i32);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
