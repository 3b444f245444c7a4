//! Run command - harvest a source and write the records.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use clap::Args;
use jobharvest_core::HarvestResult;
use jobharvest_fetch::{HarvestSettings, Harvester, TwoPhaseOutcome};
use jobharvest_store::{OutputFormat, filter_file_name, output_path, save_json, write_records};
use tracing::{info, warn};

use crate::output::{JsonFormatter, RunReport, TextFormatter};
use crate::{Cli, ExitCode};

/// Output run number of listing records.
const LISTING_RUN: u32 = 1;

/// Output run number of detail records.
const DETAIL_RUN: u32 = 2;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Source id or alias.
    #[arg(long, short)]
    pub source: String,

    /// Also fetch the detail record of every listed posting.
    #[arg(long)]
    pub details: bool,

    /// Output file format: csv or json (defaults to the configured one).
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Output directory (defaults to the configured one).
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Maximum simultaneous listing requests.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Identifiers per detail batch.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Seconds to pause between detail batches.
    #[arg(long)]
    pub delay_secs: Option<f64>,

    /// Seconds before a single request times out.
    #[arg(long)]
    pub timeout_secs: Option<f64>,

    /// Keep listing records in page order.
    #[arg(long)]
    pub stable_order: bool,

    /// Do not write the filter file.
    #[arg(long)]
    pub no_filters: bool,
}

impl RunArgs {
    /// Turns the tuning flags into run-level settings.
    fn settings(&self) -> Result<HarvestSettings> {
        Ok(HarvestSettings {
            concurrency_limit: self.concurrency,
            batch_size: self.batch_size,
            inter_batch_delay: self.delay_secs.map(|s| secs("delay-secs", s)).transpose()?,
            request_timeout: self.timeout_secs.map(|s| secs("timeout-secs", s)).transpose()?,
            stable_order: self.stable_order,
        })
    }
}

fn secs(flag: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| anyhow!("--{flag} must be a non-negative number of seconds, got {value}"))
}

/// Runs the run command.
pub async fn run(args: &RunArgs, cli: &Cli) -> Result<ExitCode> {
    let config = cli.load_config()?;
    let registry = config.registry()?;
    let adapter = config.adapter(&registry, &args.source)?;
    let source = adapter.descriptor();

    if args.details && !source.supports_details() {
        warn!(source = %source.id, "Source has no detail endpoint, harvesting listings only");
    }

    let ctx = super::harvest_context(args.settings()?, &source.config)?;
    let ctrl_c = super::cancel_on_ctrl_c(ctx.cancellation_token());
    let harvester = Harvester::new(ctx);

    info!(source = %source.id, details = args.details, "Starting harvest");

    let outcome = if args.details {
        harvester.run_two_phase(&adapter).await
    } else {
        harvester.run_listing(&adapter).await.map(|listing| TwoPhaseOutcome {
            discovery: listing.discovery,
            listing: listing.result,
            details: None,
            missing_identifiers: 0,
        })
    };
    ctrl_c.abort();
    let outcome = outcome?;

    let output = Output {
        dir: args.output_dir.as_ref().unwrap_or(&config.output_dir),
        source: &source.id,
        date: Local::now().date_naive(),
        format: args.format.unwrap_or(config.format),
        filters: !args.no_filters,
    };
    let files = output.write(&outcome).await?;

    let report = RunReport {
        source,
        discovery: outcome.discovery.as_ref(),
        listing: outcome.listing.summary(),
        details: outcome.details.as_ref().map(HarvestResult::summary),
        missing_identifiers: outcome.missing_identifiers,
        files,
    };

    if cli.json {
        let formatter = JsonFormatter::new(cli.pretty);
        println!("{}", formatter.format_run(&report)?);
    } else {
        let formatter = TextFormatter::new(!cli.no_color);
        println!("{}", formatter.format_run(&report));
    }

    if report.cancelled() {
        Ok(ExitCode::Cancelled)
    } else {
        Ok(ExitCode::Success)
    }
}

// ============================================================================
// Output Files
// ============================================================================

/// Where and how a run's records are written.
struct Output<'a> {
    dir: &'a Path,
    source: &'a str,
    date: NaiveDate,
    format: OutputFormat,
    filters: bool,
}

impl Output<'_> {
    /// Writes listing records, detail records and filters; returns the paths.
    ///
    /// Nothing is written when the run never got past discovery.
    async fn write(&self, outcome: &TwoPhaseOutcome) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let Some(discovery) = &outcome.discovery else {
            return Ok(files);
        };

        let path = output_path(self.dir, self.source, self.date, LISTING_RUN, self.format);
        write_records(&path, outcome.listing.records(), self.format).await?;
        files.push(path);

        if let Some(details) = &outcome.details {
            let path = output_path(self.dir, self.source, self.date, DETAIL_RUN, self.format);
            write_records(&path, details.records(), self.format).await?;
            files.push(path);
        }

        if let Some(facets) = discovery.facets().filter(|_| self.filters) {
            let path = self.dir.join(filter_file_name(self.source, self.date));
            save_json(&path, facets).await?;
            files.push(path);
        }

        Ok(files)
    }
}

// ============================================================================
// Tests
// ============================================================================
