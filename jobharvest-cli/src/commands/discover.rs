//! Discover command - probe a source without harvesting it.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Args;
use jobharvest_fetch::{HarvestSettings, Harvester};
use jobharvest_store::{filter_file_name, save_json};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode};

/// Arguments for the discover command.
#[derive(Args)]
pub struct DiscoverArgs {
    /// Source id or alias.
    #[arg(long, short)]
    pub source: String,

    /// Save the source's filter metadata as `{source}-filter-{date}.json`.
    #[arg(long)]
    pub save_filters: bool,

    /// Directory for the filter file (defaults to the configured one).
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
}

/// Runs the discover command.
pub async fn run(args: &DiscoverArgs, cli: &Cli) -> Result<ExitCode> {
    let config = cli.load_config()?;
    let registry = config.registry()?;
    let adapter = config.adapter(&registry, &args.source)?;
    let source = adapter.descriptor();

    info!(source = %source.id, "Discovering");

    let ctx = super::harvest_context(HarvestSettings::default(), &source.config)?;
    let discovery = Harvester::new(ctx).discover(&adapter).await?;

    if args.save_filters {
        match discovery.facets() {
            Some(facets) => {
                let dir = args.output_dir.as_ref().unwrap_or(&config.output_dir);
                let path = dir.join(filter_file_name(&source.id, Local::now().date_naive()));
                save_json(&path, facets).await?;
                info!(path = %path.display(), "Saved filters");
            }
            None => info!(source = %source.id, "Source reported no filters"),
        }
    }

    if cli.json {
        let formatter = JsonFormatter::new(cli.pretty);
        println!("{}", formatter.format_discovery(source, &discovery)?);
    } else {
        let formatter = TextFormatter::new(!cli.no_color);
        println!("{}", formatter.format_discovery(source, &discovery));
    }

    Ok(ExitCode::Success)
}
