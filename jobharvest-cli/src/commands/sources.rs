//! Sources command - list available sources.

use anyhow::Result;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode};

/// Runs the sources command.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    info!("Listing sources");

    let config = cli.load_config()?;
    let registry = config.registry()?;
    let sources = registry.all();

    if cli.json {
        let formatter = JsonFormatter::new(cli.pretty);
        println!("{}", formatter.format_sources(sources)?);
        return Ok(ExitCode::Success);
    }

    let formatter = TextFormatter::new(!cli.no_color);

    println!("{}", formatter.format_sources_header());
    println!("{}", "─".repeat(70));

    for desc in sources {
        println!("{}", formatter.format_source_line(desc));
    }

    println!();
    println!(
        "Total: {} sources ({} with details)",
        sources.len(),
        sources.iter().filter(|d| d.supports_details()).count()
    );
    if !config.custom_sources.is_empty() {
        println!("Custom sources from {}", cli.config_path().display());
    }

    Ok(ExitCode::Success)
}
