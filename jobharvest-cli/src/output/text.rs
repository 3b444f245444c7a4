//! Text output formatting with colors.

use jobharvest_core::{HarvestSummary, PageIndexBase};
use jobharvest_fetch::Discovery;
use jobharvest_sources::SourceDescriptor;
use serde_json::Value;

use super::RunReport;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ------------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------------

    /// Formats the source list header.
    pub fn format_sources_header(&self) -> String {
        format!(
            "{:<12} {:<12} {:<10} {:<8} {:<8} {}",
            self.bold("Source"),
            self.bold("Aliases"),
            self.bold("Paging"),
            self.bold("Size"),
            self.bold("Details"),
            self.bold("Name")
        )
    }

    /// Formats a single source line.
    pub fn format_source_line(&self, desc: &SourceDescriptor) -> String {
        let aliases = if desc.aliases.is_empty() {
            "−".to_string()
        } else {
            desc.aliases.join(",")
        };

        let paging = match desc.config.page_index_base {
            PageIndexBase::Zero => "from 0",
            PageIndexBase::One => "from 1",
        };

        let details = if desc.supports_details() {
            self.green("✓")
        } else {
            self.dim("−")
        };

        format!(
            "{:<12} {:<12} {:<10} {:<8} {:<8} {}",
            desc.id, aliases, paging, desc.config.page_size, details, desc.display_name
        )
    }

    // ------------------------------------------------------------------------
    // Discovery
    // ------------------------------------------------------------------------

    /// Formats a discovery outcome.
    pub fn format_discovery(&self, desc: &SourceDescriptor, discovery: &Discovery) -> String {
        let plan = discovery.plan();
        let range = discovery.page_range();

        let mut lines = vec![format!("{} ({})", self.bold(&desc.display_name), desc.id)];
        lines.push(format!("Postings:  {}", self.cyan(&plan.total_count.to_string())));

        let pages = if plan.capped {
            format!(
                "{} of {} {}",
                plan.effective_page_count,
                plan.raw_page_count,
                self.yellow("(capped)")
            )
        } else {
            plan.effective_page_count.to_string()
        };
        lines.push(format!("Pages:     {pages}"));

        if let Some(last) = range.last() {
            lines.push(format!("Range:     {}..={last}", range.first()));
        }

        if let Some(facets) = discovery.facets() {
            let count = match facets {
                Value::Object(groups) => groups.len(),
                Value::Array(groups) => groups.len(),
                _ => 1,
            };
            lines.push(format!("Filters:   {count} facet groups"));
        }

        lines.join("\n")
    }

    // ------------------------------------------------------------------------
    // Runs
    // ------------------------------------------------------------------------

    /// Formats the summary of a run.
    pub fn format_run(&self, report: &RunReport<'_>) -> String {
        let mut lines = vec![format!(
            "{} ({})",
            self.bold(&report.source.display_name),
            report.source.id
        )];

        if let Some(discovery) = report.discovery {
            lines.push(format!(
                "Discovered {} postings on {} pages",
                discovery.total_count(),
                discovery.page_range().len()
            ));
        }

        lines.push(self.format_phase("Listing", &report.listing));
        if let Some(details) = &report.details {
            lines.push(self.format_phase("Details", details));
        }

        if report.missing_identifiers > 0 {
            lines.push(self.yellow(&format!(
                "{} listing records had no identifier",
                report.missing_identifiers
            )));
        }

        for file in &report.files {
            lines.push(format!("Wrote {}", self.dim(&file.display().to_string())));
        }

        if report.cancelled() {
            lines.push(self.yellow("Interrupted; output is partial"));
        }

        lines.join("\n")
    }

    /// Formats the counters of one phase.
    pub fn format_phase(&self, label: &str, summary: &HarvestSummary) -> String {
        let failed = if summary.failed == 0 {
            self.green("0 failed")
        } else {
            self.red(&format!("{} failed", summary.failed))
        };

        format!(
            "{:<8} {} records, {}/{} fetches succeeded, {}",
            format!("{label}:"),
            summary.records,
            summary.succeeded,
            summary.attempted,
            failed
        )
    }

    // ------------------------------------------------------------------------
    // Colors
    // ------------------------------------------------------------------------

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}
