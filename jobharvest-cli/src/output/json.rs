//! JSON output formatting.

use anyhow::Result;
use jobharvest_core::{HarvestSummary, PageIndexBase};
use jobharvest_fetch::Discovery;
use jobharvest_sources::SourceDescriptor;
use serde::Serialize;
use serde_json::Value;

use super::RunReport;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a source listing entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutput {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub page_size: u32,
    pub page_index_base: PageIndexBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_cap: Option<u64>,
    pub details: bool,
}

/// JSON output for a discovery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOutput {
    pub source: String,
    pub total_count: u64,
    pub raw_page_count: u64,
    pub effective_page_count: u64,
    pub capped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Value>,
}

/// Counters of one phase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseOutput {
    pub records: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// JSON output for a run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryOutput>,
    pub listing: PhaseOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<PhaseOutput>,
    pub missing_identifiers: usize,
    pub cancelled: bool,
    pub files: Vec<String>,
}

impl From<&HarvestSummary> for PhaseOutput {
    fn from(summary: &HarvestSummary) -> Self {
        Self {
            records: summary.records,
            attempted: summary.attempted,
            succeeded: summary.succeeded,
            failed: summary.failed,
            cancelled: summary.cancelled,
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the source list.
    pub fn format_sources(&self, sources: &[SourceDescriptor]) -> Result<String> {
        let outputs: Vec<SourceOutput> = sources
            .iter()
            .map(|desc| SourceOutput {
                id: desc.id.clone(),
                display_name: desc.display_name.clone(),
                aliases: desc.aliases.clone(),
                page_size: desc.config.page_size,
                page_index_base: desc.config.page_index_base,
                record_cap: desc.config.retrievable_record_cap,
                details: desc.supports_details(),
            })
            .collect();

        self.format(&outputs)
    }

    /// Formats a discovery outcome.
    pub fn format_discovery(
        &self,
        desc: &SourceDescriptor,
        discovery: &Discovery,
    ) -> Result<String> {
        self.format(&Self::discovery_to_output(desc, discovery))
    }

    /// Formats the summary of a run.
    pub fn format_run(&self, report: &RunReport<'_>) -> Result<String> {
        let output = RunOutput {
            source: report.source.id.clone(),
            discovery: report
                .discovery
                .map(|d| Self::discovery_to_output(report.source, d)),
            listing: PhaseOutput::from(&report.listing),
            details: report.details.as_ref().map(PhaseOutput::from),
            missing_identifiers: report.missing_identifiers,
            cancelled: report.cancelled(),
            files: report
                .files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        };

        self.format(&output)
    }

    fn discovery_to_output(desc: &SourceDescriptor, discovery: &Discovery) -> DiscoveryOutput {
        let plan = discovery.plan();
        let range = discovery.page_range();

        DiscoveryOutput {
            source: desc.id.clone(),
            total_count: plan.total_count,
            raw_page_count: plan.raw_page_count,
            effective_page_count: plan.effective_page_count,
            capped: plan.capped,
            first_page: range.last().map(|_| range.first()),
            last_page: range.last(),
            facets: discovery.facets().cloned(),
        }
    }
}
