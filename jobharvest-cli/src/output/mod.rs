//! Output formatting for CLI.

mod json;
mod text;

use std::path::PathBuf;

use jobharvest_core::HarvestSummary;
use jobharvest_fetch::Discovery;
use jobharvest_sources::SourceDescriptor;

pub use json::JsonFormatter;
pub use text::TextFormatter;


/// Everything printed after a run.
pub struct RunReport<'a> {
    /// Source that was harvested.
    pub source: &'a SourceDescriptor,
    /// Discovery outcome, absent when cancelled while probing.
    pub discovery: Option<&'a Discovery>,
    /// Listing phase counters.
    pub listing: HarvestSummary,
    /// Detail phase counters, if that phase ran.
    pub details: Option<HarvestSummary>,
    /// Listing records without an identifier.
    pub missing_identifiers: usize,
    /// Files written.
    pub files: Vec<PathBuf>,
}

impl RunReport<'_> {
    /// Whether any phase was cut short.
    pub fn cancelled(&self) -> bool {
        self.listing.cancelled || self.details.is_some_and(|d| d.cancelled)
    }
}
