//! Domain models for `jobharvest`.
//!
//! - [`record`] - Records and identifiers
//! - [`source`] - Per-source configuration and page arithmetic
//! - [`result`] - Harvest results and failure bookkeeping
//! - [`phase`] - Harvest run state machine

pub mod phase;
pub mod record;
pub mod result;
pub mod source;

pub use phase::HarvestPhase;
pub use record::{Identifier, Record};
pub use result::{FetchFailure, FetchTarget, HarvestResult, HarvestResultBuilder, HarvestSummary};
pub use source::{PageIndexBase, PagePlan, PageRange, PageRequest, SourceConfig};
