// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `JobHarvest` Core
//!
//! Core types for the `jobharvest` engine.
//!
//! This crate holds the data model shared by every other crate. It does no
//! I/O: the engine in `jobharvest-fetch` moves these values around, the
//! source adapters produce them and the store persists them.
//!
//! ## Key Types
//!
//! ### Harvested Data
//! - [`Record`] - One harvested item as an opaque field mapping
//! - [`Identifier`] - Key used to address a detail fetch
//! - [`HarvestResult`] - Records plus attempt/failure counters of one run
//!
//! ### Paging
//! - [`SourceConfig`] - Per-source tuning (page size, caps, batching)
//! - [`PageRequest`] / [`PageRange`] - What to fetch
//! - [`PagePlan`] - Page count derived from a total count
//!
//! ### Run State
//! - [`HarvestPhase`] - Phase of a harvest run

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Harvested data
    Identifier,
    Record,
    // Paging
    PageIndexBase,
    PagePlan,
    PageRange,
    PageRequest,
    SourceConfig,
    // Results
    FetchFailure,
    FetchTarget,
    HarvestResult,
    HarvestResultBuilder,
    HarvestSummary,
    // Run state
    HarvestPhase,
};
