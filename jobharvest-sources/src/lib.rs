// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `JobHarvest` Sources
//!
//! Source adapters for the harvesting engine.
//!
//! Every supported job board speaks JSON, so sources are described rather
//! than coded: a [`SourceDescriptor`] holds URL templates and JSON pointers,
//! and [`JsonSourceAdapter`] turns it into a
//! [`SourceAdapter`](jobharvest_fetch::SourceAdapter).
//!
//! ## Built-in Sources
//!
//! | Source | Paging | Details | Notes |
//! |--------|--------|---------|-------|
//! | Microsoft | page, 1-based | yes | Filters captured from the probe |
//! | Google | page, 1-based | no | |
//! | Amazon | offset, 0-based | no | Serves at most 10 000 records |
//! | Netflix | page, 1-based | no | |
//!
//! ## Usage
//!
//! ```ignore
//! use jobharvest_sources::SourceRegistry;
//!
//! let registry = SourceRegistry::new();
//! let adapter = registry.adapter("msft")?;
//! let outcome = harvester.run_two_phase(&adapter).await?;
//! ```

pub mod builtin;
pub mod descriptor;
pub mod error;
pub mod json_adapter;
pub mod registry;
mod template;

pub use descriptor::{
    BodyTemplate, DetailTemplate, ListingTemplate, RequestTemplate, SourceDescriptor,
};
pub use error::SourceError;
pub use json_adapter::JsonSourceAdapter;
pub use registry::SourceRegistry;
