// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `JobHarvest` Store
//!
//! Configuration and persistence for harvest runs.
//!
//! This crate provides:
//!
//! - **`HarvestConfig`**: The JSON configuration file (output directory,
//!   per-source overrides, custom sources)
//! - **Output**: Writing harvested records as JSON or CSV
//! - **Persistence**: Atomic JSON file helpers
//!
//! ## Usage
//!
//! ```ignore
//! use jobharvest_store::{HarvestConfig, OutputFormat, output_path, write_records};
//!
//! let config = HarvestConfig::load()?;
//! let path = output_path(&config.output_dir, "microsoft", today, 1, OutputFormat::Csv);
//! write_records(&path, result.records(), OutputFormat::Csv).await?;
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod persistence;

pub use config::{HarvestConfig, SourceOverride};
pub use error::StoreError;
pub use output::{
    OutputFormat, filter_file_name, output_file_name, output_path, records_to_csv, write_csv,
    write_records,
};
pub use persistence::{default_config_dir, default_config_path, save_json};

#[cfg(test)]
mod persistence_tests;
