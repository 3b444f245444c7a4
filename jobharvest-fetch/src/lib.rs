// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `JobHarvest` Fetch
//!
//! The harvesting engine.
//!
//! Every source exposes a listing endpoint that reports a total count and
//! returns one page of summary records, and optionally a detail endpoint
//! keyed by an identifier found in those summaries. Parsing any one
//! vendor's payload is left to a [`SourceAdapter`]; this crate does the
//! part every source shares:
//!
//! - [`discovery::CountDiscovery`] - One probe request to size the page range
//! - [`pager::ConcurrentPager`] - Fetches every page with a concurrency bound
//! - [`detail::BatchedDetailHarvester`] - Detail fetches in spaced batches
//! - [`harvester::Harvester`] - Runs the phases and tracks [`HarvestPhase`]
//!
//! ## Transport
//!
//! All I/O goes through the [`Transport`] trait. [`HttpClient`] is the
//! reqwest-backed implementation; tests plug in an in-memory one.
//!
//! ## Example
//!
//! ```ignore
//! use jobharvest_fetch::{HarvestContext, Harvester};
//!
//! let ctx = HarvestContext::builder().concurrency_limit(20).build()?;
//! let harvester = Harvester::new(ctx);
//!
//! let listing = harvester.run_listing_harvest(&adapter).await?;
//! println!("{}", listing.summary());
//! ```
//!
//! [`HarvestPhase`]: jobharvest_core::HarvestPhase

// Core modules
pub mod adapter;
pub mod context;
pub mod detail;
pub mod discovery;
pub mod error;
pub mod harvester;
pub mod host;
pub mod page;
pub mod pager;
pub mod request;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root

// Errors
pub use error::{DecodeError, DiscoveryError, FetchError, HarvestError};

// Transport
pub use host::http::{HttpClient, HttpClientBuilder};
pub use request::{HttpMethod, HttpRequest, RawResponse, RequestBody};
pub use transport::Transport;

// Engine
pub use adapter::SourceAdapter;
pub use context::{HarvestContext, HarvestContextBuilder, HarvestSettings};
pub use detail::BatchedDetailHarvester;
pub use discovery::{CountDiscovery, Discovery};
pub use harvester::{Harvester, ListingHarvest, TwoPhaseOutcome, collect_identifiers};
pub use page::PageFetcher;
pub use pager::ConcurrentPager;

// Cancellation
pub use tokio_util::sync::CancellationToken;
