//! Harvest run surface.
//!
//! The [`Harvester`] sequences discovery, listing and detail harvesting for
//! one source at a time and publishes its [`HarvestPhase`] on a watch
//! channel so callers can follow progress.

use std::collections::HashSet;

use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use jobharvest_core::{HarvestPhase, HarvestResult, Identifier, Record};

use crate::adapter::SourceAdapter;
use crate::context::HarvestContext;
use crate::detail::BatchedDetailHarvester;
use crate::discovery::{CountDiscovery, Discovery};
use crate::error::HarvestError;
use crate::pager::ConcurrentPager;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of a listing run.
#[derive(Debug, Clone)]
pub struct ListingHarvest {
    /// Discovery outcome; `None` when the run was cancelled while discovering.
    pub discovery: Option<Discovery>,
    /// Listing records and counters.
    pub result: HarvestResult,
}

/// Result of a listing run followed by a detail run.
#[derive(Debug, Clone)]
pub struct TwoPhaseOutcome {
    /// Discovery outcome; `None` when the run was cancelled while discovering.
    pub discovery: Option<Discovery>,
    /// Listing records and counters.
    pub listing: HarvestResult,
    /// Detail records and counters; `None` when no detail phase ran.
    pub details: Option<HarvestResult>,
    /// Listing records that carried no identifier.
    pub missing_identifiers: usize,
}

impl TwoPhaseOutcome {
    /// The records a caller should keep: details if they were harvested,
    /// listing summaries otherwise.
    pub fn records(&self) -> &[Record] {
        self.details
            .as_ref()
            .map_or_else(|| self.listing.records(), HarvestResult::records)
    }

    /// Whether either phase was cut short by cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.listing.is_cancelled()
            || self.details.as_ref().is_some_and(HarvestResult::is_cancelled)
    }
}

/// Extracts detail identifiers from listing records.
///
/// Duplicates are dropped, keeping first-seen order. Returns the
/// identifiers and the number of records that had none.
pub fn collect_identifiers(
    adapter: &dyn SourceAdapter,
    records: &[Record],
) -> (Vec<Identifier>, usize) {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut missing = 0;

    for record in records {
        match adapter.extract_identifier(record) {
            Some(id) => {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
            None => missing += 1,
        }
    }

    (ids, missing)
}

// ============================================================================
// Harvester
// ============================================================================

/// Runs harvest phases for a source.
///
/// A harvester runs one source at a time; its phase reflects the most
/// recent run. Overlapping runs on the same harvester wait for each other.
pub struct Harvester {
    ctx: HarvestContext,
    phase: watch::Sender<HarvestPhase>,
    run_lock: Mutex<()>,
}

impl Harvester {
    /// Creates a harvester over a context.
    pub fn new(ctx: HarvestContext) -> Self {
        let (phase, _) = watch::channel(HarvestPhase::Idle);
        Self {
            ctx,
            phase,
            run_lock: Mutex::new(()),
        }
    }

    /// Returns the harvest context.
    pub fn context(&self) -> &HarvestContext {
        &self.ctx
    }

    /// Subscribes to phase changes.
    pub fn subscribe(&self) -> watch::Receiver<HarvestPhase> {
        self.phase.subscribe()
    }

    /// Returns the current phase.
    pub fn phase(&self) -> HarvestPhase {
        *self.phase.borrow()
    }

    /// Publishes `next` if the lifecycle allows it. Returns whether it did.
    fn transition(&self, next: HarvestPhase) -> bool {
        let current = self.phase();
        if !current.can_transition_to(next) {
            warn!(from = %current, to = %next, "Refusing phase transition");
            return false;
        }
        debug!(from = %current, to = %next, "Phase transition");
        self.phase.send_replace(next);
        true
    }

    /// Probes a source without harvesting it.
    pub async fn discover(&self, adapter: &dyn SourceAdapter) -> Result<Discovery, HarvestError> {
        adapter.config().validate()?;
        Ok(CountDiscovery::new(&self.ctx, adapter).discover().await?)
    }

    /// Discovers the page range and fetches every listing page.
    ///
    /// Only a discovery failure is an error. Page failures are counted in
    /// the result, and cancellation yields a partial result.
    #[instrument(skip(self, adapter), fields(source = adapter.id()))]
    pub async fn run_listing(
        &self,
        adapter: &dyn SourceAdapter,
    ) -> Result<ListingHarvest, HarvestError> {
        let _run = self.run_lock.lock().await;
        let listing = self.listing_phases(adapter).await?;
        self.transition(HarvestPhase::Done);
        info!(summary = %listing.result.summary(), "Listing harvest finished");
        Ok(listing)
    }

    /// Like [`run_listing`](Self::run_listing), returning only the records
    /// and counters.
    pub async fn run_listing_harvest(
        &self,
        adapter: &dyn SourceAdapter,
    ) -> Result<HarvestResult, HarvestError> {
        Ok(self.run_listing(adapter).await?.result)
    }

    /// Fetches detail records for known identifiers.
    #[instrument(skip(self, adapter, ids), fields(source = adapter.id(), items = ids.len()))]
    pub async fn run_detail_harvest(
        &self,
        adapter: &dyn SourceAdapter,
        ids: &[Identifier],
    ) -> HarvestResult {
        let _run = self.run_lock.lock().await;
        self.transition(HarvestPhase::DetailHarvesting);
        let result = self.detail_phase(adapter, ids).await;
        self.transition(HarvestPhase::Done);
        info!(summary = %result.summary(), "Detail harvest finished");
        result
    }

    /// Harvests listings, then the detail record of every listed identifier.
    ///
    /// The detail phase is skipped when the source has no detail endpoint
    /// or the listing was cancelled.
    #[instrument(skip(self, adapter), fields(source = adapter.id()))]
    pub async fn run_two_phase(
        &self,
        adapter: &dyn SourceAdapter,
    ) -> Result<TwoPhaseOutcome, HarvestError> {
        let _run = self.run_lock.lock().await;
        let ListingHarvest { discovery, result } = self.listing_phases(adapter).await?;

        if discovery.is_none() || result.is_cancelled() || !adapter.supports_details() {
            self.transition(HarvestPhase::Done);
            return Ok(TwoPhaseOutcome {
                discovery,
                listing: result,
                details: None,
                missing_identifiers: 0,
            });
        }

        let (ids, missing) = collect_identifiers(adapter, result.records());
        if missing > 0 {
            warn!(missing, "Listing records without an identifier");
        }

        self.transition(HarvestPhase::DetailHarvesting);
        let details = self.detail_phase(adapter, &ids).await;
        self.transition(HarvestPhase::Done);

        info!(
            listing = %result.summary(),
            details = %details.summary(),
            "Two-phase harvest finished"
        );

        Ok(TwoPhaseOutcome {
            discovery,
            listing: result,
            details: Some(details),
            missing_identifiers: missing,
        })
    }

    /// Runs discovery and paging, leaving the phase at `Paging` (or
    /// `Discovering` if cancelled there).
    async fn listing_phases(
        &self,
        adapter: &dyn SourceAdapter,
    ) -> Result<ListingHarvest, HarvestError> {
        let config = self.ctx.effective_config(adapter.config());
        config.validate()?;

        self.transition(HarvestPhase::Discovering);
        let cancel = self.ctx.cancellation_token();
        let counter = CountDiscovery::new(&self.ctx, adapter);
        let discovered = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            discovered = counter.discover() => Some(discovered),
        };

        let discovery = match discovered {
            None => {
                warn!("Cancelled during discovery");
                return Ok(ListingHarvest {
                    discovery: None,
                    result: HarvestResult::cancelled(),
                });
            }
            Some(Err(e)) => {
                error!(error = %e, "Discovery failed");
                self.transition(HarvestPhase::Failed);
                return Err(e.into());
            }
            Some(Ok(discovery)) => discovery,
        };

        self.transition(HarvestPhase::Paging);
        let result = ConcurrentPager::new(&self.ctx, adapter)
            .fetch_all(discovery.page_range(), config.concurrency_limit)
            .await;

        Ok(ListingHarvest {
            discovery: Some(discovery),
            result,
        })
    }

    async fn detail_phase(
        &self,
        adapter: &dyn SourceAdapter,
        ids: &[Identifier],
    ) -> HarvestResult {
        let config = self.ctx.effective_config(adapter.config());
        BatchedDetailHarvester::new(&self.ctx, adapter)
            .fetch_details(ids, config.batch_size, config.inter_batch_delay)
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
