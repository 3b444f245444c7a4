//! Batched detail harvesting.
//!
//! Identifiers are fetched in fixed-size batches. All fetches of a batch run
//! concurrently and the whole batch completes before the inter-batch delay
//! starts, so a source never sees more than `batch_size` detail requests at
//! once and always gets a quiet period between bursts.

use std::ops::Range;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, instrument, warn};

use jobharvest_core::{FetchFailure, FetchTarget, HarvestResult, Identifier, Record};

use crate::adapter::SourceAdapter;
use crate::context::HarvestContext;
use crate::error::FetchError;
use crate::transport::execute_checked;

/// Splits `len` items into consecutive batches of at most `batch_size`.
///
/// A zero batch size is treated as one.
pub fn plan_batches(len: usize, batch_size: usize) -> Vec<Range<usize>> {
    let size = batch_size.max(1);
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}

/// Fetches per-item detail records in spaced batches.
pub struct BatchedDetailHarvester<'a> {
    ctx: &'a HarvestContext,
    adapter: &'a dyn SourceAdapter,
}

impl<'a> BatchedDetailHarvester<'a> {
    /// Creates a detail harvester for one source.
    pub fn new(ctx: &'a HarvestContext, adapter: &'a dyn SourceAdapter) -> Self {
        Self { ctx, adapter }
    }

    /// Fetches the detail record of every identifier.
    ///
    /// The delay is slept before every batch except the first. Items that
    /// fail or come back "not found" are logged and left out. Cancellation
    /// during a batch or a delay returns the records gathered so far.
    #[instrument(skip(self, ids), fields(source = self.adapter.id(), items = ids.len()))]
    pub async fn fetch_details(
        &self,
        ids: &[Identifier],
        batch_size: usize,
        inter_batch_delay: Duration,
    ) -> HarvestResult {
        let batches = plan_batches(ids.len(), batch_size);
        let cancel = self.ctx.cancellation_token();
        let mut result = HarvestResult::builder();

        'batches: for (n, range) in batches.iter().enumerate() {
            if n > 0 && !inter_batch_delay.is_zero() {
                debug!(delay = ?inter_batch_delay, "Waiting before next batch");
                let slept = tokio::select! {
                    biased;
                    () = cancel.cancelled() => false,
                    () = tokio::time::sleep(inter_batch_delay) => true,
                };
                if !slept {
                    result.mark_cancelled();
                    break;
                }
            }
            if cancel.is_cancelled() {
                result.mark_cancelled();
                break;
            }

            let batch = &ids[range.clone()];
            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .map(|id| async move { (id, self.fetch_detail(id).await) })
                .collect();

            let mut batch_failed = 0usize;
            loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => None,
                    next = in_flight.next() => Some(next),
                };

                match next {
                    None => {
                        warn!(batch = n + 1, "Detail harvest cancelled");
                        result.mark_cancelled();
                        break 'batches;
                    }
                    Some(None) => break,
                    Some(Some((_, Ok(record)))) => result.push_success([record]),
                    Some(Some((id, Err(e)))) => {
                        batch_failed += 1;
                        warn!(
                            id = %id,
                            throttled = e.is_throttled(),
                            error = %e,
                            "Detail fetch failed"
                        );
                        let target = FetchTarget::Item(id.clone());
                        result.push_failure(FetchFailure::new(target, e.to_string()));
                    }
                }
            }

            info!(
                batch = n + 1,
                of = batches.len(),
                size = batch.len(),
                failed = batch_failed,
                "Batch finished"
            );
        }

        result.build()
    }

    async fn fetch_detail(&self, id: &Identifier) -> Result<Record, FetchError> {
        let request = self.adapter.build_detail_request(id)?;
        let timeout = self.ctx.effective_config(self.adapter.config()).request_timeout;
        let response = execute_checked(self.ctx.transport.as_ref(), &request, timeout).await?;
        self.adapter
            .extract_detail_record(&response)?
            .ok_or(FetchError::NotFound)
    }
}

// ============================================================================
// Tests
// ============================================================================
