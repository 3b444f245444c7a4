//! Concurrent listing pager.
//!
//! Every page of a discovered range is fetched at most once, with no more
//! than `concurrency_limit` requests in flight. A failed page is logged and
//! counted; its siblings carry on.

use std::pin::pin;

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use jobharvest_core::{FetchFailure, FetchTarget, HarvestResult, PageRange, Record};

use crate::adapter::SourceAdapter;
use crate::context::HarvestContext;
use crate::page::PageFetcher;

/// Fetches a page range with bounded concurrency.
pub struct ConcurrentPager<'a> {
    ctx: &'a HarvestContext,
    adapter: &'a dyn SourceAdapter,
}

impl<'a> ConcurrentPager<'a> {
    /// Creates a pager for one source.
    pub fn new(ctx: &'a HarvestContext, adapter: &'a dyn SourceAdapter) -> Self {
        Self { ctx, adapter }
    }

    /// Fetches every page in `range` and merges their records.
    ///
    /// Records arrive in completion order unless the context asks for
    /// stable ordering, in which case they are kept in page order.
    /// Cancellation stops new fetches and returns what completed so far.
    #[instrument(skip(self), fields(source = self.adapter.id(), pages = range.len()))]
    pub async fn fetch_all(&self, range: PageRange, concurrency_limit: usize) -> HarvestResult {
        let config = self.adapter.config();
        let fetcher = PageFetcher::new(self.ctx, self.adapter);
        let fetcher = &fetcher;
        let cancel = self.ctx.cancellation_token();
        let stable = self.ctx.settings.stable_order;

        let mut fetches = pin!(
            stream::iter(range.requests(config))
                .map(move |page| async move { (page.index, fetcher.fetch_page(&page).await) })
                .buffer_unordered(concurrency_limit.max(1))
        );

        let mut result = HarvestResult::builder();
        let mut completed: Vec<(u64, Vec<Record>)> = Vec::new();

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    warn!("Listing cancelled");
                    result.mark_cancelled();
                    break;
                }
                next = fetches.next() => next,
            };

            let Some((index, outcome)) = next else {
                break;
            };

            match outcome {
                Ok(records) if stable => completed.push((index, records)),
                Ok(records) => result.push_success(records),
                Err(e) => {
                    warn!(
                        page = index,
                        throttled = e.is_throttled(),
                        error = %e,
                        "Page fetch failed"
                    );
                    result
                        .push_failure(FetchFailure::new(FetchTarget::Page(index), e.to_string()));
                }
            }
        }

        if stable {
            completed.sort_by_key(|(index, _)| *index);
            for (_, records) in completed {
                result.push_success(records);
            }
        }

        let result = result.build();
        info!(
            records = result.record_count(),
            succeeded = result.succeeded(),
            failed = result.failed(),
            "Listing finished"
        );
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
