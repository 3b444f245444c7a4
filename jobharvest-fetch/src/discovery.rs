//! Page-count discovery.
//!
//! One request for the first page establishes the total count, from which
//! the page plan (raw count, cap clamp, index range) is derived.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use jobharvest_core::{PagePlan, PageRange, PageRequest};

use crate::adapter::SourceAdapter;
use crate::context::HarvestContext;
use crate::error::DiscoveryError;
use crate::page::PageFetcher;

// ============================================================================
// Discovery
// ============================================================================

/// Outcome of probing a source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discovery {
    plan: PagePlan,
    page_range: PageRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    facets: Option<Value>,
}

impl Discovery {
    /// Creates a discovery outcome.
    pub fn new(plan: PagePlan, page_range: PageRange, facets: Option<Value>) -> Self {
        Self {
            plan,
            page_range,
            facets,
        }
    }

    /// The page plan derived from the total count.
    pub fn plan(&self) -> &PagePlan {
        &self.plan
    }

    /// Total record count reported by the source.
    pub fn total_count(&self) -> u64 {
        self.plan.total_count
    }

    /// Page indices the listing phase will fetch.
    pub fn page_range(&self) -> PageRange {
        self.page_range
    }

    /// Filter metadata captured from the probe response, if any.
    pub fn facets(&self) -> Option<&Value> {
        self.facets.as_ref()
    }
}

// ============================================================================
// Count Discovery
// ============================================================================

/// Sizes a source's page range from a single probe.
pub struct CountDiscovery<'a> {
    ctx: &'a HarvestContext,
    adapter: &'a dyn SourceAdapter,
}

impl<'a> CountDiscovery<'a> {
    /// Creates a discovery for one source.
    pub fn new(ctx: &'a HarvestContext, adapter: &'a dyn SourceAdapter) -> Self {
        Self { ctx, adapter }
    }

    /// Requests the first page and derives the page plan.
    ///
    /// Exactly one request is issued. A failed request, an undecodable body
    /// or a body without a total count all end discovery.
    #[instrument(skip(self), fields(source = self.adapter.id()))]
    pub async fn discover(&self) -> Result<Discovery, DiscoveryError> {
        let config = self.adapter.config();
        let probe = PageFetcher::new(self.ctx, self.adapter)
            .fetch_raw(&PageRequest::first(config))
            .await
            .map_err(DiscoveryError::Probe)?;

        let total = self.adapter.extract_total_count(&probe)?;
        let facets = self.adapter.extract_facets(&probe);

        let plan = PagePlan::compute(total, config);
        let page_range = plan.page_range(config);

        info!(
            total,
            raw_pages = plan.raw_page_count,
            pages = plan.effective_page_count,
            capped = plan.capped,
            "Discovered page range"
        );

        Ok(Discovery::new(plan, page_range, facets))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RawResponse;
    use crate::test_support::{MockAdapter, MockTransport, context, listing_url, seed_listing};
    use jobharvest_core::SourceConfig;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_discover_uses_one_request() {
        let transport = Arc::new(MockTransport::new());
        let config = SourceConfig::new(20);
        seed_listing(&transport, &config, 45);

        let ctx = context(&transport);
        let adapter = MockAdapter::new(config);
        let discovery = CountDiscovery::new(&ctx, &adapter).discover().await.unwrap();

        assert_eq!(discovery.total_count(), 45);
        assert_eq!(discovery.plan().raw_page_count, 3);
        assert_eq!(discovery.page_range().iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(discovery.facets(), Some(&json!({ "country": ["US", "DE"] })));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_capped_source_is_clamped() {
        let transport = Arc::new(MockTransport::new());
        let config = SourceConfig::new(100).with_record_cap(10_000, 1);
        transport.respond(
            listing_url(1),
            RawResponse::ok_json(&json!({ "total": 12_345, "items": [] })),
        );

        let ctx = context(&transport);
        let adapter = MockAdapter::new(config);
        let discovery = CountDiscovery::new(&ctx, &adapter).discover().await.unwrap();

        assert!(discovery.plan().capped);
        assert_eq!(discovery.plan().raw_page_count, 124);
        assert_eq!(discovery.page_range().len(), 99);
        assert_eq!(discovery.page_range().last(), Some(99));
    }

    #[tokio::test]
    async fn test_zero_total_yields_empty_range() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            listing_url(1),
            RawResponse::ok_json(&json!({ "total": 0, "items": [] })),
        );

        let ctx = context(&transport);
        let adapter = MockAdapter::new(SourceConfig::new(20));
        let discovery = CountDiscovery::new(&ctx, &adapter).discover().await.unwrap();

        assert!(discovery.page_range().is_empty());
    }

    #[tokio::test]
    async fn test_missing_total_is_discovery_error() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(listing_url(1), RawResponse::ok_json(&json!({ "items": [] })));

        let ctx = context(&transport);
        let adapter = MockAdapter::new(SourceConfig::new(20));
        let result = CountDiscovery::new(&ctx, &adapter).discover().await;

        assert!(matches!(result, Err(DiscoveryError::MissingTotalCount(f)) if f == "total"));
    }

    #[tokio::test]
    async fn test_failed_probe_is_discovery_error() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(listing_url(1), RawResponse::new(503, "unavailable"));

        let ctx = context(&transport);
        let adapter = MockAdapter::new(SourceConfig::new(20));
        let result = CountDiscovery::new(&ctx, &adapter).discover().await;

        assert!(matches!(result, Err(DiscoveryError::Probe(e)) if !e.is_throttled()));
    }

    #[tokio::test]
    async fn test_undecodable_probe() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(listing_url(1), RawResponse::new(200, "not json"));

        let ctx = context(&transport);
        let adapter = MockAdapter::new(SourceConfig::new(20));
        let result = CountDiscovery::new(&ctx, &adapter).discover().await;

        assert!(matches!(result, Err(DiscoveryError::Undecodable(_))));
    }
}
