//! Single listing page fetch.

use tracing::trace;

use jobharvest_core::{PageRequest, Record};

use crate::adapter::SourceAdapter;
use crate::context::HarvestContext;
use crate::error::FetchError;
use crate::request::RawResponse;
use crate::transport::execute_checked;

/// Fetches and decodes one listing page of a source.
pub struct PageFetcher<'a> {
    ctx: &'a HarvestContext,
    adapter: &'a dyn SourceAdapter,
}

impl<'a> PageFetcher<'a> {
    /// Creates a fetcher for one source.
    pub fn new(ctx: &'a HarvestContext, adapter: &'a dyn SourceAdapter) -> Self {
        Self { ctx, adapter }
    }

    /// Fetches a page and returns the checked response without decoding it.
    pub async fn fetch_raw(&self, page: &PageRequest) -> Result<RawResponse, FetchError> {
        let request = self.adapter.build_listing_request(page)?;
        let timeout = self.ctx.effective_config(self.adapter.config()).request_timeout;
        trace!(source = self.adapter.id(), page = page.index, url = %request.url, "Fetching page");
        execute_checked(self.ctx.transport.as_ref(), &request, timeout).await
    }

    /// Fetches a page and returns its summary records.
    pub async fn fetch_page(&self, page: &PageRequest) -> Result<Vec<Record>, FetchError> {
        let response = self.fetch_raw(page).await?;
        Ok(self.adapter.extract_page_items(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockAdapter, MockTransport, context, listing_url, seed_listing};
    use jobharvest_core::SourceConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fetch_page_decodes_items() {
        let transport = Arc::new(MockTransport::new());
        let config = SourceConfig::new(10);
        seed_listing(&transport, &config, 25);

        let ctx = context(&transport);
        let adapter = MockAdapter::new(config.clone());
        let fetcher = PageFetcher::new(&ctx, &adapter);

        let records = fetcher
            .fetch_page(&PageRequest::new(3, 10, config.page_index_base))
            .await
            .unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].get("id"), Some(&serde_json::json!(20)));
        assert_eq!(transport.requested_urls(), vec![listing_url(3)]);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(listing_url(1), RawResponse::new(200, "<html>"));

        let ctx = context(&transport);
        let adapter = MockAdapter::new(SourceConfig::new(10));
        let result = PageFetcher::new(&ctx, &adapter)
            .fetch_page(&PageRequest::first(adapter.config()))
            .await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }
}
