//! In-memory transport and adapter shared by the engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::time::Instant;

use jobharvest_core::{Identifier, PagePlan, PageRequest, Record, SourceConfig};

use crate::adapter::SourceAdapter;
use crate::context::HarvestContext;
use crate::error::{DecodeError, FetchError};
use crate::request::{HttpRequest, RawResponse};
use crate::transport::Transport;

// ============================================================================
// Mock Transport
// ============================================================================

/// Canned responses keyed by URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, RawResponse>>,
    latency: Duration,
    log: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn respond(&self, url: impl Into<String>, response: RawResponse) {
        self.responses.lock().unwrap().insert(url.into(), response);
    }

    /// URLs in the order they were requested.
    pub fn requested_urls(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    /// `(url, start instant)` of every request.
    pub fn request_log(&self) -> Vec<(String, Instant)> {
        self.log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Highest number of requests observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, FetchError> {
        self.log
            .lock()
            .unwrap()
            .push((request.url.clone(), Instant::now()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let response = self.responses.lock().unwrap().get(&request.url).cloned();
        Ok(response.unwrap_or_else(|| RawResponse::new(404, "not found")))
    }
}

// ============================================================================
// Mock Adapter
// ============================================================================

/// Listing at `mock://list?page={index}` with `{"total", "items", "facets"}`,
/// detail at `mock://detail/{id}` with `{"job": {...} | null}`.
pub struct MockAdapter {
    config: SourceConfig,
    details: bool,
}

impl MockAdapter {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            details: false,
        }
    }

    pub fn with_details(mut self) -> Self {
        self.details = true;
        self
    }
}

pub fn listing_url(index: u64) -> String {
    format!("mock://list?page={index}")
}

pub fn detail_url(id: &Identifier) -> String {
    format!("mock://detail/{id}")
}

impl SourceAdapter for MockAdapter {
    fn id(&self) -> &str {
        "mock"
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn build_listing_request(&self, page: &PageRequest) -> Result<HttpRequest, FetchError> {
        Ok(HttpRequest::get(listing_url(page.index)))
    }

    fn extract_total_count(&self, response: &RawResponse) -> Result<u64, DecodeError> {
        let body = response.json_value()?;
        body.get("total")
            .and_then(Value::as_u64)
            .ok_or_else(|| DecodeError::MissingField("total".to_string()))
    }

    fn extract_page_items(&self, response: &RawResponse) -> Result<Vec<Record>, DecodeError> {
        let body = response.json_value()?;
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| DecodeError::MissingField("items".to_string()))?;
        Ok(items.iter().cloned().filter_map(Record::from_value).collect())
    }

    fn extract_facets(&self, response: &RawResponse) -> Option<Value> {
        response.json_value().ok()?.get("facets").cloned()
    }

    fn supports_details(&self) -> bool {
        self.details
    }

    fn extract_identifier(&self, record: &Record) -> Option<Identifier> {
        record.get("id").and_then(Identifier::from_value)
    }

    fn build_detail_request(&self, id: &Identifier) -> Result<HttpRequest, FetchError> {
        Ok(HttpRequest::get(detail_url(id)))
    }

    fn extract_detail_record(&self, response: &RawResponse) -> Result<Option<Record>, DecodeError> {
        let body = response.json_value()?;
        Ok(body.get("job").cloned().and_then(Record::from_value))
    }
}

// ============================================================================
// Seeding
// ============================================================================

/// Seeds every raw page of a listing with `total` records whose ids run
/// from 0 upwards. Returns the page plan the seed corresponds to.
pub fn seed_listing(transport: &MockTransport, config: &SourceConfig, total: u64) -> PagePlan {
    let plan = PagePlan::compute(total, config);
    let range = jobharvest_core::PageRange::for_source(config, plan.raw_page_count.max(1));

    for page in range.requests(config) {
        let end = (page.offset + u64::from(page.size)).min(total);
        let items: Vec<Value> = (page.offset..end)
            .map(|id| json!({ "id": id, "title": format!("Job {id}") }))
            .collect();
        transport.respond(
            listing_url(page.index),
            RawResponse::ok_json(&json!({
                "total": total,
                "items": items,
                "facets": { "country": ["US", "DE"] },
            })),
        );
    }
    plan
}

/// Seeds a detail body for every id.
pub fn seed_details(transport: &MockTransport, ids: &[Identifier]) {
    for id in ids {
        transport.respond(
            detail_url(id),
            RawResponse::ok_json(&json!({
                "job": { "id": id, "description": format!("About {id}") }
            })),
        );
    }
}

/// Builds a context over a shared mock transport.
pub fn context(transport: &Arc<MockTransport>) -> HarvestContext {
    HarvestContext::new(transport.clone())
}

/// Sorted JSON text of a record set, for order-independent comparison.
pub fn sorted_json(records: &[Record]) -> Vec<String> {
    let mut out: Vec<String> = records
        .iter()
        .map(|r| serde_json::to_string(r).unwrap())
        .collect();
    out.sort();
    out
}
