//! Descriptor-driven source adapter.

use serde_json::Value;
use tracing::debug;
use url::Url;

use jobharvest_core::{Identifier, PageRequest, Record, SourceConfig};
use jobharvest_fetch::{
    DecodeError, FetchError, HttpRequest, RawResponse, RequestBody, SourceAdapter,
};

use crate::descriptor::{BodyTemplate, RequestTemplate, SourceDescriptor};
use crate::error::SourceError;
use crate::template::{self, Escape, Vars};

/// [`SourceAdapter`] backed by a [`SourceDescriptor`].
#[derive(Debug, Clone)]
pub struct JsonSourceAdapter {
    descriptor: SourceDescriptor,
}

impl JsonSourceAdapter {
    /// Creates an adapter, validating the descriptor first.
    pub fn new(descriptor: SourceDescriptor) -> Result<Self, SourceError> {
        descriptor.validate()?;
        Ok(Self { descriptor })
    }

    /// Returns the descriptor.
    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }
}

fn render(template: &RequestTemplate, vars: &Vars) -> Result<HttpRequest, FetchError> {
    let url = template::render_text(&template.url, vars, Escape::Url);
    Url::parse(&url).map_err(|e| FetchError::InvalidRequest(format!("{url}: {e}")))?;

    let mut request = HttpRequest::get(url);
    request.method = template.method;
    for (name, value) in &template.headers {
        request = request.header(name, value);
    }
    request.body = template.body.as_ref().map(|body| match body {
        BodyTemplate::Form(form) => {
            RequestBody::Form(template::render_text(form, vars, Escape::Form))
        }
        BodyTemplate::Json(json) => RequestBody::Json(template::render_json(json, vars)),
    });
    Ok(request)
}

/// Looks up a pointer, treating JSON `null` as absent.
fn lookup<'a>(body: &'a Value, pointer: &str) -> Option<&'a Value> {
    body.pointer(pointer).filter(|v| !v.is_null())
}

impl SourceAdapter for JsonSourceAdapter {
    fn id(&self) -> &str {
        &self.descriptor.id
    }

    fn config(&self) -> &SourceConfig {
        &self.descriptor.config
    }

    fn build_listing_request(&self, page: &PageRequest) -> Result<HttpRequest, FetchError> {
        render(&self.descriptor.listing.request, &Vars::page(page))
    }

    fn extract_total_count(&self, response: &RawResponse) -> Result<u64, DecodeError> {
        let pointer = &self.descriptor.listing.total_pointer;
        let body = response.json_value()?;
        let value =
            lookup(&body, pointer).ok_or_else(|| DecodeError::MissingField(pointer.clone()))?;

        // Some boards report the count as a string.
        let count = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        count.ok_or_else(|| DecodeError::UnexpectedShape {
            field: pointer.clone(),
            detail: format!("expected a non-negative integer, got {value}"),
        })
    }

    fn extract_page_items(&self, response: &RawResponse) -> Result<Vec<Record>, DecodeError> {
        let pointer = &self.descriptor.listing.items_pointer;
        let body = response.json_value()?;
        // A body without the array, such as `{"error": ...}`, is a failed page.
        let value =
            lookup(&body, pointer).ok_or_else(|| DecodeError::MissingField(pointer.clone()))?;
        let Value::Array(items) = value else {
            return Err(DecodeError::UnexpectedShape {
                field: pointer.clone(),
                detail: "expected an array of records".to_string(),
            });
        };

        let total = items.len();
        let records: Vec<Record> = items.iter().cloned().filter_map(Record::from_value).collect();
        if records.len() < total {
            debug!(
                source = %self.descriptor.id,
                skipped = total - records.len(),
                "Skipped non-object items"
            );
        }
        Ok(records)
    }

    fn extract_facets(&self, response: &RawResponse) -> Option<Value> {
        let pointer = self.descriptor.listing.facets_pointer.as_deref()?;
        let body = response.json_value().ok()?;
        lookup(&body, pointer).cloned()
    }

    fn supports_details(&self) -> bool {
        self.descriptor.supports_details()
    }

    fn extract_identifier(&self, record: &Record) -> Option<Identifier> {
        let detail = self.descriptor.detail.as_ref()?;
        record
            .pointer(&detail.identifier_pointer)
            .and_then(Identifier::from_value)
    }

    fn build_detail_request(&self, id: &Identifier) -> Result<HttpRequest, FetchError> {
        let detail = self.descriptor.detail.as_ref().ok_or_else(|| {
            FetchError::InvalidRequest(format!(
                "source {} has no detail endpoint (requested {id})",
                self.descriptor.id
            ))
        })?;
        render(&detail.request, &Vars::item(id))
    }

    fn extract_detail_record(&self, response: &RawResponse) -> Result<Option<Record>, DecodeError> {
        let Some(detail) = self.descriptor.detail.as_ref() else {
            return Ok(None);
        };
        let body = response.json_value()?;
        match lookup(&body, &detail.record_pointer) {
            None => Ok(None),
            Some(value) if value.is_object() => Ok(Record::from_value(value.clone())),
            Some(other) => Err(DecodeError::UnexpectedShape {
                field: detail.record_pointer.clone(),
                detail: format!("expected an object, got {other}"),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
