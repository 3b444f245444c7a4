//! Source descriptor system.
//!
//! A descriptor is everything the engine needs to know about a JSON job
//! board:
//! - Identity (id, display name, aliases)
//! - Paging configuration ([`SourceConfig`])
//! - Listing request template and where the count, items and facets live
//! - Optional detail request template and where the record lives
//!
//! Descriptors are plain serde data so custom sources can be added from the
//! configuration file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use jobharvest_core::SourceConfig;
use jobharvest_fetch::HttpMethod;

use crate::error::SourceError;
use crate::template;

// ============================================================================
// Source Descriptor
// ============================================================================

/// Complete description of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Source id (e.g. `"microsoft"`), also used in output file names.
    pub id: String,
    /// Human readable name.
    pub display_name: String,
    /// Other names the source can be looked up by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Paging, capping and batching configuration.
    pub config: SourceConfig,
    /// Listing endpoint.
    pub listing: ListingTemplate,
    /// Detail endpoint, if the source has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailTemplate>,
}

impl SourceDescriptor {
    /// Returns the id and every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns true if the source has a detail endpoint.
    pub fn supports_details(&self) -> bool {
        self.detail.is_some()
    }

    /// Checks that the descriptor can produce working requests.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.id.trim().is_empty() {
            return Err(SourceError::invalid(&self.id, "id must not be empty"));
        }
        self.config.validate()?;

        let listing = &self.listing.request;
        if listing.url.trim().is_empty() {
            return Err(SourceError::invalid(&self.id, "listing url must not be empty"));
        }
        if !["page", "offset"].iter().any(|name| listing.mentions(name)) {
            return Err(SourceError::invalid(
                &self.id,
                "listing template must reference {page} or {offset}",
            ));
        }
        check_pointer(&self.id, "total_pointer", &self.listing.total_pointer)?;
        check_pointer(&self.id, "items_pointer", &self.listing.items_pointer)?;
        if let Some(ref facets) = self.listing.facets_pointer {
            check_pointer(&self.id, "facets_pointer", facets)?;
        }

        if let Some(ref detail) = self.detail {
            if !detail.request.mentions("id") {
                return Err(SourceError::invalid(
                    &self.id,
                    "detail template must reference {id}",
                ));
            }
            check_pointer(&self.id, "record_pointer", &detail.record_pointer)?;
            check_pointer(&self.id, "identifier_pointer", &detail.identifier_pointer)?;
        }

        Ok(())
    }
}

/// JSON pointers are empty (whole document) or start with `/`.
fn check_pointer(id: &str, field: &str, pointer: &str) -> Result<(), SourceError> {
    if pointer.is_empty() || pointer.starts_with('/') {
        Ok(())
    } else {
        Err(SourceError::invalid(
            id,
            format!("{field} {pointer:?} is not a JSON pointer"),
        ))
    }
}

// ============================================================================
// Request Template
// ============================================================================

/// A request with placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTemplate {
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// URL template.
    pub url: String,
    /// Extra headers (values are not templated).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Body template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyTemplate>,
}

impl RequestTemplate {
    /// Creates a `GET` template.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Returns true if the URL or body references `{name}`.
    pub fn mentions(&self, name: &str) -> bool {
        template::mentions(&self.url, name)
            || match &self.body {
                Some(BodyTemplate::Form(form)) => template::mentions(form, name),
                Some(BodyTemplate::Json(json)) => template::json_mentions(json, name),
                None => false,
            }
    }
}

/// A body with placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyTemplate {
    /// Form-encoded body; substituted values are form-escaped.
    Form(String),
    /// JSON body; placeholders are substituted in string values.
    Json(Value),
}

// ============================================================================
// Listing / Detail Templates
// ============================================================================

/// Listing endpoint description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingTemplate {
    /// Request template (`{page}`, `{offset}`, `{size}`).
    #[serde(flatten)]
    pub request: RequestTemplate,
    /// Pointer to the total record count.
    pub total_pointer: String,
    /// Pointer to the array of summary records.
    pub items_pointer: String,
    /// Pointer to filter metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets_pointer: Option<String>,
}

/// Detail endpoint description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailTemplate {
    /// Request template (`{id}`).
    #[serde(flatten)]
    pub request: RequestTemplate,
    /// Pointer to the record in a detail body. Absent or null means not found.
    pub record_pointer: String,
    /// Pointer to the identifier inside a summary record.
    pub identifier_pointer: String,
}

// ============================================================================
// Tests
// ============================================================================
