//! Source adapter trait.
//!
//! An adapter is the per-vendor glue: it knows how to address a page or an
//! item and how to pull counts, records and identifiers out of a body. The
//! engine never looks inside a response itself.

use serde_json::Value;

use jobharvest_core::{Identifier, PageRequest, Record, SourceConfig};

use crate::error::{DecodeError, FetchError};
use crate::request::{HttpRequest, RawResponse};

/// Per-vendor knowledge of a listing (and optional detail) endpoint.
///
/// ## Implementing an Adapter
///
/// ```ignore
/// struct GoogleCareers { config: SourceConfig }
///
/// impl SourceAdapter for GoogleCareers {
///     fn id(&self) -> &str {
///         "google"
///     }
///
///     fn config(&self) -> &SourceConfig {
///         &self.config
///     }
///
///     fn build_listing_request(&self, page: &PageRequest) -> Result<HttpRequest, FetchError> {
///         let url = format!("https://careers.google.com/api/v3/search/?page={}", page.index);
///         Ok(HttpRequest::get(url))
///     }
///
///     fn extract_total_count(&self, response: &RawResponse) -> Result<u64, DecodeError> {
///         // read `count` from the body
///     }
///
///     fn extract_page_items(&self, response: &RawResponse) -> Result<Vec<Record>, DecodeError> {
///         // read `jobs` from the body
///     }
/// }
/// ```
pub trait SourceAdapter: Send + Sync {
    /// Short identifier of the source (e.g. `"microsoft"`).
    fn id(&self) -> &str;

    /// Paging, capping and batching configuration of the source.
    fn config(&self) -> &SourceConfig;

    /// Builds the listing request for one page.
    fn build_listing_request(&self, page: &PageRequest) -> Result<HttpRequest, FetchError>;

    /// Reads the total record count from a listing response.
    ///
    /// Return [`DecodeError::MissingField`] when the count is absent.
    fn extract_total_count(&self, response: &RawResponse) -> Result<u64, DecodeError>;

    /// Reads the page's summary records from a listing response.
    fn extract_page_items(&self, response: &RawResponse) -> Result<Vec<Record>, DecodeError>;

    /// Reads filter/facet metadata from the probe response, if the source has any.
    fn extract_facets(&self, _response: &RawResponse) -> Option<Value> {
        None
    }

    /// Whether the source has a per-item detail endpoint.
    fn supports_details(&self) -> bool {
        false
    }

    /// Reads the detail identifier from a summary record.
    fn extract_identifier(&self, _record: &Record) -> Option<Identifier> {
        None
    }

    /// Builds the detail request for one identifier.
    fn build_detail_request(&self, id: &Identifier) -> Result<HttpRequest, FetchError> {
        Err(FetchError::InvalidRequest(format!(
            "source {} has no detail endpoint (requested {id})",
            self.id()
        )))
    }

    /// Reads one detail record.
    ///
    /// `Ok(None)` means the body signalled "not found".
    fn extract_detail_record(
        &self,
        _response: &RawResponse,
    ) -> Result<Option<Record>, DecodeError> {
        Ok(None)
    }
}
