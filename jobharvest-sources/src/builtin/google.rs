//! Google Careers.

use jobharvest_core::SourceConfig;

use crate::descriptor::{ListingTemplate, RequestTemplate, SourceDescriptor};

/// Creates the Google descriptor.
pub fn google_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: "google".to_string(),
        display_name: "Google Careers".to_string(),
        aliases: vec!["alphabet".to_string()],
        config: SourceConfig::new(20),
        listing: ListingTemplate {
            request: RequestTemplate::get(
                "https://careers.google.com/api/v3/search/?distance=50&hl=en_US&jlo=en_US&page={page}&q=",
            ),
            total_pointer: "/count".to_string(),
            items_pointer: "/jobs".to_string(),
            facets_pointer: Some("/facets".to_string()),
        },
        detail: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonSourceAdapter;
    use jobharvest_core::PageRequest;
    use jobharvest_fetch::{RawResponse, SourceAdapter};
    use serde_json::json;

    #[test]
    fn test_google_payloads() {
        let adapter = JsonSourceAdapter::new(google_descriptor()).unwrap();
        assert!(!adapter.supports_details());

        let request = adapter
            .build_listing_request(&PageRequest::new(7, 20, adapter.config().page_index_base))
            .unwrap();
        assert!(request.url.contains("&page=7&"));

        let body = RawResponse::ok_json(&json!({
            "count": 3120,
            "jobs": [{ "id": "jobs/123", "title": "SRE" }],
            "next_page": 2
        }));
        assert_eq!(adapter.extract_total_count(&body).unwrap(), 3120);
        assert_eq!(adapter.extract_page_items(&body).unwrap().len(), 1);
        assert!(adapter.extract_facets(&body).is_none());
    }
}
