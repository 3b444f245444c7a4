//! Netflix Jobs.

use jobharvest_core::SourceConfig;

use crate::descriptor::{ListingTemplate, RequestTemplate, SourceDescriptor};

/// Creates the Netflix descriptor.
pub fn netflix_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: "netflix".to_string(),
        display_name: "Netflix Jobs".to_string(),
        aliases: Vec::new(),
        config: SourceConfig::new(20),
        listing: ListingTemplate {
            request: RequestTemplate::get("https://jobs.netflix.com/api/search?page={page}"),
            total_pointer: "/info/postings/total_result_count".to_string(),
            items_pointer: "/records/postings".to_string(),
            facets_pointer: None,
        },
        detail: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonSourceAdapter;
    use jobharvest_fetch::{RawResponse, SourceAdapter};
    use serde_json::json;

    #[test]
    fn test_netflix_payloads() {
        let adapter = JsonSourceAdapter::new(netflix_descriptor()).unwrap();
        let body = RawResponse::ok_json(&json!({
            "info": { "postings": { "total_result_count": 612 } },
            "records": { "postings": [{ "external_id": "790298", "text": "Engineer" }] }
        }));

        assert_eq!(adapter.extract_total_count(&body).unwrap(), 612);
        assert_eq!(adapter.extract_page_items(&body).unwrap().len(), 1);
    }
}
