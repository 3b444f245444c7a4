//! Amazon Jobs.
//!
//! The search API pages by record offset and refuses to serve anything
//! past the first 10 000 hits, whatever total it reports.

use jobharvest_core::{PageIndexBase, SourceConfig};

use crate::descriptor::{ListingTemplate, RequestTemplate, SourceDescriptor};

/// Most records the search API will serve.
pub const AMAZON_RECORD_CAP: u64 = 10_000;

const FACETS: [&str; 12] = [
    "normalized_country_code",
    "normalized_state_name",
    "normalized_city_name",
    "location",
    "business_category",
    "category",
    "schedule_type_id",
    "employee_class",
    "normalized_location",
    "job_function_id",
    "is_manager",
    "is_intern",
];

fn search_url() -> String {
    let facets: String = FACETS.iter().map(|f| format!("facets%5B%5D={f}&")).collect();
    format!(
        "https://www.amazon.jobs/en/search.json?radius=24km&{facets}offset={{offset}}&result_limit={{size}}&sort=relevant"
    )
}

/// Creates the Amazon descriptor.
pub fn amazon_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: "amazon".to_string(),
        display_name: "Amazon Jobs".to_string(),
        aliases: vec!["aws".to_string()],
        config: SourceConfig::new(10)
            .with_page_index_base(PageIndexBase::Zero)
            .with_record_cap(AMAZON_RECORD_CAP, 0),
        listing: ListingTemplate {
            request: RequestTemplate::get(search_url()),
            total_pointer: "/hits".to_string(),
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
    use jobharvest_core::{PagePlan, PageRequest};
    use jobharvest_fetch::SourceAdapter;

    #[test]
    fn test_amazon_offsets() {
        let adapter = JsonSourceAdapter::new(amazon_descriptor()).unwrap();
        let config = adapter.config();

        let first = adapter
            .build_listing_request(&PageRequest::first(config))
            .unwrap();
        assert!(first.url.contains("offset=0&result_limit=10"));
        assert!(first.url.contains("facets%5B%5D=is_intern&"));

        let fifth = adapter
            .build_listing_request(&PageRequest::new(4, 10, config.page_index_base))
            .unwrap();
        assert!(fifth.url.contains("offset=40&"));
    }

    #[test]
    fn test_amazon_cap_clamps_pages() {
        let config = amazon_descriptor().config;
        let plan = PagePlan::compute(25_300, &config);

        assert!(plan.capped);
        assert_eq!(plan.raw_page_count, 2_530);
        assert_eq!(plan.effective_page_count, 1_000);

        let range = plan.page_range(&config);
        assert_eq!(range.first(), 0);
        assert_eq!(range.last(), Some(999));
    }

    #[test]
    fn test_amazon_last_page_ends_at_cap() {
        let config = amazon_descriptor().config;
        let plan = PagePlan::compute(12_000, &config);

        let last = plan
            .page_range(&config)
            .requests(&config)
            .last()
            .unwrap();
        assert_eq!(last.offset + u64::from(last.size), AMAZON_RECORD_CAP);
    }
}
