//! Microsoft Careers.
//!
//! The search API pages by 1-based `pg`. Each summary carries a `jobId`
//! that keys a separate detail endpoint, which throttles with 403 when hit
//! too hard, hence the batch spacing.

use std::time::Duration;

use jobharvest_core::SourceConfig;

use crate::descriptor::{DetailTemplate, ListingTemplate, RequestTemplate, SourceDescriptor};

const API: &str = "https://gcsservices.careers.microsoft.com/search/api/v1";

/// Creates the Microsoft descriptor.
pub fn microsoft_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: "microsoft".to_string(),
        display_name: "Microsoft Careers".to_string(),
        aliases: vec!["msft".to_string()],
        config: SourceConfig::new(20)
            .with_batch_size(200)
            .with_inter_batch_delay(Duration::from_secs(5)),
        listing: ListingTemplate {
            request: RequestTemplate::get(format!(
                "{API}/search?l=en_us&pg={{page}}&pgSz={{size}}&o=Relevance&flt=true"
            )),
            total_pointer: "/operationResult/result/totalJobs".to_string(),
            items_pointer: "/operationResult/result/jobs".to_string(),
            facets_pointer: Some("/operationResult/result/filters".to_string()),
        },
        detail: Some(DetailTemplate {
            request: RequestTemplate::get(format!("{API}/job/{{id}}?lang=en_us")),
            record_pointer: "/operationResult/result".to_string(),
            identifier_pointer: "/jobId".to_string(),
        }),
    }
}
