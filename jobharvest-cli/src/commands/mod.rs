//! CLI command implementations.

pub mod discover;
pub mod run;
pub mod sources;

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

use jobharvest_core::SourceConfig;
use jobharvest_fetch::{CancellationToken, HarvestContext, HarvestSettings, HttpClient};

/// Builds a harvest context whose HTTP client is sized for one source.
pub fn harvest_context(settings: HarvestSettings, config: &SourceConfig) -> Result<HarvestContext> {
    let client = HttpClient::for_source(&settings.apply(config))?;
    let ctx = HarvestContext::builder()
        .transport(Arc::new(client))
        .settings(settings)
        .build()?;
    Ok(ctx)
}

/// Cancels `token` on Ctrl-C. Abort the handle once the run is over.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    warn!("Interrupted, keeping what was fetched so far");
                    token.cancel();
                }
            }
            () = token.cancelled() => {}
        }
    })
}
