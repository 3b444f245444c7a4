//! Harvest context shared by every phase of a run.
//!
//! The context bundles the transport, the run-level settings and the
//! cancellation token. It holds no per-run results; each harvest call
//! builds its own.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use jobharvest_core::SourceConfig;

use crate::error::FetchError;
use crate::host::http::HttpClient;
use crate::transport::Transport;

// ============================================================================
// Harvest Settings
// ============================================================================

/// Run-level knobs layered over a source's own configuration.
#[derive(Debug, Clone, Default)]
pub struct HarvestSettings {
    /// Replaces the source's listing concurrency limit.
    pub concurrency_limit: Option<usize>,
    /// Replaces the source's detail batch size.
    pub batch_size: Option<usize>,
    /// Replaces the source's inter-batch delay.
    pub inter_batch_delay: Option<Duration>,
    /// Replaces the source's per-fetch timeout.
    pub request_timeout: Option<Duration>,
    /// Keep listing records in page order instead of completion order.
    pub stable_order: bool,
}

impl HarvestSettings {
    /// Applies the overrides to a source configuration.
    pub fn apply(&self, config: &SourceConfig) -> SourceConfig {
        let mut effective = config.clone();
        if let Some(limit) = self.concurrency_limit {
            effective.concurrency_limit = limit;
        }
        if let Some(batch_size) = self.batch_size {
            effective.batch_size = batch_size;
        }
        if let Some(delay) = self.inter_batch_delay {
            effective.inter_batch_delay = delay;
        }
        if let Some(timeout) = self.request_timeout {
            effective.request_timeout = timeout;
        }
        effective
    }
}

// ============================================================================
// Harvest Context
// ============================================================================

/// Transport, settings and cancellation for a harvest run.
pub struct HarvestContext {
    /// Transport shared by every fetch.
    pub transport: Arc<dyn Transport>,
    /// Run-level settings.
    pub settings: HarvestSettings,
    cancel: CancellationToken,
}

impl HarvestContext {
    /// Creates a context over the given transport with default settings.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            settings: HarvestSettings::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> HarvestContextBuilder {
        HarvestContextBuilder::new()
    }

    /// Returns a source's configuration with the run-level overrides applied.
    pub fn effective_config(&self, config: &SourceConfig) -> SourceConfig {
        self.settings.apply(config)
    }

    /// Returns a clone of the run's cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Requests cancellation of the run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl std::fmt::Debug for HarvestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestContext")
            .field("settings", &self.settings)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Harvest Context Builder
// ============================================================================

/// Builder for constructing a [`HarvestContext`].
#[derive(Default)]
pub struct HarvestContextBuilder {
    transport: Option<Arc<dyn Transport>>,
    settings: HarvestSettings,
    cancel: Option<CancellationToken>,
}

impl HarvestContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets all run-level settings at once.
    pub fn settings(mut self, settings: HarvestSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Overrides the listing concurrency limit.
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.settings.concurrency_limit = Some(limit);
        self
    }

    /// Overrides the detail batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.settings.batch_size = Some(batch_size);
        self
    }

    /// Overrides the inter-batch delay.
    pub fn inter_batch_delay(mut self, delay: Duration) -> Self {
        self.settings.inter_batch_delay = Some(delay);
        self
    }

    /// Overrides the per-fetch timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.settings.request_timeout = Some(timeout);
        self
    }

    /// Keeps listing records in page order.
    pub fn stable_order(mut self, stable: bool) -> Self {
        self.settings.stable_order = stable;
        self
    }

    /// Uses an externally owned cancellation token.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds the context, creating a default [`HttpClient`] if no transport was set.
    pub fn build(self) -> Result<HarvestContext, FetchError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpClient::new()?),
        };

        Ok(HarvestContext {
            transport,
            settings: self.settings,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
