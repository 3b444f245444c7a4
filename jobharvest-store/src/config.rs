//! Configuration management.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use jobharvest_core::SourceConfig;
use jobharvest_sources::{JsonSourceAdapter, SourceDescriptor, SourceError, SourceRegistry};

use crate::error::StoreError;
use crate::output::OutputFormat;
use crate::persistence::default_config_path;

/// Harvest configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Directory output files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Output format used when none is given on the command line.
    #[serde(default)]
    pub format: OutputFormat,
    /// Per-source tuning, keyed by source id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub sources: HashMap<String, SourceOverride>,
    /// Extra sources, or replacements for built-in ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_sources: Vec<SourceDescriptor>,
}

/// Overrides applied on top of a source's built-in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceOverride {
    /// Records per listing page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Maximum simultaneous listing requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency_limit: Option<usize>,
    /// Identifiers per detail batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Seconds to pause between detail batches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inter_batch_delay_secs: Option<f64>,
    /// Seconds before a single fetch times out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<f64>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn secs(field: &str, value: f64) -> Result<Duration, StoreError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        StoreError::Config(format!(
            "{field} must be a non-negative number of seconds, got {value}"
        ))
    })
}

impl SourceOverride {
    /// Applies the overrides to a source configuration.
    pub fn apply(&self, config: &SourceConfig) -> Result<SourceConfig, StoreError> {
        let mut config = config.clone();
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(limit) = self.concurrency_limit {
            config.concurrency_limit = limit;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(delay) = self.inter_batch_delay_secs {
            config.inter_batch_delay = secs("inter_batch_delay_secs", delay)?;
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.request_timeout = secs("request_timeout_secs", timeout)?;
        }
        config
            .validate()
            .map_err(|e| StoreError::Source(SourceError::Config(e)))?;
        Ok(config)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: OutputFormat::default(),
            sources: HashMap::new(),
            custom_sources: Vec::new(),
        }
    }
}

impl HarvestConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: HarvestConfig = serde_json::from_str(&content)?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Builds the source registry: built-ins plus custom sources.
    pub fn registry(&self) -> Result<SourceRegistry, StoreError> {
        Ok(SourceRegistry::with_custom(self.custom_sources.clone())?)
    }

    /// Returns the override for a source id, if any.
    pub fn source_override(&self, id: &str) -> Option<&SourceOverride> {
        self.sources
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(id))
            .map(|(_, o)| o)
    }

    /// Resolves a source by id or alias and applies its override.
    pub fn adapter(
        &self,
        registry: &SourceRegistry,
        name: &str,
    ) -> Result<JsonSourceAdapter, StoreError> {
        let mut descriptor = registry
            .get(name)
            .ok_or_else(|| SourceError::UnknownSource(name.to_string()))?
            .clone();

        if let Some(overrides) = self.source_override(&descriptor.id) {
            descriptor.config = overrides.apply(&descriptor.config)?;
            debug!(source = %descriptor.id, "Applied source override");
        }

        Ok(JsonSourceAdapter::new(descriptor)?)
    }
}
