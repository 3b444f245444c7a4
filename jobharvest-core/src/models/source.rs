//! Per-source configuration and page arithmetic.
//!
//! Sources disagree on whether pages start at 0 or 1 and on how to clamp
//! against a retrievable-record cap, so both are explicit settings here
//! rather than being inferred from the responses.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

/// Default number of simultaneous listing requests.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 15;

/// Default number of identifiers per detail batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default pause between detail batches.
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_secs(5);

/// Default timeout of a single fetch.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Page Index Base
// ============================================================================

/// Index of a source's first page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageIndexBase {
    /// Pages are numbered `0, 1, 2, ...`.
    Zero,
    /// Pages are numbered `1, 2, 3, ...`.
    #[default]
    One,
}

impl PageIndexBase {
    /// Returns the index of the first page.
    pub fn first_index(self) -> u64 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

// ============================================================================
// Page Request
// ============================================================================

/// One listing page to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page index in the source's own numbering.
    pub index: u64,
    /// Records per page.
    pub size: u32,
    /// Zero-based record offset of the page's first item.
    pub offset: u64,
}

impl PageRequest {
    /// Creates a page request, deriving the record offset from the base.
    pub fn new(index: u64, size: u32, base: PageIndexBase) -> Self {
        let ordinal = index.saturating_sub(base.first_index());
        Self {
            index,
            size,
            offset: ordinal.saturating_mul(u64::from(size)),
        }
    }

    /// Returns the request for the first page of a source.
    pub fn first(config: &SourceConfig) -> Self {
        Self::new(
            config.page_index_base.first_index(),
            config.page_size,
            config.page_index_base,
        )
    }
}

// ============================================================================
// Page Range
// ============================================================================

/// Inclusive range of page indices, starting at the source's first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    first: u64,
    count: u64,
}

impl PageRange {
    /// Creates a range of `count` pages starting at `first`.
    pub fn new(first: u64, count: u64) -> Self {
        Self { first, count }
    }

    /// Creates the range of `count` pages for a source.
    pub fn for_source(config: &SourceConfig, count: u64) -> Self {
        Self::new(config.page_index_base.first_index(), count)
    }

    /// Index of the first page.
    pub fn first(&self) -> u64 {
        self.first
    }

    /// Index of the last page, or `None` when the range is empty.
    pub fn last(&self) -> Option<u64> {
        (self.count > 0).then(|| self.first + self.count - 1)
    }

    /// Number of pages in the range.
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Returns true if the range holds no pages.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over the page indices.
    pub fn iter(&self) -> impl Iterator<Item = u64> + use<> {
        self.first..self.first.saturating_add(self.count)
    }

    /// Iterates over page requests for every index in the range.
    pub fn requests(&self, config: &SourceConfig) -> impl Iterator<Item = PageRequest> + use<> {
        let size = config.page_size;
        let base = config.page_index_base;
        self.iter().map(move |index| PageRequest::new(index, size, base))
    }
}

// ============================================================================
// Page Plan
// ============================================================================

/// Page count derived from a reported total and a source's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePlan {
    /// Total record count reported by the source.
    pub total_count: u64,
    /// `ceil(total_count / page_size)`.
    pub raw_page_count: u64,
    /// Number of pages to actually fetch.
    pub effective_page_count: u64,
    /// Whether the retrievable-record cap clamped the page count.
    pub capped: bool,
}

impl PagePlan {
    /// Computes the page plan for a reported total.
    ///
    /// When the source declares a cap and the total exceeds it, the page
    /// count becomes `floor(cap / page_size) - cap_page_offset`.
    pub fn compute(total_count: u64, config: &SourceConfig) -> Self {
        let page_size = u64::from(config.page_size.max(1));
        let raw_page_count = total_count.div_ceil(page_size);

        match config.retrievable_record_cap {
            Some(cap) if total_count > cap => {
                let clamped = (cap / page_size)
                    .saturating_sub(u64::from(config.cap_page_offset))
                    .min(raw_page_count);
                Self {
                    total_count,
                    raw_page_count,
                    effective_page_count: clamped,
                    capped: true,
                }
            }
            _ => Self {
                total_count,
                raw_page_count,
                effective_page_count: raw_page_count,
                capped: false,
            },
        }
    }

    /// Returns the page range this plan covers for a source.
    pub fn page_range(&self, config: &SourceConfig) -> PageRange {
        PageRange::for_source(config, self.effective_page_count)
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Immutable tuning of one source, passed explicitly into the harvester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Records per listing page.
    pub page_size: u32,
    /// Index of the first page.
    #[serde(default)]
    pub page_index_base: PageIndexBase,
    /// Maximum number of records the source will ever serve.
    #[serde(default)]
    pub retrievable_record_cap: Option<u64>,
    /// Pages subtracted from `floor(cap / page_size)` when the cap applies.
    #[serde(default = "default_cap_page_offset")]
    pub cap_page_offset: u32,
    /// Maximum simultaneous listing requests.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    /// Identifiers per detail batch (also the in-batch concurrency).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause before every detail batch except the first.
    #[serde(default = "default_inter_batch_delay", with = "duration_secs")]
    pub inter_batch_delay: Duration,
    /// Timeout of a single fetch.
    #[serde(default = "default_request_timeout", with = "duration_secs")]
    pub request_timeout: Duration,
}

fn default_cap_page_offset() -> u32 {
    1
}

fn default_concurrency_limit() -> usize {
    DEFAULT_CONCURRENCY_LIMIT
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_inter_batch_delay() -> Duration {
    DEFAULT_INTER_BATCH_DELAY
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl SourceConfig {
    /// Creates a configuration with the given page size and defaults elsewhere.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            page_index_base: PageIndexBase::default(),
            retrievable_record_cap: None,
            cap_page_offset: default_cap_page_offset(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the page index base.
    pub fn with_page_index_base(mut self, base: PageIndexBase) -> Self {
        self.page_index_base = base;
        self
    }

    /// Sets the retrievable-record cap and the page offset applied with it.
    pub fn with_record_cap(mut self, cap: u64, cap_page_offset: u32) -> Self {
        self.retrievable_record_cap = Some(cap);
        self.cap_page_offset = cap_page_offset;
        self
    }

    /// Sets the listing concurrency limit.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Sets the detail batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the pause between detail batches.
    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = delay;
        self
    }

    /// Sets the per-fetch timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Checks that every bound is usable.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page_size == 0 {
            return Err(CoreError::InvalidConfig("page_size must be positive".to_string()));
        }
        if self.concurrency_limit == 0 {
            return Err(CoreError::InvalidConfig(
                "concurrency_limit must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(CoreError::InvalidConfig("batch_size must be positive".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(CoreError::InvalidConfig(
                "request_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| D::Error::custom(format!("invalid duration in seconds: {secs}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
