//! Harvest results.
//!
//! A [`HarvestResult`] is built incrementally through a
//! [`HarvestResultBuilder`] owned by the harvesting call, and is read-only
//! once that call returns it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{Identifier, Record};

// ============================================================================
// Fetch Failure
// ============================================================================

/// What a failed fetch was addressing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum FetchTarget {
    /// A listing page, by page index.
    Page(u64),
    /// A detail view, by identifier.
    Item(Identifier),
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(index) => write!(f, "page {index}"),
            Self::Item(id) => write!(f, "item {id}"),
        }
    }
}

/// A fetch that was absorbed as a skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// What was being fetched.
    pub target: FetchTarget,
    /// Human-readable reason.
    pub reason: String,
}

impl FetchFailure {
    /// Creates a failure record.
    pub fn new(target: FetchTarget, reason: impl Into<String>) -> Self {
        Self {
            target,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Harvest Result
// ============================================================================

/// Records plus attempt/failure counters from one harvest call.
///
/// Record order carries no meaning unless the run asked for stable ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HarvestResult {
    records: Vec<Record>,
    attempted: usize,
    succeeded: usize,
    failures: Vec<FetchFailure>,
    cancelled: bool,
}

impl HarvestResult {
    /// Creates a builder for a new result.
    pub fn builder() -> HarvestResultBuilder {
        HarvestResultBuilder::default()
    }

    /// Creates an empty result that was cancelled before any fetch.
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    /// The harvested records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the result, returning the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of records harvested.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of fetches that ran to an outcome (pages or items).
    ///
    /// Fetches still in flight when the run was cancelled are not counted.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Number of fetches that produced data.
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of fetches that were skipped after failing.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every absorbed failure.
    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    /// Whether the run was cut short by cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns true when every fetch succeeded and nothing was cancelled.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    /// Returns the counters without the records.
    pub fn summary(&self) -> HarvestSummary {
        HarvestSummary {
            records: self.records.len(),
            attempted: self.attempted,
            succeeded: self.succeeded,
            failed: self.failures.len(),
            cancelled: self.cancelled,
        }
    }
}

// ============================================================================
// Harvest Summary
// ============================================================================

/// Counters of a harvest result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestSummary {
    /// Records harvested.
    pub records: usize,
    /// Fetches that ran to an outcome; in-flight fetches dropped on
    /// cancellation are not counted.
    pub attempted: usize,
    /// Fetches that produced data.
    pub succeeded: usize,
    /// Fetches skipped after failing.
    pub failed: usize,
    /// Whether the run was cancelled.
    pub cancelled: bool,
}

impl fmt::Display for HarvestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records from {}/{} fetches ({} failed)",
            self.records, self.succeeded, self.attempted, self.failed
        )?;
        if self.cancelled {
            f.write_str(", cancelled")?;
        }
        Ok(())
    }
}

// ============================================================================
// Harvest Result Builder
// ============================================================================

/// Accumulates fetch outcomes into a [`HarvestResult`].
#[derive(Debug, Default)]
pub struct HarvestResultBuilder {
    inner: HarvestResult,
}

impl HarvestResultBuilder {
    /// Records a successful fetch and its records.
    pub fn push_success(&mut self, records: impl IntoIterator<Item = Record>) {
        self.inner.attempted += 1;
        self.inner.succeeded += 1;
        self.inner.records.extend(records);
    }

    /// Records a failed fetch. It contributes no records.
    pub fn push_failure(&mut self, failure: FetchFailure) {
        self.inner.attempted += 1;
        self.inner.failures.push(failure);
    }

    /// Folds another result into this one.
    pub fn merge(&mut self, other: HarvestResult) {
        self.inner.attempted += other.attempted;
        self.inner.succeeded += other.succeeded;
        self.inner.records.extend(other.records);
        self.inner.failures.extend(other.failures);
        self.inner.cancelled |= other.cancelled;
    }

    /// Flags the result as cut short by cancellation.
    pub fn mark_cancelled(&mut self) {
        self.inner.cancelled = true;
    }

    /// Number of records accumulated so far.
    pub fn record_count(&self) -> usize {
        self.inner.records.len()
    }

    /// Finishes the result.
    pub fn build(self) -> HarvestResult {
        self.inner
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64) -> Record {
        Record::from_value(json!({ "id": id })).unwrap()
    }

    #[test]
    fn test_builder_counts() {
        let mut builder = HarvestResult::builder();
        builder.push_success(vec![record(1), record(2)]);
        builder.push_failure(FetchFailure::new(FetchTarget::Page(2), "HTTP 500"));
        builder.push_success(Vec::new());

        let result = builder.build();
        assert_eq!(result.record_count(), 2);
        assert_eq!(result.attempted(), 3);
        assert_eq!(result.succeeded(), 2);
        assert_eq!(result.failed(), 1);
        assert!(!result.is_complete());
        assert!(!result.is_cancelled());
    }

    #[test]
    fn test_merge_keeps_cancel_flag() {
        let mut first = HarvestResult::builder();
        first.push_success(vec![record(1)]);

        let mut second = HarvestResult::builder();
        second.push_success(vec![record(2)]);
        second.mark_cancelled();

        first.merge(second.build());
        let result = first.build();

        assert_eq!(result.record_count(), 2);
        assert_eq!(result.attempted(), 2);
        assert!(result.is_cancelled());
    }

    #[test]
    fn test_summary_display() {
        let mut builder = HarvestResult::builder();
        builder.push_success(vec![record(1)]);
        builder.push_failure(FetchFailure::new(FetchTarget::Item(Identifier::from(9)), "timeout"));
        builder.mark_cancelled();

        let summary = builder.build().summary();
        assert_eq!(
            summary.to_string(),
            "1 records from 1/2 fetches (1 failed), cancelled"
        );
    }

    #[test]
    fn test_cancelled_constructor() {
        let result = HarvestResult::cancelled();
        assert!(result.is_cancelled());
        assert_eq!(result.attempted(), 0);
    }
}
