//! Structured run reporting
//!
//! Every lenient-mode run returns a complete aggregate table plus a report
//! of what was dropped or skipped and why. Nothing is silently discarded.

use std::collections::BTreeMap;

use serde::Serialize;

/// Why a raw row (or output row) was excluded from the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DropReason {
    /// A required field was absent
    MissingField,
    /// A numeric field could not be coerced
    Unparseable,
    /// The term code was not a valid `YYYYSS` value
    InvalidTerm,
    /// No weight configured for the row's (college, question) pair
    UnknownQuestionWeight,
    /// The row reported zero responses
    ZeroResponses,
    /// A count field was negative
    NegativeCount,
    /// Mean or standard deviation was not a finite number
    NonFiniteStat,
    /// A key joined to zero or several rows where exactly one was expected
    CardinalityViolation,
}

/// A group excluded from the output because its combination failed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedGroup {
    /// Which tier the group belongs to ("instructor", "course", "department")
    pub tier: &'static str,
    /// Display form of the group's composite key
    pub key: String,
    /// The error that caused the skip
    pub error: String,
}

/// Summary of a full aggregation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Raw rows supplied to the engine
    pub rows_seen: usize,
    /// Rows surviving normalization
    pub rows_normalized: usize,
    /// Flattened output rows produced
    pub rows_emitted: usize,
    /// Per-reason counts of dropped rows
    pub dropped: BTreeMap<DropReason, u64>,
    /// Groups skipped because their combination failed
    pub skipped_groups: Vec<SkippedGroup>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one dropped row under the given reason
    pub fn record_drop(&mut self, reason: DropReason) {
        *self.dropped.entry(reason).or_insert(0) += 1;
    }

    /// Count of rows dropped for one reason
    pub fn drops(&self, reason: DropReason) -> u64 {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }

    /// Total rows dropped across all reasons
    pub fn total_dropped(&self) -> u64 {
        self.dropped.values().sum()
    }

    /// Record a group excluded from the output
    pub fn record_skipped_group(
        &mut self,
        tier: &'static str,
        key: impl Into<String>,
        error: impl std::fmt::Display,
    ) {
        self.skipped_groups.push(SkippedGroup {
            tier,
            key: key.into(),
            error: error.to_string(),
        });
    }

    /// True when every input row made it into the output
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.skipped_groups.is_empty()
    }
}
