//! Failure entries produced by the collectors.

use serde::Serialize;

use crate::classify::Category;

/// Maximum length of the raw matched line kept for display.
pub const MAX_RAW_LINE_LEN: usize = 240;

/// One cart/checkout-relevant failure collected from CI.
///
/// Created by a collector, consumed by the aggregator, immutable thereafter.
/// The raw line always satisfies the keyword filter, and the signature is
/// never empty for non-empty input (it falls back to a truncated prefix of
/// the raw text).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailureEntry {
    /// URL of the originating run; may be empty for low-confidence sources.
    pub run_link: String,

    /// Opaque run identifier.
    pub run_id: String,

    /// ISO-8601 creation time, empty when unknown (the HTML path cannot
    /// recover it).
    pub created_at: String,

    /// Workflow label, may be empty.
    pub workflow_name: String,

    /// Job label, may be empty.
    pub job_name: String,

    /// Root-cause bucket assigned by the classifier.
    pub category: Category,

    /// Deduplication key, at most 180 characters.
    pub signature: String,

    /// Provenance: `"summary"`, an annotation level, or `"html"`.
    /// Informational only.
    pub source: String,

    /// Original matched text, truncated for display.
    pub raw_line: String,
}
