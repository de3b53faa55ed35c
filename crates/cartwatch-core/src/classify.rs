//! Root-cause classification of cart/checkout failure text.
//!
//! The classifier is a priority-ordered predicate chain evaluated
//! top-to-bottom with early return. Ordering is load-bearing: API-layer
//! symptoms must not be masked by the generic timeout vocabulary they often
//! share with rendering failures, and selector diagnostics frequently contain
//! the word "timeout" themselves, so they are checked before the rendering
//! rule. Every relevant line gets a category; unmatched text falls back to
//! [`Category::UiRenderingFailures`].

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Root-cause bucket for a cart/checkout failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ApiFailures,
    TestSelectorIssues,
    UiRenderingFailures,
}

impl Category {
    /// Report label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ApiFailures => "API failures",
            Category::TestSelectorIssues => "Test selector issues",
            Category::UiRenderingFailures => "UI rendering failures",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network-layer error phrases that mark an API failure outright.
const NETWORK_ERROR_PHRASES: [&str; 12] = [
    "econnrefused",
    "econnreset",
    "etimedout",
    "connection refused",
    "network error",
    "net::err_",
    "socket hang up",
    "bad gateway",
    "service unavailable",
    "internal server error",
    "failed to fetch",
    "timeout while fetching",
];

/// Selector diagnostics from the test runner, plus the two selector classes
/// the cart/checkout suites rely on.
const SELECTOR_PHRASES: [&str; 14] = [
    "strict mode violation",
    "selector resolved to",
    "unknown engine",
    "invalid selector",
    "data-testid",
    "getbytestid",
    "getbyrole(",
    "not found matching selector",
    "unknown selector",
    "matches more than one element",
    ".product-card",
    ".cart-item",
    "[data-testid=\"product-card\"]",
    "[data-testid=\"cart-item\"]",
];

/// Rendering, visibility and wait-timeout phrases.
const RENDERING_PHRASES: [&str; 10] = [
    "tobevisible",
    "tohavetext",
    "element is not attached",
    "not visible",
    "timeout",
    "waiting for locator",
    "waitforselector",
    "evaluation failed",
    "hydration failed",
    "reading '",
];

/// 4xx/5xx status-code token.
fn http_status_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(5\d\d|4\d\d)\b").expect("valid status regex"))
}

/// Predicates take text already lower-cased by [`classify_failure`].
fn is_api_failure(t: &str) -> bool {
    let status_with_http_vocab = http_status_re().is_match(t)
        && (t.contains("fetch") || t.contains("response") || t.contains("http"));
    status_with_http_vocab || NETWORK_ERROR_PHRASES.iter().any(|p| t.contains(p))
}

fn is_selector_issue(t: &str) -> bool {
    SELECTOR_PHRASES.iter().any(|p| t.contains(p))
}

fn is_rendering_failure(t: &str) -> bool {
    RENDERING_PHRASES.iter().any(|p| t.contains(p))
}

/// Ordered classification rules; earlier rules take precedence.
const RULES: [(fn(&str) -> bool, Category); 3] = [
    (is_api_failure, Category::ApiFailures),
    (is_selector_issue, Category::TestSelectorIssues),
    (is_rendering_failure, Category::UiRenderingFailures),
];

/// Classify a cart/checkout-relevant text block into exactly one category.
///
/// Total and deterministic: identical input always yields the same category,
/// and text matching no rule falls back to `UI rendering failures`.
pub fn classify_failure(text: &str) -> Category {
    let t = text.to_lowercase();
    for (matches, category) in RULES {
        if matches(&t) {
            return category;
        }
    }
    Category::UiRenderingFailures
}
