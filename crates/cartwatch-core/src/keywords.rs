//! Keyword relevance gate for cart/checkout failure text.

/// Keywords that mark a block of CI output as cart/checkout related.
pub const KEYWORDS: [&str; 4] = ["cart", "checkout", "product-card", "cart-item"];

/// Check whether text mentions any cart/checkout keyword.
///
/// Case-insensitive substring containment; no tokenization or stemming.
/// Used as a cheap gate before classification so unrelated failures never
/// reach the report.
pub fn contains_keywords(text: &str) -> bool {
    let t = text.to_lowercase();
    KEYWORDS.iter().any(|k| t.contains(k))
}
