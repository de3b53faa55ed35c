//! Pure aggregation of failure entries into report-ready groupings.
//!
//! A single reduction pass over the entry list produces category buckets,
//! global signature tallies with first-seen examples, and representative run
//! links. The classifier is closed over three categories, but the aggregate
//! keys on labels and accepts unknown ones as dynamic buckets.

use std::collections::HashMap;

use crate::model::FailureEntry;

/// Fixed category labels in report order.
pub const FIXED_CATEGORIES: [&str; 3] = [
    "API failures",
    "UI rendering failures",
    "Test selector issues",
];

/// Distinct representative run links kept per category.
pub const MAX_RUN_LINKS_PER_CATEGORY: usize = 3;

/// Signatures shown in the report, ranked by occurrence count.
pub const TOP_SIGNATURES: usize = 20;

/// Report-ready aggregate built once per invocation and discarded after
/// rendering.
#[derive(Debug, Default)]
pub struct Aggregate {
    category_order: Vec<String>,
    by_category: HashMap<String, Vec<FailureEntry>>,
    signature_order: Vec<String>,
    signature_counts: HashMap<String, usize>,
    signature_examples: HashMap<String, String>,
    category_run_links: HashMap<String, Vec<String>>,
    total: usize,
}

impl Aggregate {
    /// Category labels in report order: the three fixed buckets first, then
    /// any dynamic buckets in first-seen order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.category_order.iter().map(String::as_str)
    }

    /// Number of entries in a category bucket.
    pub fn category_count(&self, label: &str) -> usize {
        self.by_category.get(label).map_or(0, Vec::len)
    }

    /// Entries grouped under a category, in encounter order.
    pub fn entries(&self, label: &str) -> &[FailureEntry] {
        self.by_category.get(label).map_or(&[], Vec::as_slice)
    }

    /// Representative run links for a category (at most three, distinct,
    /// first-seen order).
    pub fn run_links(&self, label: &str) -> &[String] {
        self.category_run_links.get(label).map_or(&[], Vec::as_slice)
    }

    /// First-seen example line for a signature.
    pub fn example(&self, signature: &str) -> Option<&str> {
        self.signature_examples.get(signature).map(String::as_str)
    }

    /// Top `n` signatures by descending count; ties keep first-seen order.
    pub fn top_signatures(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .signature_order
            .iter()
            .map(|sig| (sig.as_str(), self.signature_counts[sig]))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Total number of collected entries.
    pub fn total(&self) -> usize {
        self.total
    }

    fn bucket(&mut self, label: &str) -> &mut Vec<FailureEntry> {
        if !self.by_category.contains_key(label) {
            self.category_order.push(label.to_string());
            self.category_run_links.insert(label.to_string(), Vec::new());
        }
        self.by_category.entry(label.to_string()).or_default()
    }
}

/// Reduce a list of failure entries into an [`Aggregate`].
///
/// Pure: no IO, no ambient state. The three fixed category buckets always
/// exist, even when empty, so the report layout is stable.
pub fn aggregate(entries: &[FailureEntry]) -> Aggregate {
    let mut agg = Aggregate::default();
    for label in FIXED_CATEGORIES {
        agg.bucket(label);
    }

    for entry in entries {
        let label = entry.category.as_str();
        agg.bucket(label).push(entry.clone());

        let signature = entry.signature.trim().to_string();
        if !agg.signature_counts.contains_key(&signature) {
            agg.signature_order.push(signature.clone());
            agg.signature_examples
                .insert(signature.clone(), entry.raw_line.clone());
        }
        *agg.signature_counts.entry(signature).or_insert(0) += 1;

        let links = agg
            .category_run_links
            .entry(label.to_string())
            .or_default();
        if !entry.run_link.is_empty()
            && !links.contains(&entry.run_link)
            && links.len() < MAX_RUN_LINKS_PER_CATEGORY
        {
            links.push(entry.run_link.clone());
        }

        agg.total += 1;
    }
    agg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;

    fn entry(category: Category, signature: &str, link: &str) -> FailureEntry {
        FailureEntry {
            run_link: link.to_string(),
            run_id: "1".to_string(),
            created_at: "2026-08-30T12:00:00Z".to_string(),
            workflow_name: "Frontend-E2E".to_string(),
            job_name: "e2e".to_string(),
            category,
            signature: signature.to_string(),
            source: "summary".to_string(),
            raw_line: format!("example for {signature}"),
        }
    }

    #[test]
    fn test_empty_input_keeps_fixed_buckets() {
        let agg = aggregate(&[]);
        assert_eq!(agg.total(), 0);
        let labels: Vec<&str> = agg.categories().collect();
        assert_eq!(
            labels,
            vec!["API failures", "UI rendering failures", "Test selector issues"]
        );
        assert!(agg.top_signatures(TOP_SIGNATURES).is_empty());
    }

    #[test]
    fn test_counts_signatures_globally() {
        let entries = vec![
            entry(Category::ApiFailures, "Error: 503 Service Unavailable", "a"),
            entry(Category::UiRenderingFailures, "Error: 503 Service Unavailable", "b"),
            entry(Category::ApiFailures, "Error: failed to fetch cart", "a"),
        ];
        let agg = aggregate(&entries);
        let top = agg.top_signatures(TOP_SIGNATURES);
        assert_eq!(top[0], ("Error: 503 Service Unavailable", 2));
        assert_eq!(top[1], ("Error: failed to fetch cart", 1));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let entries = vec![
            entry(Category::ApiFailures, "sig-b", ""),
            entry(Category::ApiFailures, "sig-a", ""),
        ];
        let agg = aggregate(&entries);
        let top = agg.top_signatures(TOP_SIGNATURES);
        assert_eq!(top, vec![("sig-b", 1), ("sig-a", 1)]);
    }

    #[test]
    fn test_top_signatures_is_capped() {
        let entries: Vec<FailureEntry> = (0..30)
            .map(|i| entry(Category::ApiFailures, &format!("sig-{i}"), ""))
            .collect();
        let agg = aggregate(&entries);
        assert_eq!(agg.top_signatures(TOP_SIGNATURES).len(), TOP_SIGNATURES);
    }

    #[test]
    fn test_run_links_distinct_and_capped() {
        let entries = vec![
            entry(Category::ApiFailures, "s1", "link-1"),
            entry(Category::ApiFailures, "s2", "link-1"),
            entry(Category::ApiFailures, "s3", ""),
            entry(Category::ApiFailures, "s4", "link-2"),
            entry(Category::ApiFailures, "s5", "link-3"),
            entry(Category::ApiFailures, "s6", "link-4"),
        ];
        let agg = aggregate(&entries);
        assert_eq!(agg.run_links("API failures"), ["link-1", "link-2", "link-3"]);
    }

    #[test]
    fn test_example_records_first_seen_raw_line() {
        let mut first = entry(Category::ApiFailures, "shared", "a");
        first.raw_line = "first example".to_string();
        let mut second = entry(Category::ApiFailures, "shared", "a");
        second.raw_line = "second example".to_string();

        let agg = aggregate(&[first, second]);
        assert_eq!(agg.example("shared"), Some("first example"));
    }

    #[test]
    fn test_groups_by_category() {
        let entries = vec![
            entry(Category::ApiFailures, "s1", "a"),
            entry(Category::TestSelectorIssues, "s2", "b"),
            entry(Category::ApiFailures, "s3", "c"),
        ];
        let agg = aggregate(&entries);
        assert_eq!(agg.category_count("API failures"), 2);
        assert_eq!(agg.category_count("Test selector issues"), 1);
        assert_eq!(agg.category_count("UI rendering failures"), 0);
        assert_eq!(agg.total(), 3);
    }
}
