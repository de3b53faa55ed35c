//! Markdown report rendering and writing.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::aggregate::{Aggregate, TOP_SIGNATURES};
use crate::error::Result;
use crate::keywords::KEYWORDS;

/// Fixed output location, relative to the repository root.
pub const REPORT_RELATIVE_PATH: &str = "docs/reports/CI-CART-CHECKOUT-PATTERNS.md";

/// Render the aggregate as the fixed Markdown report layout.
pub fn render_markdown(
    owner: &str,
    repo: &str,
    generated_at: DateTime<Utc>,
    agg: &Aggregate,
) -> String {
    let mut md = String::new();

    md.push_str("# CI Cart/Checkout Failure Patterns (Last 7 Days)\n\n");
    md.push_str(&format!("Repo: {owner}/{repo}\n"));
    md.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%SZ")
    ));

    md.push_str(&format!("- Matches found: {}\n", agg.total()));
    md.push_str(&format!("- Keywords: {}\n\n", KEYWORDS.join(", ")));

    for category in agg.categories() {
        md.push_str(&format!(
            "## {} ({})\n",
            category,
            agg.category_count(category)
        ));
        let links = agg.run_links(category);
        if links.is_empty() {
            md.push_str("- Representative failed runs: (none)\n");
        } else {
            md.push_str("- Representative failed runs:\n");
            for link in links {
                md.push_str(&format!("  - {link}\n"));
            }
        }
        md.push('\n');
    }

    md.push_str("## Recurring Error Signatures\n");
    let top = agg.top_signatures(TOP_SIGNATURES);
    if top.is_empty() {
        md.push_str("- None found\n");
    } else {
        for (signature, count) in top {
            md.push_str(&format!("- {count}\u{d7} \u{2014} {signature}\n"));
            if let Some(example) = agg.example(signature) {
                if example != signature {
                    md.push_str(&format!("  - Example: {example}\n"));
                }
            }
        }
    }

    md
}

/// Write the report, creating parent directories and overwriting any
/// previous report at the same path.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::classify::Category;
    use crate::model::FailureEntry;

    fn generated_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-31T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entry(category: Category, signature: &str, raw_line: &str) -> FailureEntry {
        FailureEntry {
            run_link: "https://github.com/acme/shop/actions/runs/42".to_string(),
            run_id: "42".to_string(),
            created_at: "2026-08-30T12:00:00Z".to_string(),
            workflow_name: "Frontend-E2E".to_string(),
            job_name: "e2e".to_string(),
            category,
            signature: signature.to_string(),
            source: "summary".to_string(),
            raw_line: raw_line.to_string(),
        }
    }

    #[test]
    fn test_empty_report_states_zero_matches() {
        let agg = aggregate(&[]);
        let md = render_markdown("acme", "shop", generated_at(), &agg);

        assert!(md.contains("# CI Cart/Checkout Failure Patterns (Last 7 Days)"));
        assert!(md.contains("Repo: acme/shop"));
        assert!(md.contains("Generated: 2026-08-31 08:30:00Z"));
        assert!(md.contains("- Matches found: 0"));
        assert!(md.contains("- Keywords: cart, checkout, product-card, cart-item"));
        assert!(md.contains("## API failures (0)"));
        assert!(md.contains("- Representative failed runs: (none)"));
        assert!(md.contains("## Recurring Error Signatures\n- None found"));
    }

    #[test]
    fn test_report_sections_and_signature_ranking() {
        let entries = vec![
            entry(
                Category::ApiFailures,
                "Error: 503 Service Unavailable",
                "checkout.spec.ts: Error: 503 Service Unavailable on /api/cart",
            ),
            entry(
                Category::ApiFailures,
                "Error: 503 Service Unavailable",
                "checkout.spec.ts: Error: 503 Service Unavailable on /api/cart",
            ),
            entry(
                Category::TestSelectorIssues,
                "strict mode violation: .cart-item",
                "strict mode violation: .cart-item",
            ),
        ];
        let agg = aggregate(&entries);
        let md = render_markdown("acme", "shop", generated_at(), &agg);

        assert!(md.contains("- Matches found: 3"));
        assert!(md.contains("## API failures (2)"));
        assert!(md.contains("## Test selector issues (1)"));
        assert!(md.contains("- 2\u{d7} \u{2014} Error: 503 Service Unavailable"));
        assert!(md.contains("- 1\u{d7} \u{2014} strict mode violation: .cart-item"));

        // Higher counts come first.
        let pos_2x = md.find("- 2\u{d7}").unwrap();
        let pos_1x = md.find("- 1\u{d7}").unwrap();
        assert!(pos_2x < pos_1x);

        // Example shown only when it differs from the signature.
        assert!(md.contains("  - Example: checkout.spec.ts: Error: 503"));
        assert!(!md.contains("  - Example: strict mode violation: .cart-item"));
    }

    #[test]
    fn test_representative_run_links_listed() {
        let agg = aggregate(&[entry(Category::ApiFailures, "sig", "line")]);
        let md = render_markdown("acme", "shop", generated_at(), &agg);
        assert!(md.contains("- Representative failed runs:\n  - https://github.com/acme/shop/actions/runs/42"));
    }

    #[test]
    fn test_write_report_creates_parent_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs/reports/CI-CART-CHECKOUT-PATTERNS.md");

        write_report(&path, "first\n").unwrap();
        write_report(&path, "second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
    }
}
