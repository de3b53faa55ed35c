//! Two-tier collection: structured API first, HTML scraping on failure.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::github::{self, GithubClient};
use crate::html;
use crate::model::FailureEntry;

/// Collect failure entries, preferring the structured Actions API.
///
/// A path-level API failure (rate limiting, outage) switches once to the
/// HTML scraper; the switch is never reversed and nothing is retried. The
/// degraded path is not surfaced to the caller as an error.
pub async fn collect_entries(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    now: DateTime<Utc>,
    days: i64,
) -> Vec<FailureEntry> {
    match github::collect_from_api(client, owner, repo, now, days).await {
        Ok(entries) => {
            info!(count = entries.len(), "collected entries via the Actions API");
            entries
        }
        Err(e) => {
            warn!(error = %e, "Actions API unavailable; falling back to HTML scraping");
            html::collect_from_html(client, owner, repo).await
        }
    }
}
