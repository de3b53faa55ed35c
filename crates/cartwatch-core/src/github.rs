//! Structured GitHub Actions collector.
//!
//! Walks recent failed workflow runs for the target pipelines, descends into
//! their check-suites and check-run annotations, and emits one
//! [`FailureEntry`] per cart/checkout-relevant annotation line.
//!
//! Error scoping follows the narrowest-feasible rule: a failed annotations
//! fetch skips only that check-run, while a failure at the runs or
//! check-suites level aborts this path and lets the caller fall back to HTML
//! scraping.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::classify::classify_failure;
use crate::error::{CartwatchError, Result};
use crate::keywords::contains_keywords;
use crate::model::FailureEntry;
use crate::signature::extract_signature;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_HTML_BASE: &str = "https://github.com";

/// Fixed user-agent sent on every request.
pub const USER_AGENT: &str = "ci-cart-checkout-report/1.0";

/// Workflow names in scope, matched as lower-case substrings.
const TARGET_WORKFLOWS: [&str; 5] = [
    "ci pipeline",
    "frontend-e2e",
    "pull request quality gates",
    "frontend-ci",
    "nightly quality",
];

/// Check-run name substrings in scope.
const TARGET_CHECK_RUNS: [&str; 4] = ["e2e", "smoke", "quality", "frontend"];

/// Title marker for Playwright run-summary annotations, which pack one
/// failure per message line.
const PLAYWRIGHT_SUMMARY_MARKER: &str = "\u{1F3AD} Playwright Run Summary";

/// Requests tolerated before the rate guard pauses for two seconds.
const RATE_GUARD_THRESHOLD: u32 = 45;

const API_TIMEOUT_SECS: u64 = 30;
const HTML_TIMEOUT_SECS: u64 = 60;

// ── API payloads ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RunsPage {
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub check_suite_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunsPage {
    #[serde(default)]
    pub check_runs: Vec<CheckRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRun {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conclusion: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub annotation_level: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── HTTP client ───────────────────────────────────────────────────────────

/// Read-only GitHub client shared by the API and HTML collection paths.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    html_base: String,
}

impl GithubClient {
    /// Create a client against the public GitHub endpoints.
    pub fn new() -> Self {
        Self::with_base_urls(DEFAULT_API_BASE, DEFAULT_HTML_BASE)
    }

    /// Create a client against custom base URLs (used by tests).
    pub fn with_base_urls(api_base: &str, html_base: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(API_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        GithubClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            html_base: html_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn html_base(&self) -> &str {
        &self.html_base
    }

    /// Fetch a JSON API resource; non-2xx responses are errors.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "GET");
        let rsp = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;
        if !rsp.status().is_success() {
            return Err(CartwatchError::Api {
                status: rsp.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(rsp.json::<T>().await?)
    }

    /// Fetch a rendered HTML page with the longer scraping timeout.
    pub(crate) async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(url = %url, "GET html");
        let rsp = self
            .http
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .timeout(std::time::Duration::from_secs(HTML_TIMEOUT_SECS))
            .send()
            .await?;
        if !rsp.status().is_success() {
            return Err(CartwatchError::Api {
                status: rsp.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(rsp.text().await?)
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

// ── collection ────────────────────────────────────────────────────────────

/// Collect failure entries through the structured Actions API.
///
/// One page of runs is examined (no pagination); runs must have concluded
/// with `"failure"` inside the lookback window and belong to a target
/// workflow. Errors at the runs or check-suites level propagate so the
/// caller can switch to the HTML fallback.
pub async fn collect_from_api(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    now: DateTime<Utc>,
    days: i64,
) -> Result<Vec<FailureEntry>> {
    let cutoff = now - Duration::days(days);
    let base = format!("{}/repos/{}/{}", client.api_base(), owner, repo);

    let page: RunsPage = client
        .get_json(&format!("{base}/actions/runs?per_page=100"))
        .await?;
    let target_runs: Vec<&WorkflowRun> = page
        .workflow_runs
        .iter()
        .filter(|r| is_target_run(r, cutoff))
        .collect();
    info!(
        total = page.workflow_runs.len(),
        matched = target_runs.len(),
        "filtered recent failed workflow runs"
    );

    let mut entries = Vec::new();
    let mut rate_guard: u32 = 0;

    for run in target_runs {
        let Some(suite_id) = run.check_suite_id else {
            continue;
        };
        let suite: CheckRunsPage = client
            .get_json(&format!("{base}/check-suites/{suite_id}/check-runs"))
            .await?;
        rate_guard += 1;

        for check_run in &suite.check_runs {
            if !is_target_check_run(check_run) {
                continue;
            }
            let url = format!(
                "{base}/check-runs/{}/annotations?per_page=100",
                check_run.id
            );
            let annotations: Vec<Annotation> = match client.get_json(&url).await {
                Ok(a) => {
                    rate_guard += 1;
                    a
                }
                Err(e) => {
                    warn!(
                        check_run = check_run.id,
                        error = %e,
                        "annotations fetch failed; skipping check-run"
                    );
                    continue;
                }
            };

            for annotation in &annotations {
                entries.extend(entries_from_annotation(run, &check_run.name, annotation));
            }
        }

        if rate_guard > RATE_GUARD_THRESHOLD {
            debug!("request guard tripped; pausing before further calls");
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            rate_guard = 0;
        }
    }

    Ok(entries)
}

/// Keep runs that are recent, concluded as failures, and belong to one of
/// the target workflows. Runs with an unparseable creation time are dropped.
pub fn is_target_run(run: &WorkflowRun, cutoff: DateTime<Utc>) -> bool {
    let Ok(created) = DateTime::parse_from_rfc3339(&run.created_at) else {
        return false;
    };
    if created.with_timezone(&Utc) < cutoff {
        return false;
    }
    if run.conclusion.as_deref() != Some("failure") {
        return false;
    }
    let name = run.name.to_lowercase();
    TARGET_WORKFLOWS.iter().any(|w| name.contains(w))
}

/// Keep failed check-runs whose name matches the job allow-list.
pub fn is_target_check_run(check_run: &CheckRun) -> bool {
    if check_run.conclusion.as_deref() != Some("failure") {
        return false;
    }
    let name = check_run.name.to_lowercase();
    TARGET_CHECK_RUNS.iter().any(|w| name.contains(w))
}

/// Turn one annotation into zero or more failure entries.
///
/// Playwright run-summary annotations pack many failures into one message,
/// so those are split per line with per-line classification; any other
/// annotation is treated as a single `title + message` blob.
pub fn entries_from_annotation(
    run: &WorkflowRun,
    job_name: &str,
    annotation: &Annotation,
) -> Vec<FailureEntry> {
    let title = annotation.title.as_deref().unwrap_or("");
    let message = annotation.message.as_deref().unwrap_or("");
    let mut entries = Vec::new();

    if title.trim().starts_with(PLAYWRIGHT_SUMMARY_MARKER) && !message.is_empty() {
        for line in message.lines() {
            if !contains_keywords(line) {
                continue;
            }
            entries.push(FailureEntry {
                run_link: run.html_url.clone(),
                run_id: run.id.to_string(),
                created_at: run.created_at.clone(),
                workflow_name: run.name.clone(),
                job_name: job_name.to_string(),
                category: classify_failure(line),
                signature: extract_signature(line),
                source: "summary".to_string(),
                raw_line: line.trim().to_string(),
            });
        }
        return entries;
    }

    let blob = format!("{title}\n{message}");
    if contains_keywords(&blob) {
        let shown = if title.is_empty() { message } else { title };
        entries.push(FailureEntry {
            run_link: run.html_url.clone(),
            run_id: run.id.to_string(),
            created_at: run.created_at.clone(),
            workflow_name: run.name.clone(),
            job_name: job_name.to_string(),
            category: classify_failure(&blob),
            signature: extract_signature(&blob),
            source: annotation.annotation_level.clone().unwrap_or_default(),
            raw_line: shown.trim().to_string(),
        });
    }
    entries
}
