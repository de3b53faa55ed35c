//! HTML fallback collector.
//!
//! Used only when the structured API path fails (typically rate limiting).
//! Scrapes the rendered Actions list and run pages, keeping any cleaned line
//! that passes the keyword gate. Entries from this path carry no timestamp
//! or workflow/job metadata; it deliberately trades fidelity for resilience.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::classify::classify_failure;
use crate::github::GithubClient;
use crate::keywords::contains_keywords;
use crate::model::{FailureEntry, MAX_RAW_LINE_LEN};
use crate::signature::{extract_signature, truncate_chars};

/// Actions list pages fetched before giving up.
pub const MAX_LIST_PAGES: usize = 3;

/// Global cap on distinct run pages fetched across all list pages.
pub const MAX_RUNS: usize = 60;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

fn numeric_entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&#(?:x(?P<hex>[0-9a-fA-F]+)|(?P<dec>[0-9]+));").expect("valid entity regex")
    })
}

/// Collect failure entries by scraping rendered Actions pages.
///
/// Best-effort: an unreachable list page or run page is skipped, never
/// fatal. Individual fetch failures are logged and the scan continues.
pub async fn collect_from_html(
    client: &GithubClient,
    owner: &str,
    repo: &str,
) -> Vec<FailureEntry> {
    let mut runs_seen: Vec<String> = Vec::new();
    let mut entries = Vec::new();

    'pages: for page in 1..=MAX_LIST_PAGES {
        let list_url = format!("{}/{owner}/{repo}/actions?page={page}", client.html_base());
        let list_html = match client.fetch_html(&list_url).await {
            Ok(h) => h,
            Err(e) => {
                warn!(url = %list_url, error = %e, "actions list page fetch failed; skipping page");
                continue;
            }
        };

        for run_id in extract_run_ids(owner, repo, &list_html) {
            if runs_seen.contains(&run_id) {
                continue;
            }
            runs_seen.push(run_id.clone());

            let run_url = format!(
                "{}/{owner}/{repo}/actions/runs/{run_id}",
                client.html_base()
            );
            match client.fetch_html(&run_url).await {
                Ok(run_html) => {
                    for line in relevant_lines(&run_html) {
                        entries.push(FailureEntry {
                            run_link: run_url.clone(),
                            run_id: run_id.clone(),
                            created_at: String::new(),
                            workflow_name: String::new(),
                            job_name: String::new(),
                            category: classify_failure(&line),
                            signature: extract_signature(&line),
                            source: "html".to_string(),
                            raw_line: truncate_chars(&line, MAX_RAW_LINE_LEN),
                        });
                    }
                }
                Err(e) => {
                    debug!(url = %run_url, error = %e, "run page fetch failed; skipping run");
                }
            }

            if runs_seen.len() >= MAX_RUNS {
                break 'pages;
            }
        }
    }

    info!(
        runs = runs_seen.len(),
        entries = entries.len(),
        "html fallback scan finished"
    );
    entries
}

/// Extract run ids from run-detail links in a rendered Actions list page.
///
/// First-seen order is preserved and duplicates are dropped. Link formats
/// differ across GitHub UI versions; this matches the stable
/// `/{owner}/{repo}/actions/runs/<id>` form and is best-effort by design.
pub fn extract_run_ids(owner: &str, repo: &str, html: &str) -> Vec<String> {
    let pattern = format!(
        r"/{}/{}/actions/runs/(\d+)",
        regex::escape(owner),
        regex::escape(repo)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut ids: Vec<String> = Vec::new();
    for caps in re.captures_iter(html) {
        let id = caps[1].to_string();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Clean and keyword-filter every line of a rendered run page.
fn relevant_lines(html: &str) -> Vec<String> {
    html.lines()
        .filter_map(clean_line)
        .filter(|l| contains_keywords(l))
        .collect()
}

/// Strip markup from one raw page line: remove tags, collapse whitespace,
/// decode HTML entities. Returns `None` when nothing printable remains.
pub fn clean_line(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let stripped = tag_re().replace_all(raw, " ");
    let collapsed = whitespace_re().replace_all(&stripped, " ");
    let plain = decode_entities(collapsed.trim());
    if plain.is_empty() {
        None
    } else {
        Some(plain)
    }
}

/// Decode the HTML entities GitHub's UI emits: numeric forms plus the
/// common named ones. `&amp;` is handled last so it cannot re-introduce
/// decodable sequences.
pub fn decode_entities(text: &str) -> String {
    let numeric = numeric_entity_re().replace_all(text, |caps: &regex::Captures| {
        let code = match (caps.name("hex"), caps.name("dec")) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
