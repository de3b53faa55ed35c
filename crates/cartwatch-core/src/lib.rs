//! Cartwatch core library.
//!
//! Scans a GitHub repository's recent Actions history for failures related to
//! cart/checkout UI flows, classifies each matching failure into a small set
//! of root-cause categories, deduplicates recurring failures into signatures,
//! and renders a Markdown summary report.
//!
//! Collection is two-tier: the structured Actions API is tried first, and a
//! best-effort HTML scraper takes over when the API is unreachable or
//! rate-limited.

pub mod aggregate;
pub mod classify;
pub mod collect;
pub mod error;
pub mod git;
pub mod github;
pub mod html;
pub mod keywords;
pub mod model;
pub mod report;
pub mod signature;
pub mod telemetry;

pub use aggregate::{aggregate, Aggregate};
pub use classify::{classify_failure, Category};
pub use collect::collect_entries;
pub use error::{CartwatchError, Result};
pub use git::{origin_owner_repo, parse_github_remote};
pub use github::{collect_from_api, GithubClient};
pub use html::collect_from_html;
pub use keywords::{contains_keywords, KEYWORDS};
pub use model::FailureEntry;
pub use report::{render_markdown, write_report, REPORT_RELATIVE_PATH};
pub use signature::extract_signature;
pub use telemetry::init_tracing;

/// Cartwatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
