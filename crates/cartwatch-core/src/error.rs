//! Error taxonomy for cartwatch.
//!
//! Collection errors fall into three tiers: fatal configuration errors
//! (no usable `origin` remote), path-level provider errors (the structured
//! API is unreachable, consumed by the HTML fallback), and entry-level
//! provider errors (a single annotation or page fetch fails, logged and
//! skipped inside the collector loops).

/// Errors produced while collecting CI data or writing the report.
#[derive(Debug, thiserror::Error)]
pub enum CartwatchError {
    #[error("git remote error: {0}")]
    GitRemote(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub returned status {status} for {url}")]
    Api { status: u16, url: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cartwatch operations.
pub type Result<T> = std::result::Result<T, CartwatchError>;
