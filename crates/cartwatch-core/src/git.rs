//! Git remote introspection for repository identity.

use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CartwatchError, Result};

/// GitHub-style remote URL, HTTPS or SSH form, requiring a `.git` suffix.
fn github_remote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"github\.com[:/](.+?)\.git$").expect("valid remote regex"))
}

/// Discover `(owner, repo)` from the `origin` remote of a git repository.
///
/// Runs `git remote get-url origin` in the given directory. Fails when there
/// is no origin remote or its URL is not a GitHub-style URL; callers treat
/// this as fatal.
pub fn origin_owner_repo(repo_dir: &Path) -> Result<(String, String)> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| CartwatchError::GitRemote(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CartwatchError::GitRemote(format!(
            "git remote get-url origin failed: {stderr}"
        )));
    }

    let remote = String::from_utf8_lossy(&output.stdout).trim().to_string();
    parse_github_remote(&remote)
        .ok_or_else(|| CartwatchError::GitRemote(format!("unexpected origin URL: {remote}")))
}

/// Parse `(owner, repo)` out of a GitHub remote URL.
pub fn parse_github_remote(remote: &str) -> Option<(String, String)> {
    let caps = github_remote_re().captures(remote)?;
    let full = caps.get(1)?.as_str();
    let (owner, repo) = full.split_once('/')?;
    Some((owner.to_string(), repo.to_string()))
}
