//! Cartwatch - CI cart/checkout failure pattern reporter.
//!
//! Scans recent GitHub Actions history for the repository in the current
//! directory, classifies cart/checkout-related failures, deduplicates them
//! into recurring signatures, and writes a Markdown report under
//! `docs/reports/`. Prints the report path on success.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use cartwatch_core::{
    aggregate, collect_entries, init_tracing, origin_owner_repo, render_markdown, write_report,
    GithubClient, REPORT_RELATIVE_PATH,
};

#[derive(Parser)]
#[command(name = "cartwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Report recurring cart/checkout CI failures", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Repository directory to inspect (must have a GitHub `origin` remote)
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,

    /// Output path for the Markdown report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Lookback window in days
    #[arg(long, default_value_t = 7)]
    days: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let (owner, repo) = origin_owner_repo(&cli.repo_dir)
        .context("Unable to determine the GitHub repository from the origin remote")?;
    info!(owner = %owner, repo = %repo, days = cli.days, "scanning recent workflow runs");

    let now = chrono::Utc::now();
    let client = GithubClient::new();
    let entries = collect_entries(&client, &owner, &repo, now, cli.days).await;

    let agg = aggregate(&entries);
    let md = render_markdown(&owner, &repo, now, &agg);

    let out_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(REPORT_RELATIVE_PATH));
    write_report(&out_path, &md).with_context(|| format!("write {}", out_path.display()))?;

    println!("{}", out_path.display());
    Ok(())
}
