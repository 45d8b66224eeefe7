//! CLI for Notion Commit Sync.
//!
//! Links a merged commit to a Notion page: finds the pull request that
//! introduced the commit, pulls the first Notion URL out of its description
//! and appends the configured value to the referenced page property.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use notion_commit_sync::{RunMode, Runner, RunnerConfig, RunnerError, SyncConfig, SyncReport};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Notion Commit Sync - Update a Notion page property from the pull request behind a commit.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to read configuration from.
    #[arg(long, value_enum, default_value_t = Mode::Actions, env = "SYNC_MODE")]
    mode: Mode,

    /// Preview the Notion update without writing.
    #[arg(long)]
    dry_run: bool,

    /// Bound on each outbound network call, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

/// Configuration source, mirrored onto [`RunMode`].
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// GitHub Actions inputs (`INPUT_*`, `GITHUB_SHA`, `GITHUB_REPOSITORY`).
    Actions,
    /// Plain environment variables for local runs.
    Local,
}

impl From<Mode> for RunMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Actions => RunMode::Actions,
            Mode::Local => RunMode::Local,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();

    // Assemble the configuration before touching any API
    let config = match SyncConfig::load(args.mode.into()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    // Run the main logic
    match run(config, &args).await {
        Ok(report) => {
            print_summary(&report);
            ExitCode::from(0)
        }
        Err(e) => {
            error!(error = %e, "Sync failed");
            ExitCode::from(1)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        // Use compact formatting without module target paths for cleaner output
        .with(fmt::layer().compact().with_target(false))
        // Allow runtime log filtering via RUST_LOG env var (e.g., RUST_LOG=debug)
        // Falls back to "info" level if RUST_LOG is not set or invalid
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        // Register as the global default subscriber
        .init();
}

/// Main execution logic.
async fn run(config: SyncConfig, args: &Args) -> Result<SyncReport, RunnerError> {
    let runner_config = RunnerConfig::new(config, args.dry_run)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let runner = Runner::new(runner_config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(report: &SyncReport) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if report.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Pull request: {}", report.pull_request_url);
    println!("  Notion page: {}", report.page_id);
    println!(
        "  {}: {} ({})",
        report.property_name, report.written_value, report.property_kind
    );
}
