//! Anchor-Watch main entry point
//!
//! This is the command-line interface for the Anchor-Watch link checker.

use anchor_watch::config::{load_config, Config, ExtractorKind, RunSettings};
use anchor_watch::crawler::{Coordinator, RunOutcome, RunReport};
use anchor_watch::output::{print_statistics, IssueKind};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Anchor-Watch: link and anchor integrity checker
///
/// Anchor-Watch reads a documentation portal's sitemap, indexes every page in
/// scope and verifies that anchor links point at existing element IDs and that
/// plain links are reachable. The exit status is 1 when any error is found.
#[derive(Parser, Debug)]
#[command(name = "anchor-watch")]
#[command(version = "1.0.0")]
#[command(about = "Link and anchor integrity checker for documentation portals", long_about = None)]
struct Cli {
    /// Domain to check, e.g. docs.example.org (https:// is assumed)
    #[arg(short, long)]
    domain: String,

    /// Restrict the check to a folder of the domain, e.g. /guides
    #[arg(short, long, default_value = "")]
    folder: String,

    /// Sitemap location, if not <domain>/<folder>/sitemap.xml
    #[arg(short, long, value_name = "URL")]
    sitemap: Option<String>,

    /// Do not fetch pages outside the portal to check their anchors
    #[arg(short = 'x', long)]
    no_external: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to TOML configuration file (denylists, severities, network limits)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop the run after this many seconds
    #[arg(long, value_name = "SECS")]
    run_timeout: Option<u64>,

    /// Validate the configuration and show what would be checked
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    apply_cli(&mut config, &cli);

    let settings = RunSettings::from_config(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&settings);
        return Ok(ExitCode::SUCCESS);
    }

    let report = handle_check(settings).await?;
    Ok(ExitCode::from(report.exit_code))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("anchor_watch=info,warn"),
            1 => EnvFilter::new("anchor_watch=debug,info"),
            2 => EnvFilter::new("anchor_watch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line values take precedence over the configuration file
fn apply_cli(config: &mut Config, cli: &Cli) {
    config.target.domain = cli.domain.clone();
    config.target.folder = cli.folder.clone();
    if let Some(sitemap) = &cli.sitemap {
        config.target.sitemap = Some(sitemap.clone());
    }
    if cli.no_external {
        config.checks.skip_external = true;
    }
    if cli.quiet {
        config.checks.quiet = true;
    }
    if let Some(secs) = cli.run_timeout {
        config.network.run_timeout = Some(secs);
    }
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(settings: &RunSettings) {
    println!("=== Anchor-Watch Dry Run ===\n");

    println!("Target:");
    println!("  Scope: {}", settings.scope.path());
    println!("  Sitemap: {}", settings.sitemap_url);

    println!("\nChecks:");
    println!("  External anchors: {}", if settings.skip_external { "skipped" } else { "checked" });
    println!("  Report absolute links: {}", settings.report_absolute_links);
    println!(
        "  Extractor: {}",
        match settings.extractor {
            ExtractorKind::Pattern => "pattern",
            ExtractorKind::Dom => "dom",
        }
    );

    println!("\nNetwork:");
    println!("  User agent: {}", settings.network.user_agent);
    println!("  Page timeout: {}s", settings.network.page_timeout);
    println!("  Probe timeout: {}s", settings.network.probe_timeout);
    println!("  Sitemap timeout: {}s", settings.network.sitemap_timeout);
    match settings.network.run_timeout {
        Some(secs) => println!("  Run timeout: {}s", secs),
        None => println!("  Run timeout: none"),
    }
    println!("  Max concurrent pages: {}", settings.network.max_concurrent_pages);
    println!("  Max concurrent probes: {}", settings.network.max_concurrent_probes);

    println!("\nDenylists:");
    println!("  Anchor link patterns: {}", settings.anchor_denylist.len());
    println!("  Normal link patterns: {}", settings.normal_denylist.len());

    println!("\nSeverities:");
    for kind in IssueKind::ALL {
        println!("  {}: {}", kind, settings.severity.severity_of(kind));
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main check operation
async fn handle_check(settings: RunSettings) -> anyhow::Result<RunReport> {
    let mut coordinator =
        Coordinator::from_settings(settings).context("Failed to build HTTP client")?;

    let outcome = tokio::select! {
        outcome = coordinator.execute() => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, printing partial results");
            RunOutcome::Interrupted
        }
    };

    let report = coordinator.finish(outcome);
    print_statistics(&report);

    if report.exit_code == 0 {
        tracing::info!("No errors found");
    } else {
        tracing::error!("Check failed with {} errors", report.errors);
    }

    Ok(report)
}
