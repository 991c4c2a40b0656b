//! Crawler module: everything that talks to the site
//!
//! This module contains:
//! - Page fetching and lightweight link probing (the network seams)
//! - Content extraction (title, links, anchor targets)
//! - Sitemap parsing and the crawl phase that builds the page index
//! - The coordinator that runs one complete check

mod coordinator;
mod fetcher;
mod parser;
mod probe;
mod site;
mod sitemap;

pub use coordinator::{Coordinator, RunOutcome, RunReport};
pub use fetcher::{build_http_client, fetch_page, FetchResult, HttpPageFetcher, PageFetcher};
pub use parser::{
    extract_page, extractor_for, ContentExtractor, DomExtractor, ExtractError, PatternExtractor,
    RawLinks,
};
pub use probe::{HttpLinkProbe, LinkProbe, ProbeOutcome};
pub use site::SiteCrawler;
pub use sitemap::parse_sitemap_locs;

use crate::config::RunSettings;

/// Runs a complete check against the live site
///
/// This is the main library entry point. It will:
/// 1. Build the HTTP client
/// 2. Fetch the sitemap and index every in-scope page
/// 3. Validate every anchor and normal link
/// 4. Return the report (issues, counters, exit status)
///
/// The run timeout from the settings applies; interruption handling is left
/// to the caller.
///
/// # Example
///
/// ```no_run
/// use anchor_watch::config::{Config, RunSettings};
/// use anchor_watch::crawler::check_site;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.target.domain = "docs.example.org".to_string();
/// let report = check_site(RunSettings::from_config(&config)?).await?;
/// std::process::exit(report.exit_code as i32);
/// # }
/// ```
pub async fn check_site(settings: RunSettings) -> crate::Result<RunReport> {
    let mut coordinator = Coordinator::from_settings(settings)?;
    let outcome = coordinator.execute().await;
    Ok(coordinator.finish(outcome))
}
