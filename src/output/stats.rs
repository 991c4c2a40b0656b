//! Run counters and the final statistics summary
//!
//! This module provides the tallies the crawler and validator increment while
//! they work, and the printout shown at the end of every run.

use crate::crawler::RunReport;
use colored::Colorize;

/// Flat set of named tallies, incremented once per decision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    // ===== Crawl phase =====
    /// Sitemap entries that matched the scope
    pub links_in_sitemap: u64,

    /// Sitemap entries a fetch was attempted for
    pub pages_retrieved: u64,

    /// Pages that made it into the index
    pub pages_indexed: u64,

    /// Pages whose links were validated
    pub pages_checked: u64,

    /// Anchor links authored as absolute URLs inside the domain
    pub absolute_within_domain: u64,

    // ===== Anchor links =====
    pub ok_in_page: u64,
    pub nok_in_page: u64,
    pub ok_internal: u64,
    pub nok_internal: u64,

    /// Internal anchor links whose target page is not indexed
    pub not_in_sitemap: u64,

    pub ok_anchor_outside: u64,
    pub nok_anchor_outside: u64,

    /// Outside pages that could not be fetched
    pub outside_unreachable: u64,

    /// External anchor links left unchecked because external checks are off
    pub cannot_check_external: u64,

    // ===== Normal links =====
    pub ok_normal_links: u64,

    /// Normal link occurrences whose outcome is NOK
    pub unreachable: u64,
}

impl Counters {
    /// Sum of all terminal anchor-link outcomes
    pub fn anchor_links_resolved(&self) -> u64 {
        self.ok_in_page
            + self.nok_in_page
            + self.ok_internal
            + self.nok_internal
            + self.not_in_sitemap
            + self.ok_anchor_outside
            + self.nok_anchor_outside
            + self.outside_unreachable
            + self.cannot_check_external
    }

    /// Sum of all terminal normal-link outcomes
    pub fn normal_links_resolved(&self) -> u64 {
        self.ok_normal_links + self.unreachable
    }
}

/// Prints the statistics summary to stdout
pub fn print_statistics(report: &RunReport) {
    let c = &report.counters;

    println!("\n{}", "===== STATS =====".bold());
    println!("Run started: {}", report.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Total URLs in sitemap: {}", c.links_in_sitemap);
    println!("Total pages in the index: {}", c.pages_indexed);
    println!("Total pages checked: {}", c.pages_checked);
    println!("Anchor links:");
    println!("\tOK - in-page: {}", c.ok_in_page);
    println!("\tOK - internal: {}", c.ok_internal);
    println!("\tNOK - in-page: {}", c.nok_in_page);
    println!("\tNOK - internal: {}", c.nok_internal);
    println!("\tOK outside portal: {}", c.ok_anchor_outside);
    println!("\tNOK outside portal: {}", c.nok_anchor_outside);
    println!("\tUnreachable outside portal: {}", c.outside_unreachable);
    println!("\tNot checked (external checks off): {}", c.cannot_check_external);
    println!(
        "OK - normal links: {} ({} unique probed)",
        c.ok_normal_links, report.unique_links
    );
    println!("Unreachable links: {}", c.unreachable);
    println!("Absolute URLs within domain: {}", c.absolute_within_domain);
    println!("Pages not in sitemap: {}", c.not_in_sitemap);
    println!(
        "Issues: {} errors, {} warnings, {} info",
        report.errors, report.warnings, report.infos
    );
    println!(
        "\nExecution time: {} sec. ({})",
        report.elapsed.as_secs(),
        report.outcome
    );

    if !report.outcome.is_completed() && !report.trail.is_empty() {
        println!("{}", "Stopped while working on:".yellow().bold());
        if let Some(url) = &report.trail.sitemap_url {
            println!("\tLast sitemap URL: {}", url);
        }
        if let Some(page) = &report.trail.page {
            println!("\tLast page: {}", page);
        }
        if let Some(link) = &report.trail.link {
            println!("\tLast link: {}", link);
        }
    }
}
