//! The validation phase
//!
//! Walks the page index in sitemap order and resolves every link of every
//! page to exactly one terminal outcome:
//! - Anchor links are classified (in-page, internal, external) and their
//!   fragment is looked up in the target page's anchor targets
//! - Normal links are probed once per run through the [`ExternalLinkCache`]
//!
//! Outcomes are tallied in the run's counters; failures become issues in the
//! run's [`ReportSink`].

mod anchor;
mod classify;
mod normal;

pub use classify::{classify_anchor, AnchorClass};

use crate::config::RunSettings;
use crate::crawler::{ContentExtractor, LinkProbe, PageFetcher};
use crate::output::{Counters, IssueKind, ReportSink};
use crate::state::{Breadcrumbs, ExternalLinkCache, PageIndex, PageRecord, RunState};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Mutable per-run outputs the validator writes to
pub(crate) struct Ledger<'r> {
    pub counters: &'r mut Counters,
    pub sink: &'r mut ReportSink,
    pub trail: &'r mut Breadcrumbs,
}

/// Anchor targets of a page outside the scope, or why it could not be fetched
type OutsidePage = Result<HashSet<String>, String>;

/// Resolves the links of indexed pages
pub struct LinkValidator<'a, F, P> {
    settings: &'a RunSettings,
    fetcher: &'a F,
    probe: &'a P,
    extractor: &'a dyn ContentExtractor,
    cache: &'a ExternalLinkCache,

    /// Pages outside the scope fetched for anchor checks, keyed by base URL
    outside_pages: HashMap<String, OutsidePage>,

    /// Where unindexed internal pages end up after redirects, keyed by base URL
    final_urls: HashMap<String, Option<String>>,
}

impl<'a, F: PageFetcher, P: LinkProbe> LinkValidator<'a, F, P> {
    pub fn new(
        settings: &'a RunSettings,
        fetcher: &'a F,
        probe: &'a P,
        extractor: &'a dyn ContentExtractor,
        cache: &'a ExternalLinkCache,
    ) -> Self {
        Self {
            settings,
            fetcher,
            probe,
            extractor,
            cache,
            outside_pages: HashMap::new(),
            final_urls: HashMap::new(),
        }
    }

    /// Validates every indexed page, in index order
    pub async fn validate(&mut self, state: &mut RunState) {
        let RunState {
            index,
            counters,
            sink,
            trail,
        } = state;
        let index: &PageIndex = index;
        let mut ledger = Ledger {
            counters,
            sink,
            trail,
        };

        let start_time = Instant::now();
        let total = index.len();
        for page in index.iter() {
            self.validate_page(page, index, &mut ledger).await;

            let checked = ledger.counters.pages_checked;
            if checked % 10 == 0 {
                tracing::info!("Progress: {} of {} pages checked", checked, total);
            }
        }

        tracing::debug!("Validating links took {:?}", start_time.elapsed());
        tracing::info!(
            "Checked {} pages, {} unique links probed",
            ledger.counters.pages_checked,
            self.cache.len()
        );
    }

    /// Validates one page: observations, anchor links, then normal links
    async fn validate_page(
        &mut self,
        page: &PageRecord,
        index: &PageIndex,
        ledger: &mut Ledger<'_>,
    ) {
        ledger.sink.begin_page(&page.url, &page.title);
        ledger.trail.page = Some(page.url.clone());

        if self.settings.report_absolute_links {
            for link in &page.absolute_links {
                ledger.sink.report(IssueKind::AbsoluteWithinDomain, link, None);
            }
        }

        let page_start = Instant::now();
        for link in &page.anchor_links {
            ledger.trail.link = Some(link.clone());
            self.check_anchor_link(page, link, index, ledger).await;
        }
        tracing::debug!(
            "Processing anchor links for {} took {:?}",
            page.url,
            page_start.elapsed()
        );

        let normal_start = Instant::now();
        self.check_normal_links(page, ledger).await;
        tracing::debug!(
            "Processing normal links for {} took {:?}",
            page.url,
            normal_start.elapsed()
        );

        ledger.counters.pages_checked += 1;
        ledger.sink.end_page();
    }
}
