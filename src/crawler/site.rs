//! The crawl phase: sitemap in, page index out

use crate::config::RunSettings;
use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::parser::{extract_page, ContentExtractor};
use crate::crawler::probe::LinkProbe;
use crate::crawler::sitemap::parse_sitemap_locs;
use crate::output::IssueKind;
use crate::state::RunState;
use crate::CheckError;
use futures::stream::{self, StreamExt};
use std::time::Instant;

/// Builds the page index from the sitemap
///
/// Only sitemap-listed URLs inside the scope are fetched; links found on the
/// pages are never followed.
pub struct SiteCrawler<'a, F, P> {
    settings: &'a RunSettings,
    fetcher: &'a F,
    probe: &'a P,
    extractor: &'a dyn ContentExtractor,
}

impl<'a, F: PageFetcher, P: LinkProbe> SiteCrawler<'a, F, P> {
    pub fn new(
        settings: &'a RunSettings,
        fetcher: &'a F,
        probe: &'a P,
        extractor: &'a dyn ContentExtractor,
    ) -> Self {
        Self {
            settings,
            fetcher,
            probe,
            extractor,
        }
    }

    /// Fetches the sitemap and indexes every in-scope page into `state.index`
    ///
    /// # Crawl Flow
    ///
    /// 1. Fetch the sitemap; failure is fatal (`SitemapUnavailable`)
    /// 2. Keep `<loc>` entries inside the scope; none is fatal (`NoSitemapMatch`)
    /// 3. Fetch pages with bounded concurrency, consuming results in sitemap order
    ///    - fetch failure: `InternalSitemapUnreachable`, page skipped
    ///    - no title: `CannotProcessPage`, page dropped
    ///    - otherwise indexed under the sitemap URL
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The index is built (possibly with page-level issues recorded)
    /// * `Err(CheckError)` - A fatal sitemap condition; nothing was indexed
    pub async fn build(&self, state: &mut RunState) -> Result<(), CheckError> {
        let sitemap_url = &self.settings.sitemap_url;
        let scope_path = self.settings.scope.path();

        tracing::info!("Fetching sitemap {}", sitemap_url);
        let xml = self
            .probe
            .fetch_document(sitemap_url)
            .await
            .map_err(|reason| CheckError::SitemapUnavailable {
                url: sitemap_url.clone(),
                reason,
            })?;

        let candidates = parse_sitemap_locs(&xml, &scope_path);
        state.counters.links_in_sitemap = candidates.len() as u64;
        if candidates.is_empty() {
            return Err(CheckError::NoSitemapMatch { scope: scope_path });
        }

        tracing::info!(
            "Sitemap lists {} pages under {}, fetching",
            candidates.len(),
            scope_path
        );

        let start_time = Instant::now();
        let fetcher = self.fetcher;
        let mut fetches = stream::iter(candidates.iter())
            .map(|url| async move { (url, fetcher.fetch(url).await) })
            .buffered(self.settings.network.max_concurrent_pages);

        while let Some((url, result)) = fetches.next().await {
            state.trail.sitemap_url = Some(url.clone());
            state.counters.pages_retrieved += 1;

            match result {
                FetchResult::Success { markup } => {
                    match extract_page(self.extractor, &markup, url, self.settings) {
                        Ok(record) => {
                            let absolute = record.absolute_links.len() as u64;
                            if state.index.insert(record) {
                                state.counters.pages_indexed += 1;
                                state.counters.absolute_within_domain += absolute;
                            }
                        }
                        Err(e) => {
                            tracing::debug!("Cannot process {}: {}", url, e);
                            state
                                .sink
                                .report(IssueKind::CannotProcessPage, url, Some(e.to_string()));
                        }
                    }
                }
                FetchResult::Failed { reason } => {
                    tracing::debug!("Cannot fetch {}: {}", url, reason);
                    state
                        .sink
                        .report(IssueKind::InternalSitemapUnreachable, url, Some(reason));
                }
            }

            if state.counters.pages_retrieved % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = state.counters.pages_retrieved as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} of {} pages retrieved, {:.2} pages/sec",
                    state.counters.pages_retrieved,
                    candidates.len(),
                    rate
                );
            }
        }

        tracing::debug!("Building the page index took {:?}", start_time.elapsed());
        tracing::info!(
            "Indexed {} of {} sitemap pages",
            state.counters.pages_indexed,
            candidates.len()
        );

        Ok(())
    }
}
