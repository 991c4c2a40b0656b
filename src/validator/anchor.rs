//! Anchor-link resolution

use crate::crawler::{FetchResult, LinkProbe, PageFetcher};
use crate::output::IssueKind;
use crate::state::{PageIndex, PageRecord};
use crate::validator::classify::{classify_anchor, AnchorClass};
use crate::validator::{Ledger, LinkValidator, OutsidePage};

impl<F: PageFetcher, P: LinkProbe> LinkValidator<'_, F, P> {
    /// Resolves one anchor link of `page` to a terminal outcome
    pub(crate) async fn check_anchor_link(
        &mut self,
        page: &PageRecord,
        link: &str,
        index: &PageIndex,
        ledger: &mut Ledger<'_>,
    ) {
        match classify_anchor(link, &self.settings.scope) {
            AnchorClass::InPage { fragment } => {
                if page.has_target(fragment) {
                    ledger.counters.ok_in_page += 1;
                } else {
                    ledger.counters.nok_in_page += 1;
                    ledger.sink.report(IssueKind::InPageAnchorMissing, link, None);
                }
            }
            AnchorClass::Internal { base, fragment } => {
                self.check_internal(link, base, fragment, index, ledger).await;
            }
            AnchorClass::External { base, fragment } => {
                self.check_external(link, base, fragment, ledger).await;
            }
        }
    }

    /// Internal anchors: look the page up in the index, following redirects
    /// for pages the sitemap does not list under this URL
    async fn check_internal(
        &mut self,
        link: &str,
        base: &str,
        fragment: &str,
        index: &PageIndex,
        ledger: &mut Ledger<'_>,
    ) {
        if let Some(target) = lookup(index, base) {
            check_fragment(target, fragment, link, None, ledger);
            return;
        }

        let final_url = self.final_url(base).await;
        if let Some(target) = final_url.as_deref().and_then(|url| lookup(index, url)) {
            tracing::debug!("{} redirects to indexed page {}", base, target.url);
            let detail = format!("redirected to {}", target.url);
            check_fragment(target, fragment, link, Some(detail), ledger);
            return;
        }

        ledger.counters.not_in_sitemap += 1;
        let detail = match final_url {
            Some(url) if url != base => Some(format!("lands on {}, which is not in the sitemap", url)),
            Some(_) => Some("not in the sitemap".to_string()),
            None => Some("no response".to_string()),
        };
        ledger.sink.report(IssueKind::UnreachableInternal, link, detail);
    }

    /// External anchors: fetch the outside page once per run and look for the
    /// fragment among its anchor targets
    async fn check_external(
        &mut self,
        link: &str,
        base: &str,
        fragment: &str,
        ledger: &mut Ledger<'_>,
    ) {
        if self.settings.skip_external {
            ledger.counters.cannot_check_external += 1;
            ledger.sink.report(IssueKind::CannotCheckExternal, link, None);
            return;
        }

        match self.outside_page(base).await {
            Ok(targets) if targets.contains(fragment) => {
                ledger.counters.ok_anchor_outside += 1;
            }
            Ok(_) => {
                ledger.counters.nok_anchor_outside += 1;
                ledger.sink.report(IssueKind::ExternalAnchorNotFound, link, None);
            }
            Err(reason) => {
                ledger.counters.outside_unreachable += 1;
                let reason = reason.clone();
                ledger
                    .sink
                    .report(IssueKind::OutsideLinkUnreachable, link, Some(reason));
            }
        }
    }

    /// Final URL of an internal page after redirects, probed on first use
    async fn final_url(&mut self, base: &str) -> Option<String> {
        if let Some(known) = self.final_urls.get(base) {
            return known.clone();
        }

        let resolved = self.probe.resolve_redirects(base).await;
        self.final_urls.insert(base.to_string(), resolved.clone());
        resolved
    }

    /// Anchor targets of an outside page, fetched on first use
    async fn outside_page(&mut self, base: &str) -> &OutsidePage {
        if !self.outside_pages.contains_key(base) {
            tracing::debug!("Fetching outside page {}", base);
            let page = match self.fetcher.fetch(base).await {
                FetchResult::Success { markup } => Ok(self.extractor.anchor_targets(&markup)),
                FetchResult::Failed { reason } => Err(reason),
            };
            self.outside_pages.insert(base.to_string(), page);
        }

        &self.outside_pages[base]
    }
}

/// Finds an indexed page by URL, tolerating a trailing-slash difference
fn lookup<'i>(index: &'i PageIndex, url: &str) -> Option<&'i PageRecord> {
    index.get(url).or_else(|| match url.strip_suffix('/') {
        Some(trimmed) => index.get(trimmed),
        None => index.get(&format!("{}/", url)),
    })
}

fn check_fragment(
    target: &PageRecord,
    fragment: &str,
    link: &str,
    detail: Option<String>,
    ledger: &mut Ledger<'_>,
) {
    if target.has_target(fragment) {
        ledger.counters.ok_internal += 1;
    } else {
        ledger.counters.nok_internal += 1;
        ledger.sink.report(IssueKind::InternalAnchorMissing, link, detail);
    }
}
