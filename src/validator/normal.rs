//! Normal-link resolution

use crate::crawler::{LinkProbe, PageFetcher, ProbeOutcome};
use crate::output::IssueKind;
use crate::state::{LinkOutcome, PageRecord};
use crate::validator::{Ledger, LinkValidator};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;

impl<F: PageFetcher, P: LinkProbe> LinkValidator<'_, F, P> {
    /// Resolves every normal link of `page`
    ///
    /// The page's distinct uncached links are probed concurrently first; the
    /// ordered walk afterwards only reads the cache, so issues keep the order
    /// the links appear in.
    pub(crate) async fn check_normal_links(&self, page: &PageRecord, ledger: &mut Ledger<'_>) {
        let denylist = &self.settings.normal_denylist;

        let mut distinct = HashSet::new();
        let pending: Vec<&str> = page
            .normal_links
            .iter()
            .map(String::as_str)
            .filter(|link| !denylist.matches(link))
            .filter(|link| distinct.insert(*link))
            .filter(|link| self.cache.get(link).is_none())
            .collect();

        if !pending.is_empty() {
            tracing::debug!("Probing {} new links from {}", pending.len(), page.url);
            let this = self;
            stream::iter(pending)
                .for_each_concurrent(self.settings.network.max_concurrent_probes, |link| async move {
                    this.link_outcome(link).await;
                })
                .await;
        }

        let mut reported = HashSet::new();
        for link in &page.normal_links {
            ledger.trail.link = Some(link.clone());

            if denylist.matches(link) {
                tracing::debug!("Skipping denylisted link {}", link);
                continue;
            }

            let outcome = self.link_outcome(link).await;
            if outcome.is_ok() {
                ledger.counters.ok_normal_links += 1;
                continue;
            }

            ledger.counters.unreachable += 1;
            if !reported.insert(link.as_str()) {
                continue;
            }

            match outcome.code {
                Some(code) => {
                    ledger
                        .sink
                        .report(IssueKind::NormalLinkUnreachable, link, Some(code.to_string()))
                }
                None => ledger.sink.report(IssueKind::NormalLinkUnresolved, link, None),
            };
        }
    }

    /// Cached outcome of a link, probing it on a miss
    async fn link_outcome(&self, link: &str) -> LinkOutcome {
        self.cache
            .get_or_probe(link, || async {
                match self.probe.status(link).await {
                    ProbeOutcome::Status(code) if code < 400 => LinkOutcome::ok(code),
                    ProbeOutcome::Status(code) => LinkOutcome::nok(Some(code)),
                    ProbeOutcome::Failed(reason) => {
                        tracing::debug!("No response from {}: {}", link, reason);
                        LinkOutcome::nok(None)
                    }
                }
            })
            .await
    }
}
