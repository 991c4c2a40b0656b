//! Run-wide memo of normal-link probe outcomes
//!
//! A link checked on one page is never probed again on another. Each URL gets
//! its own `OnceCell`, so concurrent lookups of a URL that is still being
//! probed wait for that probe instead of starting a second one.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Whether a link resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    Ok,
    Nok,
}

/// Cached result of probing one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkOutcome {
    pub status: LinkStatus,

    /// HTTP status code; None when the probe failed without a response
    pub code: Option<u16>,
}

impl LinkOutcome {
    pub fn ok(code: u16) -> Self {
        Self {
            status: LinkStatus::Ok,
            code: Some(code),
        }
    }

    pub fn nok(code: Option<u16>) -> Self {
        Self {
            status: LinkStatus::Nok,
            code,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == LinkStatus::Ok
    }
}

/// Write-once cache keyed by absolute link URL
#[derive(Debug, Default)]
pub struct ExternalLinkCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<LinkOutcome>>>>,
    probes: AtomicUsize,
}

impl ExternalLinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached outcome, if the link has been resolved
    pub fn get(&self, url: &str) -> Option<LinkOutcome> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(url).and_then(|cell| cell.get().copied())
    }

    /// Returns the cached outcome or runs `probe` to produce it
    ///
    /// The first resolution wins. Concurrent callers for the same URL share
    /// one probe; the lock is never held across the probe itself.
    pub async fn get_or_probe<F, Fut>(&self, url: &str, probe: F) -> LinkOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LinkOutcome>,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(entries.entry(url.to_string()).or_default())
        };

        *cell
            .get_or_init(|| async {
                self.probes.fetch_add(1, Ordering::Relaxed);
                probe().await
            })
            .await
    }

    /// Number of links with a resolved outcome
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of probes actually executed
    pub fn probes_executed(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}
