//! Mutable state of one run
//!
//! Everything here is written by the crawl and validation phases and read
//! back by the coordinator when it builds the final report, also when the run
//! was cut short.

use crate::output::{Counters, ReportSink};
use crate::state::PageIndex;

/// The last things the run touched, printed when a run is cut short
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumbs {
    pub sitemap_url: Option<String>,
    pub page: Option<String>,
    pub link: Option<String>,
}

impl Breadcrumbs {
    pub fn is_empty(&self) -> bool {
        self.sitemap_url.is_none() && self.page.is_none() && self.link.is_none()
    }
}

/// Index, tallies, issue log and breadcrumbs of one invocation
#[derive(Debug)]
pub struct RunState {
    pub index: PageIndex,
    pub counters: Counters,
    pub sink: ReportSink,
    pub trail: Breadcrumbs,
}

impl RunState {
    pub fn new(sink: ReportSink) -> Self {
        Self {
            index: PageIndex::new(),
            counters: Counters::default(),
            sink,
            trail: Breadcrumbs::default(),
        }
    }
}
