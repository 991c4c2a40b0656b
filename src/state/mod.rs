//! State built up during a run
//!
//! # Components
//!
//! - `PageIndex`: Extracted records of every indexed sitemap page
//! - `ExternalLinkCache`: Write-once memo of normal-link probe outcomes
//! - `RunState`: Index, counters, issue log and breadcrumbs of one invocation

mod cache;
mod index;
mod run;

// Re-export main types
pub use cache::{ExternalLinkCache, LinkOutcome, LinkStatus};
pub use index::{PageIndex, PageRecord};
pub use run::{Breadcrumbs, RunState};
