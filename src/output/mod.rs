//! Output module for issues, the issue log and run statistics
//!
//! This module handles:
//! - The issue taxonomy and severity policy
//! - Collecting and printing issues grouped per page
//! - Counters and the final statistics summary

mod issue;
mod sink;
pub mod stats;

pub use issue::{IssueKind, IssueRecord, PageRef, Severity, SeverityPolicy};
pub use sink::{format_issue, ReportSink};
pub use stats::{print_statistics, Counters};
