//! Issue log collection and printing
//!
//! The [`ReportSink`] keeps every issue in discovery order and echoes the
//! visible ones to stdout, grouped per page: the first visible issue of a page
//! is preceded by a header naming the page's title and URL.

use crate::output::issue::{IssueKind, IssueRecord, PageRef, Severity, SeverityPolicy};
use colored::Colorize;

/// Collects issues and decides the exit status of the run
#[derive(Debug)]
pub struct ReportSink {
    records: Vec<IssueRecord>,
    policy: SeverityPolicy,

    /// Hide warning and info issues from the printed log
    quiet: bool,

    /// Print visible issues to stdout as they arrive
    echo: bool,

    /// Page currently being validated
    current_page: Option<PageRef>,

    /// Whether the header of `current_page` has been printed yet
    header_printed: bool,

    /// Set when the run ended abnormally (interrupt, timeout, panic)
    aborted: bool,
}

impl ReportSink {
    /// Creates a sink that prints to stdout
    pub fn new(policy: SeverityPolicy, quiet: bool) -> Self {
        Self {
            records: Vec::new(),
            policy,
            quiet,
            echo: true,
            current_page: None,
            header_printed: false,
            aborted: false,
        }
    }

    /// Creates a sink that only records (used by tests and library callers)
    pub fn silent(policy: SeverityPolicy, quiet: bool) -> Self {
        Self {
            echo: false,
            ..Self::new(policy, quiet)
        }
    }

    /// Starts a new page; its header is printed lazily with the first visible issue
    pub fn begin_page(&mut self, url: &str, title: &str) {
        self.current_page = Some(PageRef {
            url: url.to_string(),
            title: title.to_string(),
        });
        self.header_printed = false;
    }

    /// Leaves the current page; subsequent issues are not tied to a page
    pub fn end_page(&mut self) {
        self.current_page = None;
        self.header_printed = false;
    }

    /// Records an issue for the current page (if any)
    ///
    /// The severity is taken from the policy. Returns the recorded severity.
    pub fn report(&mut self, kind: IssueKind, link: &str, detail: Option<String>) -> Severity {
        let severity = self.policy.severity_of(kind);
        let record = IssueRecord {
            page: self.current_page.clone(),
            link: link.to_string(),
            kind,
            severity,
            detail,
        };

        if self.is_visible(severity) {
            if self.echo {
                self.print_record(&record);
            }
            // Hidden issues never consume the header, so an error that follows
            // a suppressed warning on the same page still gets one.
            if record.page.is_some() {
                self.header_printed = true;
            }
        }

        self.records.push(record);
        severity
    }

    /// Records a run-level issue that is not tied to any page
    pub fn report_run_level(&mut self, kind: IssueKind, link: &str, detail: Option<String>) -> Severity {
        let page = self.current_page.take();
        let printed = self.header_printed;
        let severity = self.report(kind, link, detail);
        self.current_page = page;
        self.header_printed = printed;
        severity
    }

    /// Returns true if issues of this severity are printed
    pub fn is_visible(&self, severity: Severity) -> bool {
        !self.quiet || severity == Severity::Error
    }

    /// Marks the run as ended abnormally; the exit status becomes a failure
    pub fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    /// All issues in discovery order
    pub fn issues(&self) -> &[IssueRecord] {
        &self.records
    }

    /// Issues of one kind, in discovery order
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &IssueRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Number of issues with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.records.iter().filter(|r| r.severity == severity).count()
    }

    /// Returns true if any error-class issue was recorded
    pub fn has_errors(&self) -> bool {
        self.records.iter().any(IssueRecord::is_error)
    }

    /// Process exit status: 0 on success, 1 on errors or an aborted run
    pub fn exit_code(&self) -> u8 {
        if self.aborted || self.has_errors() {
            1
        } else {
            0
        }
    }

    fn print_record(&self, record: &IssueRecord) {
        if let Some(page) = &record.page {
            if !self.header_printed {
                println!("Issues in {} ({})", page.title.bold(), page.url);
            }
        }
        println!("{}", format_issue(record));
    }
}

/// Formats one issue line, coloured by severity
pub fn format_issue(record: &IssueRecord) -> String {
    let headline = match record.kind {
        IssueKind::NormalLinkUnreachable | IssueKind::NormalLinkUnresolved => format!(
            "{} (HTTP code {}):",
            record.kind.headline(),
            record.detail.as_deref().unwrap_or("unknown")
        ),
        _ => format!("{}:", record.kind.headline()),
    };

    let headline = match record.severity {
        Severity::Error => headline.red().bold(),
        Severity::Warning => headline.yellow().bold(),
        Severity::Info => headline.cyan().bold(),
    };

    match (&record.detail, record.kind) {
        (_, IssueKind::NormalLinkUnreachable | IssueKind::NormalLinkUnresolved) | (None, _) => {
            format!("{} {}", headline, record.link)
        }
        (Some(detail), _) => format!("{} {} ({})", headline, record.link, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sink(quiet: bool) -> ReportSink {
        ReportSink::silent(SeverityPolicy::default(), quiet)
    }

    #[test]
    fn test_records_in_discovery_order() {
        let mut sink = sink(false);
        sink.begin_page("https://docs.example.org/a", "A");
        sink.report(IssueKind::InPageAnchorMissing, "#one", None);
        sink.report(IssueKind::ExternalAnchorNotFound, "https://other.org/x#y", None);
        sink.end_page();

        let kinds: Vec<_> = sink.issues().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![IssueKind::InPageAnchorMissing, IssueKind::ExternalAnchorNotFound]
        );
        assert_eq!(sink.issues()[0].page.as_ref().unwrap().title, "A");
    }

    #[test]
    fn test_exit_code_from_errors_only() {
        let mut sink = sink(false);
        sink.report(IssueKind::NormalLinkUnresolved, "https://x.org", None);
        sink.report(IssueKind::CannotCheckExternal, "https://x.org/#a", None);
        assert_eq!(sink.exit_code(), 0);

        sink.report(IssueKind::NormalLinkUnreachable, "https://x.org/404", Some("404".into()));
        assert_eq!(sink.exit_code(), 1);
    }

    #[test]
    fn test_quiet_mode_still_records_warnings() {
        let mut sink = sink(true);
        sink.report(IssueKind::ExternalAnchorNotFound, "https://other.org/x#y", None);
        assert_eq!(sink.issues().len(), 1);
        assert!(!sink.is_visible(Severity::Warning));
        assert!(sink.is_visible(Severity::Error));
        assert_eq!(sink.exit_code(), 0);
    }

    #[test]
    fn test_hidden_warning_does_not_consume_header() {
        let mut sink = sink(true);
        sink.begin_page("https://docs.example.org/a", "A");
        sink.report(IssueKind::ExternalAnchorNotFound, "https://other.org/x#y", None);
        assert!(!sink.header_printed);

        sink.report(IssueKind::InPageAnchorMissing, "#gone", None);
        assert!(sink.header_printed);
    }

    #[test]
    fn test_header_reset_per_page() {
        let mut sink = sink(false);
        sink.begin_page("https://docs.example.org/a", "A");
        sink.report(IssueKind::InPageAnchorMissing, "#gone", None);
        assert!(sink.header_printed);

        sink.begin_page("https://docs.example.org/b", "B");
        assert!(!sink.header_printed);
    }

    #[test]
    fn test_run_level_issue_has_no_page() {
        let mut sink = sink(false);
        sink.begin_page("https://docs.example.org/a", "A");
        sink.report_run_level(IssueKind::SitemapUnavailable, "https://docs.example.org/sitemap.xml", None);

        assert!(sink.issues()[0].page.is_none());
        assert_eq!(sink.current_page.as_ref().unwrap().url, "https://docs.example.org/a");
    }

    #[test]
    fn test_policy_applied() {
        let mut overrides = HashMap::new();
        overrides.insert(IssueKind::OutsideLinkUnreachable, Severity::Error);
        let mut sink = ReportSink::silent(SeverityPolicy::new(overrides), false);

        let severity = sink.report(IssueKind::OutsideLinkUnreachable, "https://gone.org/#x", None);
        assert_eq!(severity, Severity::Error);
        assert_eq!(sink.exit_code(), 1);
    }

    #[test]
    fn test_aborted_run_fails() {
        let mut sink = sink(false);
        sink.mark_aborted();
        assert_eq!(sink.exit_code(), 1);
    }

    #[test]
    fn test_format_issue_mentions_link_and_code() {
        let record = IssueRecord {
            page: None,
            link: "https://docs.example.org/missing-page".to_string(),
            kind: IssueKind::NormalLinkUnreachable,
            severity: Severity::Error,
            detail: Some("404".to_string()),
        };
        let line = format_issue(&record);
        assert!(line.contains("https://docs.example.org/missing-page"));
        assert!(line.contains("404"));
    }
}
