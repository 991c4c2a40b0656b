//! Issue taxonomy, severities and issue records
//!
//! Every problem the checker finds is described by an [`IssueRecord`]. The
//! record's [`IssueKind`] decides its default [`Severity`]; the configured
//! [`SeverityPolicy`] may override the severity of non-fatal kinds.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// How much an issue matters for the outcome of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; never affects the exit status
    Info,
    /// Worth a look; never affects the exit status
    Warning,
    /// Fails the run (exit status 1)
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every kind of issue the checker can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    // ===== Run-level (fatal) =====
    /// The sitemap could not be fetched or answered with an error status
    SitemapUnavailable,

    /// No sitemap entry starts with the scope path
    NoSitemapMatch,

    // ===== Crawl phase =====
    /// A URL listed in the sitemap could not be fetched
    InternalSitemapUnreachable,

    /// A fetched page could not be processed (no title found)
    CannotProcessPage,

    // ===== Anchor links =====
    /// `#id` link whose id is missing on the same page
    InPageAnchorMissing,

    /// Cross-page link whose fragment is missing on the indexed target page
    InternalAnchorMissing,

    /// Cross-page link whose target is not in the index, even after redirects
    UnreachableInternal,

    /// Outside page with an anchor could not be fetched
    OutsideLinkUnreachable,

    /// Outside page was fetched but the fragment is not present
    ExternalAnchorNotFound,

    /// External checks are disabled, the anchor was not verified
    CannotCheckExternal,

    /// Anchor link inside the domain authored as an absolute URL
    AbsoluteWithinDomain,

    // ===== Normal links =====
    /// Probe answered with an HTTP status >= 400
    NormalLinkUnreachable,

    /// Probe failed without a status (timeout, DNS, refused, blocked)
    NormalLinkUnresolved,
}

impl IssueKind {
    /// All kinds, in taxonomy order
    pub const ALL: [IssueKind; 13] = [
        Self::SitemapUnavailable,
        Self::NoSitemapMatch,
        Self::InternalSitemapUnreachable,
        Self::CannotProcessPage,
        Self::InPageAnchorMissing,
        Self::InternalAnchorMissing,
        Self::UnreachableInternal,
        Self::OutsideLinkUnreachable,
        Self::ExternalAnchorNotFound,
        Self::CannotCheckExternal,
        Self::AbsoluteWithinDomain,
        Self::NormalLinkUnreachable,
        Self::NormalLinkUnresolved,
    ];

    /// Severity used when the configuration does not override it
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::SitemapUnavailable
            | Self::NoSitemapMatch
            | Self::InternalSitemapUnreachable
            | Self::CannotProcessPage
            | Self::InPageAnchorMissing
            | Self::InternalAnchorMissing
            | Self::UnreachableInternal
            | Self::NormalLinkUnreachable => Severity::Error,
            Self::NormalLinkUnresolved
            | Self::ExternalAnchorNotFound
            | Self::OutsideLinkUnreachable => Severity::Warning,
            Self::CannotCheckExternal | Self::AbsoluteWithinDomain => Severity::Info,
        }
    }

    /// Returns true if this kind terminates the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SitemapUnavailable | Self::NoSitemapMatch)
    }

    /// Kebab-case name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SitemapUnavailable => "sitemap-unavailable",
            Self::NoSitemapMatch => "no-sitemap-match",
            Self::InternalSitemapUnreachable => "internal-sitemap-unreachable",
            Self::CannotProcessPage => "cannot-process-page",
            Self::InPageAnchorMissing => "in-page-anchor-missing",
            Self::InternalAnchorMissing => "internal-anchor-missing",
            Self::UnreachableInternal => "unreachable-internal",
            Self::OutsideLinkUnreachable => "outside-link-unreachable",
            Self::ExternalAnchorNotFound => "external-anchor-not-found",
            Self::CannotCheckExternal => "cannot-check-external",
            Self::AbsoluteWithinDomain => "absolute-within-domain",
            Self::NormalLinkUnreachable => "normal-link-unreachable",
            Self::NormalLinkUnresolved => "normal-link-unresolved",
        }
    }

    /// Parses a kind from its kebab-case name
    ///
    /// Returns None if the string doesn't match any known kind.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Human-readable headline printed in front of the offending link
    pub fn headline(&self) -> &'static str {
        match self {
            Self::SitemapUnavailable => "Sitemap not found at this URL",
            Self::NoSitemapMatch => "No page URL in the sitemap matches the scope",
            Self::InternalSitemapUnreachable => "URL in the sitemap unreachable",
            Self::CannotProcessPage => "Cannot process (find title and links in) this page",
            Self::InPageAnchorMissing => "In-page anchor missing",
            Self::InternalAnchorMissing => "Anchor missing in target page",
            Self::UnreachableInternal => "Target page not in the crawled index (sitemap gap?)",
            Self::OutsideLinkUnreachable => "Outside anchor link unreachable",
            Self::ExternalAnchorNotFound => "External anchor doesn't seem to exist",
            Self::CannotCheckExternal => "Cannot check anchor, external checks are disabled",
            Self::AbsoluteWithinDomain => "Absolute link within the domain, should be relative",
            Self::NormalLinkUnreachable => "Link unreachable",
            Self::NormalLinkUnresolved => "URL resolution or time-out error, manual check advised",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps issue kinds to the severity they are reported with
#[derive(Debug, Clone, Default)]
pub struct SeverityPolicy {
    overrides: HashMap<IssueKind, Severity>,
}

impl SeverityPolicy {
    /// Creates a policy from explicit overrides
    ///
    /// Overrides of fatal kinds are ignored; fatal kinds are always errors.
    pub fn new(overrides: HashMap<IssueKind, Severity>) -> Self {
        let overrides = overrides
            .into_iter()
            .filter(|(kind, _)| !kind.is_fatal())
            .collect();
        Self { overrides }
    }

    /// Severity an issue of the given kind is reported with
    pub fn severity_of(&self, kind: IssueKind) -> Severity {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_severity())
    }
}

/// The page an issue was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub url: String,
    pub title: String,
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    /// Page the link was found on; None for run-level and crawl-phase issues
    pub page: Option<PageRef>,

    /// The offending link (or URL, for crawl-phase issues)
    pub link: String,

    pub kind: IssueKind,

    pub severity: Severity,

    /// Extra context, e.g. the redirect target or the HTTP status code
    pub detail: Option<String>,
}

impl IssueRecord {
    /// Returns true if this issue fails the run
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
