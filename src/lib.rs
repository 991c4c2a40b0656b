//! Anchor-Watch: link and anchor integrity checking for documentation portals
//!
//! This crate reads a site's sitemap, indexes every in-scope page (title, links,
//! element IDs) and then validates that in-page and cross-page anchors resolve
//! and that plain hyperlinks are reachable. It is meant to run as a CI gate.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;
pub mod validator;

use thiserror::Error;

/// Main error type for run-level failures
///
/// Per-page and per-link problems never surface here; they are recorded as
/// issues in the [`output::ReportSink`]. Only conditions that make the whole
/// run meaningless end up as a `CheckError`.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Sitemap unavailable at {url}: {reason}")]
    SitemapUnavailable { url: String, reason: String },

    #[error("No sitemap entry matches {scope}")]
    NoSitemapMatch { scope: String },
}

impl CheckError {
    /// Returns the issue kind a fatal error is reported as, if any
    pub fn issue_kind(&self) -> Option<output::IssueKind> {
        match self {
            Self::SitemapUnavailable { .. } => Some(output::IssueKind::SitemapUnavailable),
            Self::NoSitemapMatch { .. } => Some(output::IssueKind::NoSitemapMatch),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, CheckError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, RunSettings};
pub use crawler::{Coordinator, RunOutcome, RunReport};
pub use output::{IssueKind, IssueRecord, ReportSink, Severity};
pub use state::{ExternalLinkCache, PageIndex, PageRecord};
pub use url::Scope;
