use crate::output::Severity;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Anchor-Watch
///
/// Every section has defaults, so an empty TOML file (or no file at all) is a
/// valid configuration once the target domain is supplied on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub checks: CheckConfig,
    pub network: NetworkConfig,
    pub denylist: DenylistConfig,

    /// Severity overrides keyed by kebab-case issue kind
    pub severity: BTreeMap<String, Severity>,
}

/// What to check
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the portal, e.g. `docs.example.org`
    pub domain: String,

    /// Sub-portal folder, e.g. `tutorials`
    pub folder: String,

    /// Manual sitemap location; defaults to `domain + folder + /sitemap.xml`
    pub sitemap: Option<String>,
}

/// How to check it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Do not fetch pages outside the scope to verify their anchors
    #[serde(rename = "skip-external")]
    pub skip_external: bool,

    /// Print only error-class issues
    pub quiet: bool,

    /// Report anchor links inside the domain that are authored as absolute URLs
    #[serde(rename = "report-absolute-links")]
    pub report_absolute_links: bool,

    /// Which content extractor to use
    pub extractor: ExtractorKind,
}

/// Content extraction strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Lightweight pattern matching over the raw markup
    #[default]
    Pattern,

    /// Structural HTML parse
    Dom,
}

/// Network limits and identification
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for fetching a page's content (seconds)
    #[serde(rename = "page-timeout")]
    pub page_timeout: u64,

    /// Timeout for a plain link status probe (seconds)
    #[serde(rename = "probe-timeout")]
    pub probe_timeout: u64,

    /// Timeout for fetching the sitemap (seconds)
    #[serde(rename = "sitemap-timeout")]
    pub sitemap_timeout: u64,

    /// Overall run timeout (seconds); unlimited when absent
    #[serde(rename = "run-timeout")]
    pub run_timeout: Option<u64>,

    /// Maximum number of sitemap pages fetched concurrently
    #[serde(rename = "max-concurrent-pages")]
    pub max_concurrent_pages: usize,

    /// Maximum number of link probes in flight
    #[serde(rename = "max-concurrent-probes")]
    pub max_concurrent_probes: usize,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            // Several documentation hosts refuse or stall obvious bot agents
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0 Safari/537.36"
                .to_string(),
            page_timeout: 20,
            probe_timeout: 10,
            sitemap_timeout: 20,
            run_timeout: None,
            max_concurrent_pages: 4,
            max_concurrent_probes: 8,
            max_redirects: 10,
        }
    }
}

/// A link pattern as written in the configuration
///
/// ```toml
/// normal-links = [{ prefix = "mailto:" }, { contains = "%7B" }, { regex = "woff2?$" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPattern {
    /// Link starts with the string
    Prefix(String),

    /// Link contains the string anywhere
    Contains(String),

    /// Link matches the regular expression
    Regex(String),
}

/// Links excluded from validation because they are known false positives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DenylistConfig {
    /// Patterns dropped from a page's anchor links at extraction time
    #[serde(rename = "anchor-links")]
    pub anchor_links: Vec<LinkPattern>,

    /// Anchor links longer than this are dropped (encoded diagrams and similar)
    #[serde(rename = "max-anchor-link-length")]
    pub max_anchor_link_length: usize,

    /// Patterns of normal links that are never probed
    #[serde(rename = "normal-links")]
    pub normal_links: Vec<LinkPattern>,
}

impl Default for DenylistConfig {
    fn default() -> Self {
        use LinkPattern::{Contains, Prefix, Regex};

        let anchor_links = vec![
            // Diagram editors put the whole diagram after the hash
            Prefix("https://app.diagrams.net".into()),
            Prefix("https://viewer.diagrams.net".into()),
            // Postman uses the hash for app routing and rate-limits crawlers
            Prefix("https://app.getpostman.com/run-collection".into()),
            Prefix("https://learning.postman.com/".into()),
            Contains("/misc/satisfaction-levels".into()),
        ];

        let normal_links = vec![
            Prefix("mailto:".into()),
            Prefix("tel:".into()),
            Prefix("javascript:".into()),
            Regex(r"^https?://localhost".into()),
            Regex(r"^https?://127\.0\.0\.1".into()),
            Regex(r"^https?://fonts\.cdnfonts\.com/css".into()),
            Regex(r"woff2?$".into()),
            // Templated URLs such as /users/{id}
            Contains("%7B".into()),
            Contains("file-name".into()),
            Contains("file_name".into()),
            Contains("filename".into()),
            Regex(r"^https?://(www\.)?example\.(com|org|net)(/|$)".into()),
            // Hosts that block or stall automated requests
            Prefix("http://docs.oasis-open.org/xliff/xliff-core".into()),
            Prefix("https://azure.microsoft.com/en-us".into()),
            Prefix("https://business.adobe.com/products/target".into()),
            Prefix("https://csrc.nist.gov/Projects/key-management/key-management-guidelines".into()),
            Prefix("https://graphiql-online.com/".into()),
            Prefix("https://help.zapier.com/hc/en-us/articles".into()),
            Prefix("https://player.vimeo.com/video/".into()),
            Prefix("https://twitter.com".into()),
            Prefix("https://www.cloudflare.com/learning".into()),
            Prefix("https://www.dta.gov.au/".into()),
            Prefix("https://www.mozilla.org/firefox".into()),
            Prefix("https://www.vic.gov.au/".into()),
        ];

        Self {
            anchor_links,
            max_anchor_link_length: 2048,
            normal_links,
        }
    }
}

impl DenylistConfig {
    /// A denylist that excludes nothing except over-long anchor links
    pub fn empty() -> Self {
        Self {
            anchor_links: Vec::new(),
            max_anchor_link_length: 2048,
            normal_links: Vec::new(),
        }
    }
}
