use crate::{UrlError, UrlResult};
use url::Url;

/// The part of a site that is in bounds for crawling
///
/// A scope is a domain (always with protocol, never with a trailing slash)
/// optionally narrowed by a folder (always with a leading slash, never with a
/// trailing one). Sitemap entries and cross-page anchor links that start with
/// [`Scope::path`] are considered internal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    domain: String,
    folder: String,
}

impl Scope {
    /// Builds a scope from user input
    ///
    /// # Normalization
    ///
    /// - `https://` is prepended to the domain when it has no `http(s)://` prefix
    /// - trailing slashes are stripped from the domain
    /// - a leading slash is added to a non-empty folder, trailing slashes removed
    ///
    /// # Examples
    ///
    /// ```
    /// use anchor_watch::url::Scope;
    ///
    /// let scope = Scope::new("docs.example.org/", "tutorials/").unwrap();
    /// assert_eq!(scope.domain(), "https://docs.example.org");
    /// assert_eq!(scope.path(), "https://docs.example.org/tutorials");
    /// ```
    pub fn new(domain: &str, folder: &str) -> UrlResult<Self> {
        let domain = domain.trim();
        let mut domain = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };
        while domain.ends_with('/') {
            domain.pop();
        }

        let parsed = Url::parse(&domain).map_err(|e| UrlError::Parse(e.to_string()))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingDomain);
        }

        let folder = folder.trim().trim_matches('/');
        let folder = if folder.is_empty() {
            String::new()
        } else {
            format!("/{}", folder)
        };

        Ok(Self { domain, folder })
    }

    /// The domain with protocol, without trailing slash
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The folder with leading slash, or an empty string
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Domain and folder joined; the prefix that makes a URL in-scope
    pub fn path(&self) -> String {
        format!("{}{}", self.domain, self.folder)
    }

    /// Conventional sitemap location for this scope
    pub fn default_sitemap_url(&self) -> String {
        format!("{}/sitemap.xml", self.path())
    }

    /// Returns true if the URL lies within this scope
    pub fn contains(&self, url: &str) -> bool {
        url.starts_with(&self.path())
    }
}
