//! Page fetching
//!
//! This module provides the [`PageFetcher`] seam the crawl and validation
//! phases fetch page markup through, and its HTTP implementation:
//! - Building the shared HTTP client with the configured user agent
//! - GET requests with a per-request timeout
//! - Error classification into a human-readable failure reason

use crate::config::NetworkConfig;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;

/// Result of fetching one page
///
/// An unreachable page is an expected outcome, not an error: callers branch on
/// the variant and record an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The page was fetched
    Success {
        /// Page source as served (or as rendered, for a browser backend)
        markup: String,
    },

    /// The page could not be fetched
    Failed {
        /// Why: HTTP status, timeout, connection error
        reason: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }
}

/// Fetches the markup of a page
///
/// Implementations must treat an HTTP status >= 400 as a failure. A headless
/// browser backend implements this trait to check JS-rendered portals.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The network configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use anchor_watch::config::NetworkConfig;
/// use anchor_watch::crawler::build_http_client;
///
/// let client = build_http_client(&NetworkConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &NetworkConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a plain HTTP client
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_page(&self.client, url, self.timeout).await
    }
}

/// Fetches a page with a GET request
///
/// # Failure Classification
///
/// | Condition | Reason |
/// |-----------|--------|
/// | HTTP >= 400 | `HTTP <code>` |
/// | Timeout | `Request timeout` |
/// | Connection refused | `Connection refused` |
/// | Redirect chain too long | `Too many redirects` |
/// | Anything else | the client's error message |
pub async fn fetch_page(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::Failed {
                reason: describe_error(&e),
            }
        }
    };

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return FetchResult::Failed {
            reason: format!("HTTP {}", status.as_u16()),
        };
    }

    match response.text().await {
        Ok(markup) => FetchResult::Success { markup },
        Err(e) => FetchResult::Failed {
            reason: describe_error(&e),
        },
    }
}

/// Turns a client error into a short failure reason
pub(crate) fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&NetworkConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_custom_user_agent() {
        let config = NetworkConfig {
            user_agent: "DocsBot/2.0".to_string(),
            ..Default::default()
        };
        let client = build_http_client(&config).unwrap();
        assert!(format!("{:?}", client).contains("Client"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure() {
        let client = build_http_client(&NetworkConfig::default()).unwrap();
        // Port 9 (discard) is not expected to accept HTTP connections
        let result = fetch_page(&client, "http://127.0.0.1:9/", Duration::from_secs(2)).await;
        assert!(!result.is_success());
    }

    // Status handling against a live server is covered by the wiremock
    // integration tests
}
