//! Lightweight link probing
//!
//! The [`LinkProbe`] answers status-code questions without rendering anything:
//! whether a normal link is reachable, where an internal link finally lands
//! after redirects, and the raw text of the sitemap.

use crate::crawler::fetcher::describe_error;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Result of probing a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered with this status code (after redirects)
    Status(u16),

    /// No response at all: blocked, timed out, refused
    Failed(String),
}

/// Plain HTTP status checks
pub trait LinkProbe: Send + Sync {
    /// Requests the URL and reports the final status code
    fn status(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send;

    /// Follows redirects and returns the URL the request lands on
    ///
    /// Returns None when no response was received.
    fn resolve_redirects(&self, url: &str) -> impl Future<Output = Option<String>> + Send;

    /// Fetches a document body; status >= 400 is an error
    fn fetch_document(&self, url: &str) -> impl Future<Output = Result<String, String>> + Send;
}

/// [`LinkProbe`] backed by the shared HTTP client
#[derive(Debug, Clone)]
pub struct HttpLinkProbe {
    client: Client,
    probe_timeout: Duration,
    document_timeout: Duration,
}

impl HttpLinkProbe {
    pub fn new(client: Client, probe_timeout: Duration, document_timeout: Duration) -> Self {
        Self {
            client,
            probe_timeout,
            document_timeout,
        }
    }
}

impl LinkProbe for HttpLinkProbe {
    async fn status(&self, url: &str) -> ProbeOutcome {
        // GET rather than HEAD: plenty of servers answer HEAD with 405 or 404
        match self.client.get(url).timeout(self.probe_timeout).send().await {
            Ok(response) => ProbeOutcome::Status(response.status().as_u16()),
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", url, e);
                ProbeOutcome::Failed(describe_error(&e))
            }
        }
    }

    async fn resolve_redirects(&self, url: &str) -> Option<String> {
        match self.client.get(url).timeout(self.probe_timeout).send().await {
            Ok(response) => Some(response.url().to_string()),
            Err(e) => {
                tracing::debug!("Could not follow redirects of {}: {}", url, e);
                None
            }
        }
    }

    async fn fetch_document(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .timeout(self.document_timeout)
            .send()
            .await
            .map_err(|e| describe_error(&e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        response.text().await.map_err(|e| describe_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::crawler::build_http_client;

    fn probe() -> HttpLinkProbe {
        let client = build_http_client(&NetworkConfig::default()).unwrap();
        HttpLinkProbe::new(client, Duration::from_secs(2), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_unreachable_host_is_failed_probe() {
        let outcome = probe().status("http://127.0.0.1:9/").await;
        assert!(matches!(outcome, ProbeOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_has_no_final_url() {
        assert_eq!(probe().resolve_redirects("http://127.0.0.1:9/").await, None);
    }

    #[tokio::test]
    async fn test_unreachable_document_is_error() {
        assert!(probe().fetch_document("http://127.0.0.1:9/sitemap.xml").await.is_err());
    }
}
