//! Raw HTML retrieval
//!
//! The fetcher is a pure I/O boundary: it issues one GET against the
//! configured retrieval backend and hands the response body to the extraction
//! layer untouched. URL validity is the caller's responsibility; retry
//! policy, if any, belongs to the caller as well - a failed attempt is
//! reported, not repeated.

use tracing::{debug, instrument};
use url::Url;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;

/// Opaque HTML payload plus the URL it came from
///
/// Produced by the fetcher, consumed and discarded by the extractor.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Originating URL
    pub url: String,
    /// Raw response body
    pub html: String,
}

/// Single-attempt retrieval client for the scraping backend
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    backend_browser: bool,
    block_resources: Vec<&'static str>,
}

impl Fetcher {
    /// Build a fetcher from the injected configuration
    ///
    /// The retrieval timeout is fixed on the underlying client here; the
    /// outer request deadline is enforced at the server layer.
    pub fn new(config: &ScraperConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key().to_string(),
            backend_browser: config.backend_browser,
            block_resources: config
                .block_resources
                .iter()
                .map(|r| r.as_str())
                .collect(),
        }
    }

    /// Build the backend request URL with the target percent-encoded into
    /// a query parameter
    fn request_url(&self, target: &str) -> Result<Url, ScrapeError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| ScrapeError::FetchTransport(format!("invalid endpoint: {}", e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("url", target);
            pairs.append_pair("x-api-key", &self.api_key);
            pairs.append_pair("browser", if self.backend_browser { "true" } else { "false" });
            for resource in &self.block_resources {
                pairs.append_pair("block_resource", resource);
            }
        }

        Ok(url)
    }

    /// Retrieve the raw HTML for `target`
    ///
    /// One outbound call, no retries. Any non-success transport status is a
    /// [`ScrapeError::FetchStatus`] carrying the backend's status code.
    #[instrument(skip(self), fields(url = %target))]
    pub async fn fetch(&self, target: &str) -> Result<RawDocument, ScrapeError> {
        let request_url = self.request_url(target)?;

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| ScrapeError::FetchTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::FetchStatus {
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ScrapeError::FetchTransport(e.to_string()))?;

        debug!("Fetched {} bytes", html.len());

        Ok(RawDocument {
            url: target.to_string(),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockedResource, ScraperConfig};

    fn test_fetcher() -> Fetcher {
        let config = ScraperConfig::default()
            .with_api_key("secret-key")
            .with_endpoint("https://backend.example/v2/general");
        Fetcher::new(&config)
    }

    #[test]
    fn test_request_url_encodes_target() {
        let fetcher = test_fetcher();
        let url = fetcher
            .request_url("https://example.com/path?a=1&b=2")
            .unwrap();
        let serialized = url.to_string();

        // The target must be percent-encoded into a single query parameter
        assert!(serialized.contains("url=https%3A%2F%2Fexample.com%2Fpath%3Fa%3D1%26b%3D2"));
        assert!(serialized.contains("x-api-key=secret-key"));
        assert!(serialized.contains("browser=false"));
    }

    #[test]
    fn test_request_url_appends_block_resources() {
        let fetcher = test_fetcher();
        let url = fetcher.request_url("https://example.com").unwrap();
        let serialized = url.to_string();

        for resource in BlockedResource::all() {
            assert!(
                serialized.contains(&format!("block_resource={}", resource.as_str())),
                "missing block_resource={}",
                resource.as_str()
            );
        }
    }

    #[test]
    fn test_invalid_endpoint_is_transport_error() {
        let config = ScraperConfig::default().with_endpoint("not a url");
        let fetcher = Fetcher::new(&config);
        let err = fetcher.request_url("https://example.com").unwrap_err();
        assert!(matches!(err, ScrapeError::FetchTransport(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is not listening
        let config = ScraperConfig::default().with_endpoint("http://127.0.0.1:9/v2/general");
        let fetcher = Fetcher::new(&config);
        let err = fetcher.fetch("https://example.com").await.unwrap_err();
        assert!(matches!(err, ScrapeError::FetchTransport(_)));
    }
}
