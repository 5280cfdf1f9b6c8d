//! Caller-side stream consumer
//!
//! [`SiteClient`] is the reference consumer of the delivery protocol: it
//! POSTs a scrape request, feeds the chunked response body through the
//! [`StreamDecoder`](crate::stream::StreamDecoder), surfaces `processing`
//! records as liveness, and resolves the terminal record into a
//! [`SiteContent`].
//!
//! The resolved text is re-normalized on arrival. The server already
//! normalizes before encoding, so this is redundant - but normalization is
//! idempotent, and re-applying it keeps the client correct against
//! deployments where the server ships pre-normalization text.

use futures::StreamExt;
use tracing::{debug, instrument};

use crate::error::ScrapeError;
use crate::handlers::scrape::ScrapeRequest;
use crate::normalize::Normalizer;
use crate::stream::{SiteContent, StreamDecoder, StreamMessage};

/// Client for a sitetext server
#[derive(Debug, Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    base_url: String,
    normalizer: Normalizer,
}

impl SiteClient {
    /// Create a client for the server at `base_url` (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            normalizer: Normalizer::default(),
        }
    }

    /// Scrape `url` and resolve the streamed response
    ///
    /// Works against both delivery modes: an atomic body is simply a stream
    /// of one chunk whose single record is terminal. Chunks arriving after
    /// the terminal record are not read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn scrape(&self, url: &str) -> Result<SiteContent, ScrapeError> {
        let response = self
            .http
            .post(format!("{}/scrape", self.base_url))
            .json(&ScrapeRequest {
                url: url.to_string(),
            })
            .send()
            .await
            .map_err(|e| ScrapeError::FetchTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Non-streaming failure path: the body is a single error object.
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| format!("status {}", status.as_u16()));
            return Err(ScrapeError::Remote(message));
        }

        let mut decoder = StreamDecoder::new();
        let mut chunks = response.bytes_stream();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| ScrapeError::FetchTransport(e.to_string()))?;
            for message in decoder.push_chunk(&chunk) {
                if let StreamMessage::Processing { .. } = message {
                    debug!("Scrape in progress");
                }
            }
            if decoder.is_resolved() {
                break;
            }
        }

        // Atomic-mode bodies carry a single record with no trailing
        // separator; flush the residual tail now that the stream is closed.
        decoder.finish();

        let content = decoder.resolve(url)?;

        // Client-side renormalization; idempotent against the server's pass.
        Ok(SiteContent {
            content: self.normalizer.normalize(&content.content).text,
            url: content.url,
        })
    }
}
