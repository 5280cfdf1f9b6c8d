//! Error types for the scraping pipeline
//!
//! Every pipeline stage reports through [`ScrapeError`]; the outermost request
//! handler translates the error into a single structured JSON response. The
//! caller-facing message stays short and human-readable, with the technical
//! cause attached as `details`.
//!
//! # Status Mapping
//!
//! - `400 Bad Request` - missing/empty URL (no downstream work attempted)
//! - `500 Internal Server Error` - any pipeline failure (fetch, navigation,
//!   extraction)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Errors that can occur while scraping a page or consuming a scrape stream
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Request body carried no URL; surfaced immediately, before any fetch
    #[error("URL is required")]
    MissingUrl,

    /// Retrieval backend answered with a non-success status
    #[error("retrieval backend returned status {status}")]
    FetchStatus {
        /// HTTP status code reported by the backend
        status: u16,
    },

    /// Request to the retrieval backend failed at the transport layer
    #[error("retrieval request failed: {0}")]
    FetchTransport(String),

    /// Rendered strategy only: navigation failed or exceeded its timeout
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Document yielded no readable content region
    #[error("content extraction failed: {0}")]
    Extraction(String),

    /// Client side: the server reported a failure through the stream
    #[error("scrape failed upstream: {0}")]
    Remote(String),

    /// Client side: the stream closed before a terminal record arrived
    #[error("stream ended without a terminal record")]
    Decode,
}

impl ScrapeError {
    /// HTTP status this error maps to when it escapes the request handler
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScrapeError::MissingUrl => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is the terminal "no terminal record" decode outcome,
    /// as opposed to a failure the server itself reported
    pub fn is_decode(&self) -> bool {
        matches!(self, ScrapeError::Decode)
    }
}

impl IntoResponse for ScrapeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ScrapeError::MissingUrl => serde_json::json!({
                "error": "URL is required",
            }),
            other => serde_json::json!({
                "error": "An error occurred during scraping",
                "details": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
