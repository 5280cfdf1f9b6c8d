//! Scrape endpoint handler
//!
//! This module provides the `POST /scrape` endpoint: it validates the
//! request, runs the extraction pipeline, and delivers the bounded text
//! payload in the configured delivery mode.
//!
//! # Delivery Modes
//!
//! - **Atomic**: the pipeline runs to completion, then one JSON object is
//!   emitted - `{"textContent": ...}` on success or `{"error", "details"}`
//!   on failure. No partial output.
//! - **Streaming**: the body opens immediately and carries newline-delimited
//!   JSON records - `{"status":"processing"}` heartbeats while the pipeline
//!   runs, then exactly one terminal record, then the body closes.
//!
//! # Error Handling
//!
//! - `400 Bad Request` - missing/empty URL; the fetcher is never invoked
//! - `500 Internal Server Error` - any pipeline failure (atomic mode)

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{error, info, instrument};

use crate::config::{DeliveryMode, ScraperConfig};
use crate::error::ScrapeError;
use crate::pipeline::ScrapePipeline;
use crate::stream::DeliveryStream;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the `/scrape` endpoint
///
/// `url` defaults to empty so that an absent field surfaces as the
/// validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// The URL to scrape
    #[serde(default)]
    pub url: String,
}

/// Response body for a successful atomic scrape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    /// Extracted, normalized page text
    #[serde(rename = "textContent")]
    pub text_content: String,
}

// ============================================================================
// Shared State
// ============================================================================

/// Shared state for the scrape handler
pub struct AppState {
    /// Injected configuration
    pub config: ScraperConfig,
    /// Pipeline assembled once from the configuration
    pipeline: Arc<ScrapePipeline>,
}

impl AppState {
    /// Build the application state from the injected configuration
    pub fn new(config: ScraperConfig) -> Self {
        let pipeline = Arc::new(ScrapePipeline::new(&config));
        Self { config, pipeline }
    }
}

// ============================================================================
// Handler Implementation
// ============================================================================

/// Handle the `POST /scrape` endpoint
///
/// Validates the URL before any downstream work, then dispatches on the
/// configured delivery mode.
#[instrument(skip(state, request), fields(url = %request.url))]
pub async fn scrape_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScrapeRequest>,
) -> Response {
    if request.url.trim().is_empty() {
        return ScrapeError::MissingUrl.into_response();
    }

    info!("Scraping {}", request.url);

    match state.config.delivery {
        DeliveryMode::Atomic => atomic_response(&state, &request.url).await,
        DeliveryMode::Streaming => streaming_response(&state, &request.url),
    }
}

/// Run the pipeline to completion and answer with a single JSON object
async fn atomic_response(state: &AppState, url: &str) -> Response {
    match state.pipeline.run(url).await {
        Ok(extracted) => Json(ScrapeResponse {
            text_content: extracted.text,
        })
        .into_response(),
        Err(err) => {
            error!("Scrape failed: {}", err);
            err.into_response()
        }
    }
}

/// Open the body immediately and stream heartbeats until the pipeline
/// resolves
///
/// The pipeline runs in its own task; the response stream polls its outcome
/// and a heartbeat timer. The first heartbeat is emitted on the first poll,
/// well inside any external response deadline.
fn streaming_response(state: &AppState, url: &str) -> Response {
    let (tx, rx) = oneshot::channel();
    let pipeline = Arc::clone(&state.pipeline);
    let url = url.to_string();

    tokio::spawn(async move {
        let outcome = pipeline.run(&url).await;
        if let Err(outcome) = tx.send(outcome) {
            // Receiver gone means the caller disconnected mid-stream.
            if let Err(err) = outcome {
                error!("Scrape failed after caller disconnected: {}", err);
            }
        }
    });

    let stream = DeliveryStream::new(rx, state.config.heartbeat_interval);

    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sitetext",
    }))
}

// ============================================================================
// Router Configuration
// ============================================================================

/// Create the scrape router with all endpoints
pub fn scrape_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
