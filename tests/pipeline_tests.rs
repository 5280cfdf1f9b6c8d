//! End-to-end pipeline tests
//!
//! These tests exercise the full request cycle against the router, with the
//! retrieval backend played by a local axum server on an ephemeral port.
//! Tests requiring a real browser are in the rendered extractor's module
//! tests and are `#[ignore]`d.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sitetext::config::{DeliveryMode, ScraperConfig, Strategy};
use sitetext::handlers::scrape::{scrape_router, AppState};
use sitetext::stream::{StreamDecoder, StreamMessage};

// ============================================================================
// Test Utilities
// ============================================================================

const SCENARIO_PAGE: &str =
    "<html><body><nav>X</nav><article>Hello <script>evil()</script>World</article></body></html>";

/// Serve `app` on an ephemeral port and return its base address
async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("backend serve");
    });
    format!("http://{}/v2/general", addr)
}

/// Backend that always answers the scenario page
async fn scenario_backend() -> String {
    spawn_backend(Router::new().route("/v2/general", get(|| async { Html(SCENARIO_PAGE) }))).await
}

/// Build a router around the given config
fn app(config: ScraperConfig) -> Router {
    scrape_router(Arc::new(AppState::new(config)))
}

fn scrape_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn missing_url_is_400_without_invoking_the_fetcher() {
    // The endpoint points at a port nothing listens on; a clean 400 proves
    // no fetch was attempted.
    let config = ScraperConfig::default()
        .with_endpoint("http://127.0.0.1:9/v2/general")
        .with_delivery(DeliveryMode::Atomic);

    for body in [r#"{}"#, r#"{"url":""}"#, r#"{"url":"   "}"#] {
        let response = app(config.clone())
            .oneshot(scrape_request(body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "URL is required");
    }
}

// ============================================================================
// Atomic Delivery
// ============================================================================

#[tokio::test]
async fn atomic_success_returns_text_content() {
    let endpoint = scenario_backend().await;
    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Atomic);

    let response = app(config)
        .oneshot(scrape_request(r#"{"url":"https://example.com/story"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["textContent"], "Hello World");
}

#[tokio::test]
async fn backend_503_becomes_500_with_details() {
    let endpoint = spawn_backend(Router::new().route(
        "/v2/general",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE.into_response() }),
    ))
    .await;

    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Atomic);

    let response = app(config)
        .oneshot(scrape_request(r#"{"url":"https://example.com"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "An error occurred during scraping");
    assert!(json["details"].as_str().expect("details").contains("503"));
}

#[tokio::test]
async fn regex_strategy_fails_soft_on_empty_page() {
    // The regex strategy returns empty text instead of erroring; the atomic
    // answer is a successful response with an empty payload.
    let endpoint =
        spawn_backend(Router::new().route("/v2/general", get(|| async { Html("") }))).await;

    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Regex)
        .with_delivery(DeliveryMode::Atomic);

    let response = app(config)
        .oneshot(scrape_request(r#"{"url":"https://example.com"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["textContent"], "");
}

#[tokio::test]
async fn dom_strategy_fails_hard_on_empty_page() {
    let endpoint =
        spawn_backend(Router::new().route("/v2/general", get(|| async { Html("") }))).await;

    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Atomic);

    let response = app(config)
        .oneshot(scrape_request(r#"{"url":"https://example.com"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn word_budget_bounds_arbitrary_pages() {
    let long_page = format!("<html><body><main>{}</main></body></html>", vec!["word"; 3000].join(" "));
    let endpoint = spawn_backend(Router::new().route(
        "/v2/general",
        get(move || {
            let page = long_page.clone();
            async move { Html(page) }
        }),
    ))
    .await;

    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Atomic);

    let response = app(config)
        .oneshot(scrape_request(r#"{"url":"https://example.com"}"#))
        .await
        .expect("response");
    let json = body_json(response).await;

    let words = json["textContent"]
        .as_str()
        .expect("text")
        .split_whitespace()
        .count();
    assert_eq!(words, 2000);
}

// ============================================================================
// Streaming Delivery
// ============================================================================

#[tokio::test]
async fn streaming_success_ends_with_result_record() {
    let endpoint = scenario_backend().await;
    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Streaming);

    let response = app(config)
        .oneshot(scrape_request(r#"{"url":"https://example.com/story"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let bytes = response.into_body().collect().await.expect("body").to_bytes();

    let mut decoder = StreamDecoder::new();
    let messages = decoder.push_chunk(&bytes);
    assert!(!messages.is_empty());
    assert!(messages.last().expect("terminal").is_terminal());

    let content = decoder.resolve("https://example.com/story").expect("content");
    assert_eq!(content.content, "Hello World");
}

#[tokio::test]
async fn slow_backend_yields_processing_heartbeat_before_terminal() {
    let endpoint = spawn_backend(Router::new().route(
        "/v2/general",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Html(SCENARIO_PAGE)
        }),
    ))
    .await;

    let mut config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Streaming);
    config.heartbeat_interval = Duration::from_millis(50);

    let response = app(config)
        .oneshot(scrape_request(r#"{"url":"https://example.com"}"#))
        .await
        .expect("response");
    let bytes = response.into_body().collect().await.expect("body").to_bytes();

    let mut decoder = StreamDecoder::new();
    let messages = decoder.push_chunk(&bytes);

    let heartbeats = messages
        .iter()
        .filter(|m| matches!(m, StreamMessage::Processing { .. }))
        .count();
    assert!(heartbeats >= 1, "expected at least one processing record");

    let terminals = messages.iter().filter(|m| m.is_terminal()).count();
    assert_eq!(terminals, 1, "exactly one terminal record per request");
    assert!(messages.last().expect("last").is_terminal());
}

#[tokio::test]
async fn streaming_failure_ends_with_error_record() {
    let endpoint = spawn_backend(Router::new().route(
        "/v2/general",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE.into_response() }),
    ))
    .await;

    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Streaming);

    let response = app(config)
        .oneshot(scrape_request(r#"{"url":"https://example.com"}"#))
        .await
        .expect("response");
    // Streaming mode commits the 200 status before the pipeline resolves;
    // the failure travels as the terminal record.
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let mut decoder = StreamDecoder::new();
    decoder.push_chunk(&bytes);

    let err = decoder.resolve("https://example.com").unwrap_err();
    assert!(matches!(err, sitetext::ScrapeError::Remote(_)));
}

// ============================================================================
// Client Round Trip
// ============================================================================

/// Serve the scrape app itself on an ephemeral port
async fn spawn_app(config: ScraperConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let router = app(config);
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("app serve");
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn client_resolves_streamed_delivery() {
    let endpoint = scenario_backend().await;
    let mut config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Streaming);
    config.heartbeat_interval = Duration::from_millis(50);

    let base = spawn_app(config).await;
    let client = sitetext::SiteClient::new(base);

    let content = client
        .scrape("https://example.com/story")
        .await
        .expect("scrape");
    assert_eq!(content.url, "https://example.com/story");
    assert_eq!(content.content, "Hello World");
    assert!(content.is_ready());
}

#[tokio::test]
async fn client_resolves_atomic_delivery() {
    let endpoint = scenario_backend().await;
    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Atomic);

    let base = spawn_app(config).await;
    let client = sitetext::SiteClient::new(base);

    let content = client
        .scrape("https://example.com/story")
        .await
        .expect("scrape");
    assert_eq!(content.content, "Hello World");
}

#[tokio::test]
async fn client_surfaces_server_reported_failure() {
    let endpoint = spawn_backend(Router::new().route(
        "/v2/general",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE.into_response() }),
    ))
    .await;

    let config = ScraperConfig::default()
        .with_endpoint(endpoint)
        .with_strategy(Strategy::Dom)
        .with_delivery(DeliveryMode::Streaming);

    let base = spawn_app(config).await;
    let client = sitetext::SiteClient::new(base);

    let err = client.scrape("https://example.com").await.unwrap_err();
    assert!(matches!(err, sitetext::ScrapeError::Remote(_)));
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_endpoint_answers() {
    let config = ScraperConfig::default();
    let response = app(config)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}
