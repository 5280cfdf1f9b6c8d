//! Sitetext Server
//!
//! Remote-page text extraction with streamed NDJSON delivery.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use sitetext::config::{DeliveryMode, ScraperConfig, Strategy};
use sitetext::handlers::scrape::{scrape_router, AppState};

/// Sitetext Server
#[derive(Parser, Debug)]
#[command(name = "sitetext-server")]
#[command(version)]
#[command(about = "Sitetext — remote-page text extraction with streamed delivery")]
#[command(long_about = r#"Sitetext — remote-page text extraction with streamed delivery

Given a URL, fetches the page's HTML through a third-party rendering/proxy
backend, reduces it to a bounded plain-text payload, and delivers the result
atomically or as a newline-delimited JSON stream.

EXTRACTION STRATEGIES:
  regex     pattern-based tag stripping, cheapest, fails soft
  dom       structure-aware tree extraction (default)
  rendered  headless-browser rendering, reads the post-script DOM

EXAMPLES:
  # Start with defaults (DOM strategy, streaming delivery)
  sitetext-server

  # Atomic delivery with the regex strategy on a custom port
  sitetext-server --port 3010 --strategy regex --delivery atomic

CONFIGURATION:
  SCRAPINGANT_API_KEY   retrieval backend API key (required for real fetches)
  SITETEXT_ENDPOINT     retrieval backend endpoint override
"#)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Extraction strategy: regex, dom or rendered
    #[arg(long, default_value = "dom")]
    strategy: Strategy,

    /// Delivery mode: atomic or streaming
    #[arg(long, default_value = "streaming")]
    delivery: DeliveryMode,

    /// Outer per-request deadline in seconds
    #[arg(long, default_value = "60")]
    request_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Configuration is read from the environment here, once, and injected.
    let config = ScraperConfig::from_env()
        .with_strategy(args.strategy)
        .with_delivery(args.delivery);

    let state = Arc::new(AppState::new(config));

    let app = scrape_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(args.request_timeout)));

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("Sitetext server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve on SIGINT or SIGTERM so in-flight requests can drain
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
