//! HTTP handlers for the sitetext server
//!
//! # Modules
//!
//! - [`scrape`] - POST endpoint running the extraction pipeline, answering
//!   atomically or as a newline-delimited JSON stream depending on the
//!   configured delivery mode
//!
//! # Example
//!
//! ```rust,no_run
//! use sitetext::config::ScraperConfig;
//! use sitetext::handlers::scrape::{scrape_router, AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = Arc::new(AppState::new(ScraperConfig::default()));
//!     let app = scrape_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
//!         .await
//!         .unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod scrape;

pub use scrape::{health_handler, scrape_handler, scrape_router, AppState, ScrapeRequest};
