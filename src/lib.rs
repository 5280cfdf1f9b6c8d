//! Sitetext - Remote-Page Text Extraction with Streamed Delivery
//!
//! This crate turns a URL into a bounded, readable plain-text payload and
//! delivers it to a caller either atomically or as a stream of
//! newline-delimited JSON records.
//!
//! # Features
//!
//! - **Fetcher**: raw HTML retrieval through a third-party rendering/proxy
//!   backend, with resource blocking to cut payload and latency
//! - **Extraction Strategies**: regex stripping, DOM-aware tree extraction,
//!   and headless-browser rendering - one contract, three cost/fidelity
//!   points, selected at construction
//! - **Normalizer**: whitespace collapsing and a hard 2000-word budget shared
//!   by every strategy
//! - **Streamed Delivery**: NDJSON encoder with keep-alive heartbeats, and a
//!   decoder that reassembles records under arbitrary chunk boundaries
//! - **Error Handling**: structured error taxonomy with HTTP status mapping
//! - **Client**: reference consumer resolving a stream into [`SiteContent`]
//!
//! # Architecture
//!
//! ```text
//! Caller ──▶ Fetcher ──▶ raw HTML ──▶ Extractor ──▶ Normalizer
//!                                        │               │
//!                          (rendered strategy            ▼
//!                           owns its browser)      bounded text
//!                                                        │
//!                                                        ▼
//!                                                Delivery Encoder
//!                                                        │
//!                                              NDJSON / atomic JSON
//!                                                        │
//!                                                        ▼
//!                                                Delivery Decoder ──▶ SiteContent
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sitetext::config::{ScraperConfig, Strategy};
//! use sitetext::pipeline::ScrapePipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScraperConfig::from_env().with_strategy(Strategy::Dom);
//!     let pipeline = ScrapePipeline::new(&config);
//!
//!     let extracted = pipeline.run("https://example.com").await?;
//!     println!("{} words: {}", extracted.word_count(), extracted.text);
//!     Ok(())
//! }
//! ```
//!
//! # Decoding a Stream
//!
//! ```rust
//! use sitetext::stream::StreamDecoder;
//!
//! let mut decoder = StreamDecoder::new();
//! // Chunk boundaries need not align with record boundaries.
//! decoder.push_chunk(b"{\"status\":\"proc");
//! decoder.push_chunk(b"essing\"}\n{\"textContent\":\"Hello\"}\n");
//!
//! let content = decoder.resolve("https://example.com").unwrap();
//! assert_eq!(content.content, "Hello");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod stream;

// Re-exports for convenience
pub use client::SiteClient;
pub use config::{BlockedResource, DeliveryMode, ScraperConfig, Strategy};
pub use error::ScrapeError;
pub use extract::{DomExtractor, Extractor, RegexExtractor, RenderedExtractor};
pub use fetch::{Fetcher, RawDocument};
pub use handlers::{scrape_router, AppState, ScrapeRequest};
pub use normalize::{ExtractedText, Normalizer};
pub use pipeline::ScrapePipeline;
pub use stream::{DeliveryStream, SiteContent, StreamDecoder, StreamMessage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
