//! Scraper configuration
//!
//! All knobs for the pipeline live here and are injected at construction
//! time. Environment variables are read in exactly one place
//! ([`ScraperConfig::from_env`], called from `main`); business logic never
//! touches the ambient environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default retrieval backend endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.scrapingant.com/v2/general";

/// Hard cap on the number of whitespace-separated tokens in extracted text
pub const DEFAULT_MAX_WORDS: usize = 2000;

/// Navigation budget for the rendered strategy
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Extraction strategy selected at construction time
///
/// The three strategies trade fidelity for latency and resource cost:
/// `Regex` is the cheapest and fails soft, `Dom` parses a real tree,
/// `Rendered` drives a headless browser and reads the post-script DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Pattern-based tag stripping, no DOM model
    Regex,
    /// Structure-aware extraction over a parsed HTML tree
    #[default]
    Dom,
    /// Headless-browser rendering, reads the live document
    Rendered,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "regex" => Ok(Strategy::Regex),
            "dom" => Ok(Strategy::Dom),
            "rendered" => Ok(Strategy::Rendered),
            other => Err(format!(
                "unknown strategy '{}': expected regex, dom or rendered",
                other
            )),
        }
    }
}

/// How results are delivered to the caller
///
/// Selected by deployment policy, not by request content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// One JSON object after the whole pipeline completes
    Atomic,
    /// Newline-delimited JSON records over a chunked body, with
    /// `processing` heartbeats before the terminal record
    #[default]
    Streaming,
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "atomic" => Ok(DeliveryMode::Atomic),
            "streaming" => Ok(DeliveryMode::Streaming),
            other => Err(format!(
                "unknown delivery mode '{}': expected atomic or streaming",
                other
            )),
        }
    }
}

/// Resource kinds the retrieval backend can be asked not to load
///
/// Blocking these reduces backend rendering cost and payload size when full
/// rendering is unnecessary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BlockedResource {
    Stylesheet,
    Image,
    Media,
    Font,
    TextTrack,
    Xhr,
    Fetch,
    EventSource,
    Websocket,
    Manifest,
}

impl BlockedResource {
    /// Query-parameter value understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockedResource::Stylesheet => "stylesheet",
            BlockedResource::Image => "image",
            BlockedResource::Media => "media",
            BlockedResource::Font => "font",
            BlockedResource::TextTrack => "texttrack",
            BlockedResource::Xhr => "xhr",
            BlockedResource::Fetch => "fetch",
            BlockedResource::EventSource => "eventsource",
            BlockedResource::Websocket => "websocket",
            BlockedResource::Manifest => "manifest",
        }
    }

    /// Everything that can be blocked without affecting the delivered HTML
    pub fn all() -> Vec<BlockedResource> {
        vec![
            BlockedResource::Stylesheet,
            BlockedResource::Image,
            BlockedResource::Media,
            BlockedResource::Font,
            BlockedResource::TextTrack,
            BlockedResource::Xhr,
            BlockedResource::Fetch,
            BlockedResource::EventSource,
            BlockedResource::Websocket,
            BlockedResource::Manifest,
        ]
    }
}

/// Configuration for the scraping pipeline
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Retrieval backend base endpoint
    pub endpoint: String,

    /// Backend API key
    /// NEVER log this value
    api_key: String,

    /// Whether the backend should render with a browser itself
    pub backend_browser: bool,

    /// Resource kinds the backend is asked to skip
    pub block_resources: Vec<BlockedResource>,

    /// Timeout for a single retrieval call
    pub fetch_timeout: Duration,

    /// Navigation budget for the rendered strategy
    pub navigation_timeout: Duration,

    /// Interval between `processing` heartbeat records in streaming mode
    pub heartbeat_interval: Duration,

    /// Word budget enforced by the normalizer
    pub max_words: usize,

    /// Extraction strategy
    pub strategy: Strategy,

    /// Delivery mode
    pub delivery: DeliveryMode,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            backend_browser: false,
            block_resources: BlockedResource::all(),
            fetch_timeout: Duration::from_secs(30),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            heartbeat_interval: Duration::from_secs(10),
            max_words: DEFAULT_MAX_WORDS,
            strategy: Strategy::default(),
            delivery: DeliveryMode::default(),
        }
    }
}

impl ScraperConfig {
    /// Create configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `SCRAPINGANT_API_KEY` (required for real fetches): backend API key
    /// - `SITETEXT_ENDPOINT` (optional): backend endpoint override
    /// - `SITETEXT_FETCH_TIMEOUT` (optional): retrieval timeout in seconds
    /// - `SITETEXT_HEARTBEAT_SECS` (optional): streaming heartbeat interval
    pub fn from_env() -> Self {
        let api_key = env::var("SCRAPINGANT_API_KEY").unwrap_or_default();

        if api_key.is_empty() {
            tracing::warn!("SCRAPINGANT_API_KEY is not set; backend fetches will be rejected");
        }

        let endpoint =
            env::var("SITETEXT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let fetch_timeout = env::var("SITETEXT_FETCH_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let heartbeat_interval = env::var("SITETEXT_HEARTBEAT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Self {
            endpoint,
            api_key,
            fetch_timeout,
            heartbeat_interval,
            ..Default::default()
        }
    }

    /// Backend API key
    ///
    /// # Security Note
    ///
    /// Returns a reference to the secret. NEVER log this value.
    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Set the API key explicitly (tests, embedding)
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the backend endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the extraction strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the delivery mode
    pub fn with_delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }
}
