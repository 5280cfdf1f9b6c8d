//! Content extraction strategies
//!
//! Three interchangeable ways of reducing a page to readable body text, in
//! increasing order of cost and fidelity:
//!
//! - [`regex`] - pattern-based tag stripping, no DOM model. Fails soft:
//!   an unprocessable document yields empty text, never an error.
//! - [`dom`] - parses the document into a tree, selects the content root
//!   (`article` > `main` > `body`), strips noise regions inside it. Fails
//!   hard on documents with no readable content.
//! - [`rendered`] - drives a headless browser, executes page scripts, and
//!   reads the visible text of the live document. Owns its own network
//!   access and fails hard.
//!
//! The asymmetric error policy is deliberate: the cheap strategy prioritizes
//! availability, the structural ones prioritize correctness.
//!
//! All strategies share the content-root priority rule and the same set of
//! noise regions (scripts, styles, navigation, header, footer). The selected
//! strategy is fixed at construction time; raw strategy output always flows
//! through the [`Normalizer`](crate::normalize::Normalizer) before it reaches
//! a caller.

pub mod dom;
pub mod regex;
pub mod rendered;

pub use self::dom::DomExtractor;
pub use self::regex::RegexExtractor;
pub use self::rendered::RenderedExtractor;

use crate::config::{ScraperConfig, Strategy};
use crate::error::ScrapeError;
use crate::fetch::RawDocument;

/// A content extractor with its strategy fixed at construction
#[derive(Debug)]
pub enum Extractor {
    /// Pattern-based stripping
    Regex(RegexExtractor),
    /// Tree-based extraction
    Dom(DomExtractor),
    /// Headless-browser extraction
    Rendered(RenderedExtractor),
}

impl Extractor {
    /// Build the extractor selected by the configuration
    pub fn new(config: &ScraperConfig) -> Self {
        match config.strategy {
            Strategy::Regex => Extractor::Regex(RegexExtractor::new()),
            Strategy::Dom => Extractor::Dom(DomExtractor::new()),
            Strategy::Rendered => {
                Extractor::Rendered(RenderedExtractor::new(config.navigation_timeout))
            }
        }
    }

    /// Whether this strategy retrieves pages itself instead of consuming a
    /// fetched [`RawDocument`]
    pub fn owns_network_access(&self) -> bool {
        matches!(self, Extractor::Rendered(_))
    }

    /// Extract raw (pre-normalization) text from an already-fetched document
    ///
    /// Not applicable to the rendered strategy, which navigates on its own -
    /// see [`Extractor::extract_live`].
    pub fn extract_document(&self, doc: &RawDocument) -> Result<String, ScrapeError> {
        match self {
            Extractor::Regex(e) => Ok(e.extract(&doc.html)),
            Extractor::Dom(e) => e.extract(&doc.html),
            Extractor::Rendered(_) => Err(ScrapeError::Extraction(
                "rendered strategy extracts from a live page, not a fetched document".to_string(),
            )),
        }
    }

    /// Rendered strategy only: navigate to `url` and extract from the live,
    /// post-script document
    pub async fn extract_live(&self, url: &str) -> Result<String, ScrapeError> {
        match self {
            Extractor::Rendered(e) => e.extract(url).await,
            _ => Err(ScrapeError::Extraction(
                "only the rendered strategy extracts from a live page".to_string(),
            )),
        }
    }
}
