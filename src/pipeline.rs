//! Scraping pipeline
//!
//! Glue between the stages: fetch raw HTML, run the configured extraction
//! strategy, normalize the result. The rendered strategy bypasses the fetcher
//! because it requires a live browsing context and therefore owns its own
//! network access.
//!
//! Everything here is request-scoped; the pipeline holds no mutable state
//! across requests.

use std::time::Instant;

use tracing::{info, instrument};

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::extract::Extractor;
use crate::fetch::Fetcher;
use crate::normalize::{ExtractedText, Normalizer};

/// Fetch -> extract -> normalize, with the strategy fixed at construction
#[derive(Debug)]
pub struct ScrapePipeline {
    fetcher: Fetcher,
    extractor: Extractor,
    normalizer: Normalizer,
}

impl ScrapePipeline {
    /// Assemble a pipeline from the injected configuration
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            fetcher: Fetcher::new(config),
            extractor: Extractor::new(config),
            normalizer: Normalizer::new(config.max_words),
        }
    }

    /// Run the full pipeline for one URL
    ///
    /// The caller has already validated that `url` is present; an empty URL
    /// reaching this point is a programming error upstream, not a condition
    /// this layer re-checks.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn run(&self, url: &str) -> Result<ExtractedText, ScrapeError> {
        let started = Instant::now();

        let raw_text = if self.extractor.owns_network_access() {
            self.extractor.extract_live(url).await?
        } else {
            let document = self.fetcher.fetch(url).await?;
            self.extractor.extract_document(&document)?
        };

        let extracted = self.normalizer.normalize(&raw_text);

        info!(
            "Scraped {} words in {}ms",
            extracted.word_count(),
            started.elapsed().as_millis()
        );

        Ok(extracted)
    }
}
