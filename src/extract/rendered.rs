//! Headless-browser extraction strategy
//!
//! Highest fidelity, highest cost: launches an isolated browser instance per
//! request, navigates to the target directly (this strategy owns its network
//! access - a live browsing context cannot run against a pre-fetched body),
//! waits for navigation to settle within a bounded budget, and reads the
//! visible text of the post-script document.
//!
//! The browser instance is the one stateful resource in the pipeline. It is
//! released on every exit path - success, extraction failure, or timeout.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::{debug, instrument, warn};

use crate::error::ScrapeError;

/// In-page extraction script: applies the shared content-root priority rule
/// (`article` > `main` > `body`) against the live DOM, drops
/// header/footer/nav inside the selected root, and returns its visible text.
const EXTRACT_SCRIPT: &str = r#"
    (() => {
        const root =
            document.querySelector('article') ||
            document.querySelector('main') ||
            document.body;
        if (!root) return '';
        const clone = root.cloneNode(true);
        clone.querySelectorAll('script, style, noscript, header, footer, nav')
            .forEach((el) => el.remove());
        return clone.textContent || '';
    })()
"#;

/// Content extractor driving a headless browser
#[derive(Debug)]
pub struct RenderedExtractor {
    navigation_timeout: Duration,
}

impl RenderedExtractor {
    /// Create a rendered extractor with the given navigation budget
    pub fn new(navigation_timeout: Duration) -> Self {
        Self { navigation_timeout }
    }

    /// Navigate to `url`, render it, and extract the content root's text
    ///
    /// The whole navigate-and-read sequence shares one timeout; hitting it is
    /// a [`ScrapeError::Navigation`]. There is no automatic fallback to a
    /// cheaper strategy.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn extract(&self, url: &str) -> Result<String, ScrapeError> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(ScrapeError::Navigation)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Navigation(format!("failed to launch browser: {}", e)))?;

        // The handler must keep pumping CDP messages until the browser is
        // closed, including during teardown.
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let outcome =
            tokio::time::timeout(self.navigation_timeout, render_text(&browser, url)).await;

        // Release the browser on every path before inspecting the outcome.
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = browser.wait().await;
        handler_task.abort();

        let text = match outcome {
            Ok(result) => result?,
            Err(_) => {
                return Err(ScrapeError::Navigation(format!(
                    "navigation did not settle within {}s",
                    self.navigation_timeout.as_secs()
                )))
            }
        };

        if text.trim().is_empty() {
            return Err(ScrapeError::Extraction(
                "rendered document contains no readable text".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Navigate and read the rendered text; split out so the caller can wrap the
/// whole sequence in a single timeout
async fn render_text(browser: &Browser, url: &str) -> Result<String, ScrapeError> {
    let page = browser
        .new_page(url)
        .await
        .map_err(|e| ScrapeError::Navigation(format!("failed to open page: {}", e)))?;

    page.wait_for_navigation()
        .await
        .map_err(|e| ScrapeError::Navigation(format!("navigation failed: {}", e)))?;

    debug!("Navigation settled, evaluating extraction script");

    let text: String = page
        .evaluate(EXTRACT_SCRIPT)
        .await
        .map_err(|e| ScrapeError::Extraction(e.to_string()))?
        .into_value()
        .map_err(|e| ScrapeError::Extraction(e.to_string()))?;

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_budget_is_stored() {
        let extractor = RenderedExtractor::new(Duration::from_secs(30));
        assert_eq!(extractor.navigation_timeout, Duration::from_secs(30));
    }

    // Browser-dependent tests require a running Chrome/Chromium instance and
    // are ignored by default. Run with `--ignored` to include them.

    #[tokio::test]
    #[ignore]
    async fn test_extracts_rendered_text() {
        let extractor = RenderedExtractor::new(Duration::from_secs(30));
        let text = extractor.extract("https://example.com").await.unwrap();
        assert!(!text.trim().is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_unreachable_url_is_navigation_error() {
        let extractor = RenderedExtractor::new(Duration::from_secs(10));
        let err = extractor
            .extract("http://127.0.0.1:1/nothing-here")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Navigation(_)));
    }
}
