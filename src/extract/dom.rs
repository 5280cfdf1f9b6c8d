//! Structure-aware extraction strategy
//!
//! Parses the document into a real tree and walks it, which handles the
//! nesting and malformed-markup cases the pattern strategy cannot. The
//! content root is the first of `article`, `main`, `body` present in the
//! document; `header`, `footer` and `nav` elements are removed from the
//! selected root only - the walk never leaves it, so nodes outside the root
//! are untouched by construction.
//!
//! Unlike the pattern strategy this one fails hard: a document with no
//! readable content region is an extraction error, not an empty success.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::error::ScrapeError;

/// Elements whose entire subtree is noise, not content
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "header", "footer", "nav"];

/// Content extractor over a parsed HTML tree
#[derive(Debug, Default)]
pub struct DomExtractor;

impl DomExtractor {
    /// Create a DOM extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract the concatenated text of the content root's subtree
    #[instrument(skip(self, html), fields(html_len = html.len()))]
    pub fn extract(&self, html: &str) -> Result<String, ScrapeError> {
        let document = Html::parse_document(html);

        let root = Self::content_root(&document).ok_or_else(|| {
            ScrapeError::Extraction("document has no content region".to_string())
        })?;

        let mut parts: Vec<String> = Vec::new();
        Self::collect_text(&root, &mut parts);
        let text = parts.join(" ");

        if text.trim().is_empty() {
            return Err(ScrapeError::Extraction(
                "content region contains no readable text".to_string(),
            ));
        }

        debug!("Collected {} text fragments", parts.len());
        Ok(text)
    }

    /// First existing element among `article`, `main`, `body`, in that order
    fn content_root(document: &Html) -> Option<ElementRef<'_>> {
        for name in ["article", "main", "body"] {
            let selector = Selector::parse(name).unwrap();
            if let Some(element) = document.select(&selector).next() {
                return Some(element);
            }
        }
        None
    }

    /// Recursive text collection that skips noise subtrees
    fn collect_text(element: &ElementRef<'_>, parts: &mut Vec<String>) {
        let tag = element.value().name();
        if SKIP_TAGS.contains(&tag) {
            return;
        }

        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            } else if let Some(child_element) = ElementRef::wrap(child) {
                Self::collect_text(&child_element, parts);
            }
        }
    }
}
