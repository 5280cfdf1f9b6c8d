//! Pattern-based extraction strategy
//!
//! The cheapest strategy: no DOM model, just pre-compiled patterns applied in
//! a fixed order. Matching is single-pass and non-recursive per tag type, so
//! nested identical tags (an `<article>` inside an `<article>`) are not fully
//! eliminated. That is a documented limitation of this strategy, traded for
//! its latency.
//!
//! This strategy never errors: malformed markup or an internal failure
//! produces an empty string instead. Availability over correctness.

use regex::Regex;
use tracing::instrument;

/// Content extractor built on pre-compiled patterns
#[derive(Debug)]
pub struct RegexExtractor {
    script: Regex,
    style: Regex,
    header: Regex,
    footer: Regex,
    nav: Regex,
    article: Regex,
    main: Regex,
    body: Regex,
    tag: Regex,
}

impl RegexExtractor {
    /// Compile the pattern set
    pub fn new() -> Self {
        Self {
            script: Regex::new(r"(?is)<script\b[^>]*>[\s\S]*?</script>").unwrap(),
            style: Regex::new(r"(?is)<style\b[^>]*>[\s\S]*?</style>").unwrap(),
            header: Regex::new(r"(?is)<header\b[^>]*>[\s\S]*?</header>").unwrap(),
            footer: Regex::new(r"(?is)<footer\b[^>]*>[\s\S]*?</footer>").unwrap(),
            nav: Regex::new(r"(?is)<nav\b[^>]*>[\s\S]*?</nav>").unwrap(),
            article: Regex::new(r"(?is)<article\b[^>]*>([\s\S]*?)</article>").unwrap(),
            main: Regex::new(r"(?is)<main\b[^>]*>([\s\S]*?)</main>").unwrap(),
            body: Regex::new(r"(?is)<body\b[^>]*>([\s\S]*?)</body>").unwrap(),
            tag: Regex::new(r"<[^>]+>").unwrap(),
        }
    }

    /// Reduce `html` to raw body text
    ///
    /// Steps: drop script/style blocks, drop header/footer/nav blocks,
    /// isolate the content root (`article` > `main` > `body`, falling back to
    /// the whole document), strip remaining tags, decode entities.
    #[instrument(skip(self, html), fields(html_len = html.len()))]
    pub fn extract(&self, html: &str) -> String {
        let mut content = self.script.replace_all(html, "").to_string();
        content = self.style.replace_all(&content, "").to_string();
        content = self.header.replace_all(&content, "").to_string();
        content = self.footer.replace_all(&content, "").to_string();
        content = self.nav.replace_all(&content, "").to_string();

        let region = self.content_root(&content);
        let stripped = self.tag.replace_all(region, " ");

        decode_html_entities(&stripped)
    }

    /// First matching content region by priority, or the whole document
    fn content_root<'a>(&self, html: &'a str) -> &'a str {
        for pattern in [&self.article, &self.main, &self.body] {
            if let Some(captures) = pattern.captures(html) {
                if let Some(inner) = captures.get(1) {
                    return inner.as_str();
                }
            }
        }
        html
    }
}

impl Default for RegexExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode HTML entities, falling back to a manual table for the common ones
/// when the full decoder rejects the input
pub(crate) fn decode_html_entities(text: &str) -> String {
    match htmlescape::decode_html(text) {
        Ok(decoded) => decoded,
        Err(_) => text
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    }
}
