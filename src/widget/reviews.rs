//! On-page review snippets used to enrich the product context.

use crate::error::WidgetError;
use crate::utils::text::{normalize_whitespace, truncate_with_ellipsis};
use scraper::{Html, Selector};

pub const MAX_REVIEW_SNIPPETS: usize = 3;
const MAX_SNIPPET_CHARS: usize = 300;

/// Review widgets commonly found on Shopify themes, in priority order.
pub const DEFAULT_REVIEW_SELECTORS: &[&str] = &[
    ".spr-review-content-body",
    ".jdgm-rev__body",
    ".yotpo-review-content",
    ".stamped-review-content-body",
    ".review-content",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewContext {
    selector: Option<String>,
    snippets: Vec<String>,
}

impl ReviewContext {
    /// Use the first selector matching at least one element; take up to
    /// three non-empty snippets from it in document order.
    pub fn collect(html: &str, selectors: &[&str]) -> Result<Self, WidgetError> {
        let document = Html::parse_document(html);

        for raw in selectors {
            let selector = Selector::parse(raw)
                .map_err(|e| WidgetError::InvalidSelector(format!("{raw}: {e}")))?;

            let mut matches = document.select(&selector).peekable();
            if matches.peek().is_none() {
                continue;
            }

            let snippets = matches
                .map(|el| normalize_whitespace(&el.text().collect::<String>()))
                .filter(|text| !text.is_empty())
                .take(MAX_REVIEW_SNIPPETS)
                .map(|text| truncate_with_ellipsis(&text, MAX_SNIPPET_CHARS))
                .collect();

            return Ok(Self {
                selector: Some((*raw).to_string()),
                snippets,
            });
        }

        Ok(Self::default())
    }

    pub fn from_snippets(snippets: impl IntoIterator<Item = String>) -> Self {
        Self {
            selector: None,
            snippets: snippets
                .into_iter()
                .map(|s| normalize_whitespace(&s))
                .filter(|s| !s.is_empty())
                .take(MAX_REVIEW_SNIPPETS)
                .collect(),
        }
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn snippets(&self) -> &[String] {
        &self.snippets
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

/// Append review snippets to the base product description.
pub fn product_context(base: &str, reviews: &ReviewContext) -> String {
    let base = base.trim();
    if reviews.is_empty() {
        return base.to_string();
    }

    let mut out = String::from(base);
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str("Customer reviews:");
    for snippet in reviews.snippets() {
        out.push_str("\n- ");
        out.push_str(snippet);
    }
    out
}
