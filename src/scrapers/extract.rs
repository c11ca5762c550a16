//! Article extraction from a loosely structured index page.
//!
//! The index page has no stable markup for article cards, so every anchor on
//! the page is a candidate. Candidates are kept when their text looks like a
//! headline and their `href` points somewhere real. A date is recovered from
//! the surrounding markup when one is nearby.
//!
//! # Filters
//!
//! Applied in order; the first failure drops the candidate:
//!
//! 1. anchor text is empty after trimming
//! 2. anchor text is a navigation label (`查看更多`, `登入`, ...)
//! 3. anchor text is shorter than the minimum title length (in characters)
//! 4. `href` is missing, empty or `#`
//!
//! Surviving links are made absolute against the base URL and de-duplicated,
//! first occurrence wins.

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::models::ArticleRecord;
use crate::utils::{RunClock, truncate_for_log};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::collections::HashSet;
use tracing::{debug, info, trace};
use url::Url;

/// Elements whose text never renders on the page.
const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date pattern is valid"));

/// Extraction settings resolved from a [`FeedConfig`].
#[derive(Debug, Clone)]
pub struct Extractor {
    base: Url,
    boilerplate: HashSet<String>,
    min_title_chars: usize,
    date_search_depth: usize,
}

impl Extractor {
    pub fn from_config(config: &FeedConfig) -> Result<Self, FeedError> {
        Ok(Self {
            base: config.base()?,
            boilerplate: config.boilerplate_labels.iter().cloned().collect(),
            min_title_chars: config.min_title_chars,
            date_search_depth: config.date_search_depth,
        })
    }

    /// Extract article records from raw markup, in document order.
    ///
    /// Never fails: empty input gives an empty list, and anchors that don't
    /// qualify are skipped.
    pub fn extract(&self, markup: &str, clock: &RunClock) -> Vec<ArticleRecord> {
        if markup.trim().is_empty() {
            debug!("Empty markup; nothing to extract");
            return Vec::new();
        }

        let document = Html::parse_document(markup);
        let mut candidates = 0usize;
        let records: Vec<ArticleRecord> = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "a")
            .inspect(|_| candidates += 1)
            .filter_map(|anchor| self.record_for(anchor, clock))
            .unique_by(|record| record.link.clone())
            .inspect(|record| {
                debug!(
                    title = %truncate_for_log(&record.title, 40),
                    link = %record.link,
                    pub_date = %record.pub_date,
                    "Accepted article"
                )
            })
            .collect();

        info!(candidates, accepted = records.len(), "Extracted articles");
        records
    }

    fn record_for(&self, anchor: ElementRef<'_>, clock: &RunClock) -> Option<ArticleRecord> {
        let (title, link) = match self.qualify(anchor) {
            Ok(found) => found,
            Err(reason) => {
                trace!(reason, href = ?anchor.value().attr("href"), "Skipped anchor");
                return None;
            }
        };

        let pub_date = find_in_ancestors(anchor, self.date_search_depth, &DATE_RE)
            .unwrap_or_else(|| clock.today_string());

        Some(ArticleRecord {
            description: title.clone(),
            title,
            link,
            pub_date,
        })
    }

    /// Apply the candidate filters, returning `(title, absolute link)`.
    fn qualify(&self, anchor: ElementRef<'_>) -> Result<(String, String), &'static str> {
        let text = anchor.text().collect::<String>();
        let title = text.trim();
        if title.is_empty() {
            return Err("empty text");
        }
        if self.boilerplate.contains(title) {
            return Err("navigation label");
        }
        if title.chars().count() < self.min_title_chars {
            return Err("text too short");
        }

        let href = match anchor.value().attr("href") {
            Some(href) if !href.is_empty() && href != "#" => href,
            _ => return Err("missing or placeholder href"),
        };
        let link = self.absolutize(href).ok_or("unresolvable href")?;

        Ok((title.to_string(), link))
    }

    /// Absolute hrefs pass through untouched; relative ones are joined to the base.
    fn absolutize(&self, href: &str) -> Option<String> {
        match Url::parse(href) {
            Ok(_) => Some(href.to_string()),
            Err(_) => self.base.join(href).ok().map(String::from),
        }
    }
}

/// Search the ancestors of `element` for the first match of `pattern`.
///
/// Starts at the immediate parent and walks up at most `depth` levels. Each
/// ancestor is matched against its full visible text, so a date anywhere in a
/// surrounding card is found while dates inside inline scripts and styles are
/// not. Returns `None` if nothing matched within reach.
pub fn find_in_ancestors(element: ElementRef<'_>, depth: usize, pattern: &Regex) -> Option<String> {
    element.ancestors().take(depth).find_map(|scope| {
        let text = scope
            .descendants()
            .filter(|n| {
                !n.ancestors()
                    .take_while(|a| a.id() != scope.id())
                    .any(|a| is_invisible(a.value()))
            })
            .filter_map(|n| n.value().as_text())
            .map(|t| &**t)
            .collect::<String>();
        pattern.find(&text).map(|m| m.as_str().to_string())
    })
}

fn is_invisible(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
}
