//! Data models for extracted articles and the feed channel.
//!
//! - [`ArticleRecord`]: one article listing found on the index page
//! - [`ChannelMeta`]: the fixed metadata describing the generated feed

use serde::Deserialize;

/// One article listing extracted from the index page.
///
/// Records are built once by the extractor and consumed once by the
/// renderer. Within one extraction run, `link` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Trimmed anchor text.
    pub title: String,
    /// Absolute URL of the article.
    pub link: String,
    /// Publication date as found on the page, in `YYYY-MM-DD` form.
    ///
    /// This is the raw matched text, so it is not guaranteed to be a real
    /// calendar date. The renderer falls back to the current time for those.
    pub pub_date: String,
    /// Item description. The index page has no summaries, so this is the title.
    pub description: String,
}

/// Channel-level metadata written at the top of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelMeta {
    /// Feed title.
    pub title: String,
    /// The page the feed is generated from.
    pub link: String,
    /// Feed description.
    pub description: String,
    /// Language code, e.g. `zh-cn`.
    pub language: String,
    /// Where the feed itself is published (`atom:link rel="self"`).
    pub self_url: String,
}

impl Default for ChannelMeta {
    fn default() -> Self {
        Self {
            title: "Orange News - Commentaries".to_string(),
            link: "https://www.orangenews.hk/html/topic/index.html".to_string(),
            description: "Latest commentaries from Orange News HK".to_string(),
            language: "zh-cn".to_string(),
            self_url: "https://totrphbm.manus.space/feed.xml".to_string(),
        }
    }
}
