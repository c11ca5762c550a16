//! The in-memory half of a run: markup in, feed document out.

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::models::ArticleRecord;
use crate::outputs::rss::render_feed;
use crate::scrapers::extract::Extractor;
use crate::utils::RunClock;

/// A rendered feed together with the records it was built from.
#[derive(Debug)]
pub struct BuiltFeed {
    pub records: Vec<ArticleRecord>,
    pub document: String,
}

/// Extract articles from `markup` and render them as RSS.
///
/// # Arguments
///
/// * `markup` - Raw HTML of the index page
/// * `config` - Extraction settings and channel metadata
/// * `clock` - The run's time; supplies default dates and `lastBuildDate`
///
/// # Returns
///
/// The accepted records and the serialized document built from them.
///
/// # Errors
///
/// - [`FeedError::NoArticles`] when nothing qualifies, so an empty feed is
///   never produced
/// - [`FeedError::Config`] if the base URL does not parse
/// - [`FeedError::Render`] if the XML writer fails
pub fn build_feed(
    markup: &str,
    config: &FeedConfig,
    clock: &RunClock,
) -> Result<BuiltFeed, FeedError> {
    let records = Extractor::from_config(config)?.extract(markup, clock);
    if records.is_empty() {
        return Err(FeedError::NoArticles(config.index_url.clone()));
    }
    let document = render_feed(&records, &config.channel, clock)?;
    Ok(BuiltFeed { records, document })
}
