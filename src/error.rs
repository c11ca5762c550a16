//! Error taxonomy for a feed run.
//!
//! Every variant is terminal for the run that produced it. Per-record anomalies
//! (such as an unparseable publication date) are recovered where they occur
//! and never reach this type.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a feed run.
///
/// Each variant maps to a distinct process exit code through
/// [`FeedError::exit_code`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// Config file unreadable, invalid YAML, or a configured value is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Network-level or HTTP status failure while fetching the index page
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The index page was fetched but its body is empty
    #[error("Index page {0} returned no content")]
    EmptyPage(String),
    /// No link on the page qualified as an article
    #[error("No articles found on {0}")]
    NoArticles(String),
    /// The XML writer failed while serializing the feed
    #[error("Failed to render feed: {0}")]
    Render(String),
    /// The rendered feed could not be persisted
    #[error("Failed to write feed to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FeedError {
    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            FeedError::Config(_) => 1,
            FeedError::Fetch { .. } | FeedError::EmptyPage(_) => 2,
            FeedError::NoArticles(_) => 3,
            FeedError::Write { .. } => 4,
            FeedError::Render(_) => 5,
        }
    }
}
