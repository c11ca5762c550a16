//! Run configuration.
//!
//! Defaults target the Orange News commentary index. A YAML file can override
//! any subset of fields; command-line flags are applied on top of that.
//!
//! ```yaml
//! index_url: https://www.orangenews.hk/html/topic/index.html
//! timeout_secs: 15
//! boilerplate_labels: ["查看更多", "下載APP"]
//! channel:
//!   title: Orange News - Commentaries
//!   self_url: https://example.com/feed.xml
//! ```

use crate::error::FeedError;
use crate::models::ChannelMeta;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Everything a feed run needs besides the clock.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL that relative article links are resolved against.
    pub base_url: String,
    /// Index page to fetch.
    pub index_url: String,
    pub user_agent: String,
    pub accept_language: String,
    /// Fetch timeout in seconds.
    pub timeout_secs: u64,
    /// Anchor texts that mark navigation chrome rather than articles.
    pub boilerplate_labels: Vec<String>,
    /// Minimum title length, in characters.
    pub min_title_chars: usize,
    /// How many ancestors of a link are searched for a date.
    pub date_search_depth: usize,
    pub channel: ChannelMeta,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.orangenews.hk".to_string(),
            index_url: "https://www.orangenews.hk/html/topic/index.html".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "zh-HK,zh;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            timeout_secs: 30,
            boilerplate_labels: ["查看更多", "下載APP", "登入", "首頁"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_title_chars: 5,
            date_search_depth: 5,
            channel: ChannelMeta::default(),
        }
    }
}

impl FeedConfig {
    /// Parse a YAML document. Missing fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, FeedError> {
        let config: FeedConfig =
            serde_yaml::from_str(yaml).map_err(|e| FeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .await
            .map_err(|e| FeedError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_yaml(&yaml)?;
        info!(index_url = %config.index_url, "Loaded configuration");
        Ok(config)
    }

    /// Check the fields that would otherwise fail late, mid-run.
    pub fn validate(&self) -> Result<(), FeedError> {
        self.base()?;
        Url::parse(&self.index_url)
            .map_err(|e| FeedError::Config(format!("index_url {:?}: {e}", self.index_url)))?;
        if self.min_title_chars == 0 {
            return Err(FeedError::Config(
                "min_title_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The parsed base URL.
    pub fn base(&self) -> Result<Url, FeedError> {
        Url::parse(&self.base_url)
            .map_err(|e| FeedError::Config(format!("base_url {:?}: {e}", self.base_url)))
    }
}
