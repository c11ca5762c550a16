//! Command-line interface definitions for Topic Feed.
//!
//! Flags override values from the optional YAML config file, which in turn
//! overrides the built-in defaults.

use crate::config::FeedConfig;
use clap::Parser;

/// Command-line arguments for the Topic Feed application.
///
/// # Examples
///
/// ```sh
/// # Write feed.xml in the current directory
/// topic_feed
///
/// # Custom output path and config
/// topic_feed -o /srv/www/feed.xml -c topic_feed.yaml
///
/// # Print the feed instead of writing a file
/// topic_feed -o -
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output file path for the RSS feed (`-` for stdout)
    #[arg(short, long, env = "TOPIC_FEED_OUTPUT", default_value = "feed.xml")]
    pub output: String,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Index page URL, overriding the configured one
    #[arg(short, long, env = "TOPIC_FEED_URL")]
    pub url: Option<String>,

    /// Fetch timeout in seconds, overriding the configured one
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    /// Apply command-line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut FeedConfig) {
        if let Some(url) = &self.url {
            config.index_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["topic_feed"]);
        assert_eq!(cli.output, "feed.xml");
        assert!(cli.config.is_none());
        assert!(cli.timeout_secs.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "topic_feed",
            "-o",
            "/tmp/feed.xml",
            "-c",
            "topic_feed.yaml",
            "-u",
            "https://example.com/index.html",
        ]);

        assert_eq!(cli.output, "/tmp/feed.xml");
        assert_eq!(cli.config.as_deref(), Some("topic_feed.yaml"));
        assert_eq!(cli.url.as_deref(), Some("https://example.com/index.html"));
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::parse_from([
            "topic_feed",
            "--url",
            "https://example.com/news.html",
            "--timeout-secs",
            "7",
        ]);
        let mut config = FeedConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.index_url, "https://example.com/news.html");
        assert_eq!(config.timeout_secs, 7);
        assert_eq!(config.base_url, FeedConfig::default().base_url);
    }
}
