//! Index page scraping.
//!
//! Scraping happens in two phases:
//!
//! 1. **Fetching** ([`fetch`]): download the topic index page
//! 2. **Extraction** ([`extract`]): turn its anchors into [`ArticleRecord`]s
//!
//! Extraction is pure and never fails; only fetching touches the network.
//!
//! [`ArticleRecord`]: crate::models::ArticleRecord

pub mod extract;
pub mod fetch;
