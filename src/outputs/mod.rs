//! Output generation.
//!
//! # Submodules
//!
//! - [`rss`]: renders article records into an RSS 2.0 document
//! - [`file`]: writes the rendered document to disk or stdout
//!
//! Rendering finishes entirely in memory before [`file::write_feed`] is
//! called, so a failed run never leaves a partial feed behind.

pub mod file;
pub mod rss;
