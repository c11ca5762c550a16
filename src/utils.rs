//! Utility types and helpers shared across the pipeline.
//!
//! - [`RunClock`]: the single "now" a run works against
//! - String truncation for log fields
//! - Output directory preparation

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Feed timestamp convention (RFC 822 style, numeric UTC offset).
pub const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// The instant a run is pinned to.
///
/// Captured once at startup and passed down explicitly, so the last build
/// date, the default date for undated articles and any fallback timestamps
/// all agree, and tests can pin time without mocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunClock {
    /// Current wall-clock time in UTC.
    pub now: DateTime<Utc>,
    /// Current local calendar date, used for undated articles.
    pub today: NaiveDate,
}

impl RunClock {
    /// Capture the system clock.
    pub fn system() -> Self {
        let local = Local::now();
        Self {
            now: local.with_timezone(&Utc),
            today: local.date_naive(),
        }
    }

    /// A clock pinned to a UTC instant; `today` is that instant's UTC date.
    #[cfg(test)]
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self {
            now,
            today: now.date_naive(),
        }
    }

    /// `today` formatted as `YYYY-MM-DD`.
    pub fn today_string(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }

    /// `now` in the feed timestamp convention.
    pub fn now_rfc822(&self) -> String {
        self.now.format(RFC822_FORMAT).to_string()
    }
}

/// Truncate a string for logging purposes.
///
/// Keeps at most `max` characters and appends `"…(+N bytes)"` with the number
/// of bytes dropped. Cuts on character boundaries, so CJK titles are safe.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Make sure the directory that will hold `path` exists.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            debug!(parent = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}
