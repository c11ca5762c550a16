//! Persisting the rendered feed.
//!
//! The feed is written to a sibling `.tmp` file and renamed over the target,
//! so readers of the destination only ever see a complete document. The path
//! `-` sends the feed to stdout instead.

use crate::error::FeedError;
use crate::utils::ensure_parent_dir;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

/// Where the feed goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedTarget {
    Stdout,
    File(PathBuf),
}

impl FeedTarget {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            FeedTarget::Stdout
        } else {
            FeedTarget::File(PathBuf::from(arg))
        }
    }
}

/// Write `feed` to `target`.
///
/// # Arguments
///
/// * `target` - Stdout, or the file path the feed replaces
/// * `feed` - The complete rendered document
///
/// # Returns
///
/// `Ok(())` once the feed is in place, or [`FeedError::Write`] naming the
/// path if directory creation, the temporary write or the rename fails. The
/// previous file at the destination is left as it was on failure.
#[instrument(level = "info", skip_all, fields(target = ?target))]
pub async fn write_feed(target: &FeedTarget, feed: &str) -> Result<(), FeedError> {
    match target {
        FeedTarget::Stdout => {
            let mut stdout = tokio::io::stdout();
            let written = async {
                stdout.write_all(feed.as_bytes()).await?;
                stdout.flush().await
            }
            .await;
            written.map_err(|source| FeedError::Write {
                path: PathBuf::from("-"),
                source,
            })
        }
        FeedTarget::File(path) => write_file(path, feed).await,
    }
}

async fn write_file(path: &Path, feed: &str) -> Result<(), FeedError> {
    let write_err = |source| FeedError::Write {
        path: path.to_path_buf(),
        source,
    };

    ensure_parent_dir(path).await.map_err(write_err)?;

    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, feed).await {
        error!(tmp = %tmp.display(), error = %e, "Failed writing temporary feed file");
        let _ = fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        error!(tmp = %tmp.display(), error = %e, "Failed moving feed into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }

    info!(path = %path.display(), bytes = feed.len(), "Wrote RSS feed");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("feed"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("topic_feed_{tag}_{}", std::process::id()))
    }

    #[test]
    fn test_target_from_arg() {
        assert_eq!(FeedTarget::from_arg("-"), FeedTarget::Stdout);
        assert_eq!(
            FeedTarget::from_arg("out/feed.xml"),
            FeedTarget::File(PathBuf::from("out/feed.xml"))
        );
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("/srv/www/feed.xml")),
            PathBuf::from("/srv/www/feed.xml.tmp")
        );
    }

    #[tokio::test]
    async fn test_write_creates_dirs_and_replaces_existing() {
        let dir = scratch_dir("write");
        let path = dir.join("nested/feed.xml");
        let target = FeedTarget::File(path.clone());

        write_feed(&target, "<rss>old</rss>\n").await.unwrap();
        write_feed(&target, "<rss>new</rss>\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<rss>new</rss>\n");
        assert!(!temp_path(&path).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_write_into_file_as_directory_fails() {
        let dir = scratch_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        let target = FeedTarget::File(blocker.join("feed.xml"));
        let err = write_feed(&target, "<rss/>").await.unwrap_err();
        assert!(matches!(err, FeedError::Write { .. }));
        assert_eq!(err.exit_code(), 4);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
