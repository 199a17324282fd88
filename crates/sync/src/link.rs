//! Symlink lifecycle helpers.
//!
//! Distinguish between a directory entry *existing* (symlink metadata
//! present, target not checked) and a path *resolving* (following links
//! to a real file). A link that exists but does not resolve is dangling.

use std::io;
use std::path::{Path, PathBuf};

/// Creates a symlink at `link` pointing at `target`.
pub async fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        tokio::fs::symlink(target, link).await
    }

    #[cfg(windows)]
    {
        tokio::fs::symlink_file(target, link).await
    }
}

/// Whether a directory entry exists at `path`, without following links.
pub async fn entry_exists(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}

/// Whether `path` resolves to an existing file, following links.
pub async fn resolves(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// A dangling entry exists on disk but points at nothing.
pub async fn is_dangling(path: &Path) -> bool {
    entry_exists(path).await && !resolves(path).await
}

/// Removes the entry at `path` if present.
///
/// Returns whether anything was removed.
pub async fn remove_entry(path: &Path) -> io::Result<bool> {
    if !entry_exists(path).await {
        return Ok(false);
    }
    tokio::fs::remove_file(path).await?;
    Ok(true)
}

/// Resolves a link to its target; a regular file resolves to itself.
pub async fn link_target(path: &Path) -> PathBuf {
    match tokio::fs::read_link(path).await {
        Ok(target) => target,
        Err(_) => path.to_path_buf(),
    }
}
