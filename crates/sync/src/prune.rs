//! Cache directory pruning after file deletion.
//!
//! The cache nests by source path segments, so deleting the last file
//! of an item can leave an empty leaf directory and an empty group
//! directory above it.

use std::path::Path;

use tracing::{debug, warn};

/// Files the OS drops into directories that should not keep them alive.
const OS_MARKER_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Prunes `dir` and then its parent group directory.
///
/// A directory is removed when it is empty or contains only OS marker
/// files, which are removed first. Pruning never touches `root` itself
/// or anything outside it; failures are logged and stop the cascade.
pub async fn prune_upward(dir: &Path, root: &Path) {
    if prune_dir(dir, root).await
        && let Some(parent) = dir.parent()
    {
        prune_dir(parent, root).await;
    }
}

async fn prune_dir(dir: &Path, root: &Path) -> bool {
    if dir == root || !dir.starts_with(root) {
        return false;
    }

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    let mut markers = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let name = entry.file_name();
                if OS_MARKER_FILES.iter().any(|m| name.to_string_lossy() == *m) {
                    markers.push(entry.path());
                } else {
                    // Real content, keep the directory.
                    return false;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to scan cache directory");
                return false;
            }
        }
    }

    for marker in markers {
        if let Err(e) = tokio::fs::remove_file(&marker).await {
            warn!(path = %marker.display(), error = %e, "failed to remove marker file");
            return false;
        }
    }

    match tokio::fs::remove_dir(dir).await {
        Ok(()) => {
            debug!(path = %dir.display(), "pruned empty cache directory");
            true
        }
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to remove cache directory");
            false
        }
    }
}
