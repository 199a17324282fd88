//! Synchronizer error taxonomy.

use crate::download::DownloadError;

/// Errors produced by synchronization operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    #[error("store error: {0}")]
    Store(#[from] scriptdock_store::StoreError),

    #[error("invalid item: {0}")]
    InvalidItem(#[from] scriptdock_store::InvalidItem),

    #[error("not installed: {0}")]
    NotInstalled(String),

    #[error("link inconsistency: {0}")]
    LinkInconsistency(String),

    #[error("template link missing for {0}")]
    TemplateLinkMissing(String),

    #[error("nothing to delete for {0}")]
    NothingDeleted(String),
}
