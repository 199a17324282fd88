//! Installed-command synchronization engine.
//!
//! Downloads command files and their icon variants into a
//! content-addressed cache, exposes them through flat user-facing
//! symlinks, and records the result in the manifest owned by
//! `scriptdock-store`. Shared icons are reference-counted by re-scan;
//! delete cascades through links, cached files and empty directories.

mod download;
mod error;
mod hash;
mod link;
mod prune;
mod synchronizer;

pub use download::{DownloadError, Downloader, HttpDownloader};
pub use error::SyncError;
pub use hash::{checksum_bytes, file_checksum};
pub use synchronizer::{CommandSynchronizer, DeleteReport, RemovalOutcome};
