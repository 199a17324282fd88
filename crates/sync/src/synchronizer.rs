//! The synchronization core: install, delete, finish setup, refresh.
//!
//! Construct one `CommandSynchronizer` at process start and pass it
//! explicitly to whatever needs it, alongside the `ContentStore` it
//! writes into.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use scriptdock_paths::CommandPaths;
use scriptdock_store::{ContentStore, FileHandle, InstallableItem, InstalledRecord, RecordFiles, SyncState};
use tracing::{debug, info, warn};

use crate::download::Downloader;
use crate::error::SyncError;
use crate::{hash, link, prune};

/// Outcome of one file category during delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Link and cached file removed from disk.
    Removed,
    /// Icon left in place because another record references it.
    KeptShared,
    /// Nothing was on disk to remove.
    Missing,
}

/// What a delete actually removed, per file category.
///
/// A kept shared icon is a success outcome: the record's claim on the
/// icon is released even though the file stays for its other users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    pub command: RemovalOutcome,
    pub icon_light: Option<RemovalOutcome>,
    pub icon_dark: Option<RemovalOutcome>,
}

impl DeleteReport {
    /// True when at least one category was removed or deliberately kept.
    pub fn any_effect(&self) -> bool {
        [Some(self.command), self.icon_light, self.icon_dark]
            .into_iter()
            .flatten()
            .any(|outcome| outcome != RemovalOutcome::Missing)
    }
}

/// Synchronizes installed commands between the remote repository, the
/// local cache layout and the manifest.
pub struct CommandSynchronizer {
    paths: CommandPaths,
    store: Arc<ContentStore>,
    downloader: Arc<dyn Downloader>,
    remote_base: String,
    /// Per-identifier operation locks. Entries are never evicted; the
    /// registry is bounded by the number of distinct identifiers seen.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl CommandSynchronizer {
    /// Creates a new synchronizer.
    ///
    /// `remote_base` is the repository base URL; command files are
    /// fetched from `<base>/commands/<path>/<filename>` and icons from
    /// `<base>/<icon-relative-path>`.
    pub fn new(
        paths: CommandPaths,
        store: Arc<ContentStore>,
        downloader: Arc<dyn Downloader>,
        remote_base: impl Into<String>,
    ) -> Self {
        let remote_base = remote_base.into().trim_end_matches('/').to_string();
        Self {
            paths,
            store,
            downloader,
            remote_base,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Installs an item: downloads command file and icon variants into
    /// the cache, creates links, records the result in the store.
    ///
    /// Idempotent: files already present in the cache or shared-icons
    /// folder are reused instead of re-downloaded. Icon failures are
    /// never fatal; a command link that does not resolve afterwards is.
    pub async fn install(&self, item: &InstallableItem) -> Result<SyncState, SyncError> {
        item.validate()?;
        let op_lock = self.operation_lock(&item.identifier);
        let _guard = op_lock.lock().await;

        let cache_dir = self.paths.cache_dir(&item.path);
        tokio::fs::create_dir_all(&cache_dir).await?;

        let light = item.icon.as_ref().and_then(|i| i.light.as_deref());
        let dark = item.icon.as_ref().and_then(|i| i.dark.as_deref());
        let icon_light = self.install_icon(item, &cache_dir, light).await;
        let icon_dark = self.install_icon(item, &cache_dir, dark).await;

        let command = self.install_command(item, &cache_dir).await?;
        let content_hash = hash::file_checksum(&command.path)?;

        let record = InstalledRecord {
            identifier: item.identifier.clone(),
            needs_setup: item.is_template,
            content_hash,
            files: RecordFiles {
                command,
                icon_light,
                icon_dark,
            },
            source: item.clone(),
        };
        let state = record.state();
        self.store.save(record)?;

        info!(identifier = %item.identifier, ?state, "installed command");
        Ok(state)
    }

    /// Deletes an installed item: removes its command file and link,
    /// removes icons unless shared, prunes emptied cache directories,
    /// and drops the record from the store.
    ///
    /// Fails with [`SyncError::NothingDeleted`] when nothing at all was
    /// on disk, leaving the record untouched.
    pub async fn delete(&self, identifier: &str) -> Result<DeleteReport, SyncError> {
        let op_lock = self.operation_lock(identifier);
        let _guard = op_lock.lock().await;

        let record = self
            .store
            .get(identifier)
            .ok_or_else(|| SyncError::NotInstalled(identifier.to_string()))?;
        let all = self.store.all();

        let icon_light = match &record.files.icon_light {
            Some(handle) => Some(self.delete_icon(handle, &all).await),
            None => None,
        };
        let icon_dark = match &record.files.icon_dark {
            Some(handle) => Some(self.delete_icon(handle, &all).await),
            None => None,
        };

        // The command file is never shared.
        let command = self.delete_files(&record.files.command).await;

        let report = DeleteReport {
            command,
            icon_light,
            icon_dark,
        };
        if !report.any_effect() {
            return Err(SyncError::NothingDeleted(identifier.to_string()));
        }

        self.store.remove(identifier)?;
        info!(identifier, ?report, "deleted command");
        Ok(report)
    }

    /// Promotes a template install to a regular one.
    ///
    /// Renames the `.template` link to the final name, recomputes the
    /// content hash from the cached file and clears `needs_setup`.
    pub async fn finish_setup(&self, identifier: &str) -> Result<SyncState, SyncError> {
        let op_lock = self.operation_lock(identifier);
        let _guard = op_lock.lock().await;

        let mut record = self
            .store
            .get(identifier)
            .ok_or_else(|| SyncError::NotInstalled(identifier.to_string()))?;

        let template_link = self.paths.command_link(identifier, true);
        let final_link = self.paths.command_link(identifier, false);

        if link::entry_exists(&template_link).await {
            tokio::fs::rename(&template_link, &final_link).await?;
        } else if link::resolves(&final_link).await {
            // Rename already happened; persist was interrupted last time.
            debug!(identifier, "template link already renamed");
        } else {
            return Err(SyncError::TemplateLinkMissing(identifier.to_string()));
        }

        if !link::resolves(&final_link).await {
            return Err(SyncError::LinkInconsistency(format!(
                "command link {} does not resolve",
                final_link.display()
            )));
        }

        record.content_hash = hash::file_checksum(&record.files.command.path)?;
        record.needs_setup = false;
        record.files.command.link = final_link;
        self.store.save(record)?;

        info!(identifier, "finished setup");
        Ok(SyncState::Installed)
    }

    /// Recomputes and persists the content hash of the cached file.
    ///
    /// Returns `Ok(None)` when the cached file is missing; this is
    /// opportunistic drift detection, not a correctness gate.
    pub async fn refresh_hash(&self, identifier: &str) -> Result<Option<String>, SyncError> {
        let op_lock = self.operation_lock(identifier);
        let _guard = op_lock.lock().await;

        let mut record = self
            .store
            .get(identifier)
            .ok_or_else(|| SyncError::NotInstalled(identifier.to_string()))?;

        if !link::resolves(&record.files.command.path).await {
            debug!(identifier, "cached file missing, skipping hash refresh");
            return Ok(None);
        }

        let checksum = hash::file_checksum(&record.files.command.path)?;
        record.content_hash = checksum.clone();
        self.store.save(record)?;
        Ok(Some(checksum))
    }

    // -----------------------------------------------------------------------
    // Install internals
    // -----------------------------------------------------------------------

    /// Installs one icon variant.
    ///
    /// Never fatal: any failure is logged and yields `None`. A
    /// downloaded but unlinked icon file is a harmless cache orphan.
    async fn install_icon(
        &self,
        item: &InstallableItem,
        cache_dir: &Path,
        relative: Option<&str>,
    ) -> Option<FileHandle> {
        let relative = relative.filter(|r| !r.is_empty())?;
        let filename = Path::new(relative).file_name()?.to_string_lossy().into_owned();
        let link_path = self.paths.icon_link(&filename);

        // Shared icon already present: reuse it instead of re-downloading.
        if link::resolves(&link_path).await {
            let target = link::link_target(&link_path).await;
            debug!(identifier = %item.identifier, icon = %filename, "reusing shared icon");
            return Some(FileHandle {
                path: target,
                link: link_path,
            });
        }

        // A dangling leftover would block link creation; replace it so a
        // failed install can be retried by installing again.
        if link::is_dangling(&link_path).await {
            warn!(path = %link_path.display(), "replacing dangling icon link");
            if let Err(e) = link::remove_entry(&link_path).await {
                warn!(path = %link_path.display(), error = %e, "failed to remove dangling icon link");
                return None;
            }
        }

        let url = self.icon_url(relative);
        let cached = match self.downloader.fetch(&url, cache_dir, &filename).await {
            Ok(path) => path,
            Err(e) => {
                warn!(identifier = %item.identifier, icon = %filename, error = %e, "icon download failed");
                return None;
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(self.paths.images_dir()).await {
            warn!(error = %e, "failed to create shared icons folder");
            return None;
        }
        if !link::entry_exists(&link_path).await
            && let Err(e) = link::create_symlink(&cached, &link_path).await
        {
            warn!(path = %link_path.display(), error = %e, "failed to create icon link");
            return None;
        }

        Some(FileHandle {
            path: cached,
            link: link_path,
        })
    }

    /// Downloads the command file if absent and ensures its user-facing
    /// link resolves.
    async fn install_command(
        &self,
        item: &InstallableItem,
        cache_dir: &Path,
    ) -> Result<FileHandle, SyncError> {
        let cached = self.paths.cached_file(&item.path, &item.filename);
        if link::resolves(&cached).await {
            debug!(identifier = %item.identifier, "command file already cached");
        } else {
            let url = self.command_url(item);
            self.downloader.fetch(&url, cache_dir, &item.filename).await?;
        }

        let link_path = self.paths.command_link(&item.identifier, item.is_template);
        if link::is_dangling(&link_path).await {
            warn!(path = %link_path.display(), "replacing dangling command link");
            link::remove_entry(&link_path).await?;
        }
        if !link::entry_exists(&link_path).await {
            link::create_symlink(&cached, &link_path).await?;
        }

        // A half-downloaded file with no working link is not installed.
        if !link::resolves(&link_path).await {
            return Err(SyncError::LinkInconsistency(format!(
                "command link {} does not resolve",
                link_path.display()
            )));
        }

        Ok(FileHandle {
            path: cached,
            link: link_path,
        })
    }

    // -----------------------------------------------------------------------
    // Delete internals
    // -----------------------------------------------------------------------

    /// Deletes one icon handle unless another record still references
    /// its filename.
    ///
    /// Liveness is computed by re-scanning all records rather than a
    /// stored counter, so out-of-band file removal cannot make the
    /// count drift from reality. The scan counts records, not handles:
    /// the record being deleted counts once even when both its variants
    /// share a filename.
    async fn delete_icon(&self, handle: &FileHandle, all: &[InstalledRecord]) -> RemovalOutcome {
        let Some(filename) = handle.link_filename() else {
            return RemovalOutcome::Missing;
        };

        let references = all
            .iter()
            .filter(|record| record.references_icon(filename))
            .count();
        if references >= 2 {
            debug!(icon = %filename.to_string_lossy(), references, "icon still shared, keeping");
            return RemovalOutcome::KeptShared;
        }

        self.delete_files(handle).await
    }

    /// Removes a handle's link and cached file, then prunes the cache
    /// directory the file lived in.
    async fn delete_files(&self, handle: &FileHandle) -> RemovalOutcome {
        let mut removed = false;

        match link::remove_entry(&handle.link).await {
            Ok(r) => removed |= r,
            Err(e) => {
                warn!(path = %handle.link.display(), error = %e, "failed to remove link")
            }
        }

        match link::remove_entry(&handle.path).await {
            Ok(true) => {
                removed = true;
                if let Some(dir) = handle.path.parent() {
                    prune::prune_upward(dir, &self.paths.commands_dir()).await;
                }
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = %handle.path.display(), error = %e, "failed to remove cached file")
            }
        }

        if removed {
            RemovalOutcome::Removed
        } else {
            RemovalOutcome::Missing
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn operation_lock(&self, identifier: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(identifier.to_string()).or_default().clone()
    }

    fn command_url(&self, item: &InstallableItem) -> String {
        format!(
            "{}/commands/{}/{}",
            self.remote_base,
            item.path.trim_matches('/'),
            item.filename
        )
    }

    fn icon_url(&self, relative: &str) -> String {
        format!("{}/{}", self.remote_base, relative.trim_start_matches('/'))
    }
}
