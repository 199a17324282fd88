//! Durable manifest store.
//!
//! Records are cached in memory and the whole document is rewritten on
//! every mutation, so a mutation is complete only once persisted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{InstalledRecord, SyncState};

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// Errors from manifest persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk manifest document.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    commands: HashMap<String, InstalledRecord>,
}

/// Persistent manifest of installed commands.
///
/// Load is fail-soft: an unreadable or unparsable manifest resets to
/// empty rather than propagating. Losing the index is recoverable
/// through re-install; crashing the host is not.
pub struct ContentStore {
    path: PathBuf,
    records: RwLock<HashMap<String, InstalledRecord>>,
}

impl ContentStore {
    /// Opens the manifest at `path`, creating an empty one if missing.
    ///
    /// Persists immediately, so later reads never see a missing file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = load_records(&path);
        let store = Self {
            path,
            records: RwLock::new(records),
        };
        store.persist()?;
        Ok(store)
    }

    /// Returns the record for `identifier`, if any.
    pub fn get(&self, identifier: &str) -> Option<InstalledRecord> {
        self.records.read().unwrap().get(identifier).cloned()
    }

    /// Upserts a record by identifier and persists the manifest.
    pub fn save(&self, record: InstalledRecord) -> Result<(), StoreError> {
        {
            let mut map = self.records.write().unwrap();
            map.insert(record.identifier.clone(), record);
        }
        self.persist()
    }

    /// Removes a record; persists only when something was removed.
    pub fn remove(&self, identifier: &str) -> Result<Option<InstalledRecord>, StoreError> {
        let removed = {
            let mut map = self.records.write().unwrap();
            map.remove(identifier)
        };
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Returns every stored record (used for the icon liveness scan).
    pub fn all(&self) -> Vec<InstalledRecord> {
        self.records.read().unwrap().values().cloned().collect()
    }

    /// Lifecycle state of `identifier`; absence means `NotInstalled`.
    pub fn state_of(&self, identifier: &str) -> SyncState {
        match self.get(identifier) {
            Some(record) => record.state(),
            None => SyncState::NotInstalled,
        }
    }

    /// Number of installed records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes the full map and atomically replaces the document.
    pub fn persist(&self) -> Result<(), StoreError> {
        let manifest = Manifest {
            version: MANIFEST_VERSION,
            commands: self.records.read().unwrap().clone(),
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write a sibling temp file, then rename over the document.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(
            records = manifest.commands.len(),
            path = %self.path.display(),
            "persisted manifest"
        );
        Ok(())
    }
}

/// Loads records from the manifest, resetting to empty on any failure.
fn load_records(path: &Path) -> HashMap<String, InstalledRecord> {
    if !path.exists() {
        return HashMap::new();
    }

    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read manifest, starting empty");
            return HashMap::new();
        }
    };

    let manifest: Manifest = match serde_json::from_str(&data) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse manifest, starting empty");
            return HashMap::new();
        }
    };

    if manifest.version != MANIFEST_VERSION {
        warn!(
            version = manifest.version,
            expected = MANIFEST_VERSION,
            "unknown manifest version, starting empty"
        );
        return HashMap::new();
    }

    debug!(records = manifest.commands.len(), path = %path.display(), "loaded manifest");
    manifest.commands
}

/// Returns the default manifest path under the platform config directory.
pub fn default_manifest_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("scriptdock").join("manifest.json"))
}

/// Returns the platform-specific config directory.
fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config"))
    }
}
