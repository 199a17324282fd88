//! Data model and persisted manifest of installed commands.
//!
//! The manifest is a single JSON document mapping identifiers to
//! [`InstalledRecord`]s. Other subsystems read it to render lists and
//! controls; only the synchronizer writes it.

mod store;
mod types;

pub use store::{ContentStore, MANIFEST_VERSION, StoreError, default_manifest_path};
pub use types::{
    FileHandle, IconVariants, InstallableItem, InstalledRecord, InvalidItem, RecordFiles, SyncState,
};
