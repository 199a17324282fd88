//! Persisted data model: installable items, file handles, records.

use std::ffi::OsStr;
use std::path::PathBuf;

use scriptdock_paths::{PathError, validate_relative_path};
use serde::{Deserialize, Serialize};

/// Validation errors for an [`InstallableItem`] received at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum InvalidItem {
    #[error("empty identifier")]
    EmptyIdentifier,

    #[error("empty filename")]
    EmptyFilename,

    #[error("invalid {field}: {source}")]
    Path {
        field: &'static str,
        #[source]
        source: PathError,
    },
}

/// Remote-described item to install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallableItem {
    /// Stable unique identifier within the remote repository.
    pub identifier: String,
    /// Relative location within the remote repository.
    pub path: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconVariants>,
    /// Item requires a post-install setup step before use.
    #[serde(default)]
    pub is_template: bool,
}

impl InstallableItem {
    /// Validates the item where it enters the system, so path joins
    /// downstream never see hostile input.
    pub fn validate(&self) -> Result<(), InvalidItem> {
        if self.identifier.is_empty() {
            return Err(InvalidItem::EmptyIdentifier);
        }
        if self.filename.is_empty() {
            return Err(InvalidItem::EmptyFilename);
        }
        checked(&self.path, "path")?;
        checked(&self.filename, "filename")?;
        if let Some(icon) = &self.icon {
            for (field, variant) in [("light icon", &icon.light), ("dark icon", &icon.dark)] {
                // An empty variant is treated as absent, not invalid.
                if let Some(rel) = variant.as_deref().filter(|r| !r.is_empty()) {
                    checked(rel, field)?;
                }
            }
        }
        Ok(())
    }
}

fn checked(path: &str, field: &'static str) -> Result<(), InvalidItem> {
    validate_relative_path(path).map_err(|source| InvalidItem::Path { field, source })
}

/// Independent light/dark icon variants, each a relative path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconVariants {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark: Option<String>,
}

/// A cached real file and the symlink exposing it.
///
/// Invariant: if `link` exists on disk it must resolve; a dangling link
/// is a failure state, never a valid end state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    /// Absolute on-disk location of the real file.
    pub path: PathBuf,
    /// Absolute on-disk location of the symlink exposed to the host.
    pub link: PathBuf,
}

impl FileHandle {
    /// Filename component of the link. Shared icons are keyed by it.
    pub fn link_filename(&self) -> Option<&OsStr> {
        self.link.file_name()
    }
}

/// File handles owned by one installed record.
///
/// The command handle is exclusive; icon handles may point at a shared
/// on-disk filename referenced by other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFiles {
    pub command: FileHandle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_light: Option<FileHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_dark: Option<FileHandle>,
}

/// Persisted record of a successfully installed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledRecord {
    pub identifier: String,
    #[serde(default)]
    pub needs_setup: bool,
    pub content_hash: String,
    pub files: RecordFiles,
    pub source: InstallableItem,
}

impl InstalledRecord {
    /// Lifecycle state implied by the record.
    pub fn state(&self) -> SyncState {
        if self.needs_setup {
            SyncState::NeedsSetup
        } else {
            SyncState::Installed
        }
    }

    /// Whether either icon handle's link carries `filename`.
    ///
    /// The delete liveness scan matches by filename, not by handle
    /// identity: shared icons are keyed by filename on disk.
    pub fn references_icon(&self, filename: &OsStr) -> bool {
        [&self.files.icon_light, &self.files.icon_dark]
            .into_iter()
            .flatten()
            .any(|handle| handle.link.file_name() == Some(filename))
    }
}

/// Per-record lifecycle state.
///
/// `NotInstalled` is both initial and terminal: it is the absence of a
/// record, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    NotInstalled,
    Installed,
    NeedsSetup,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(identifier: &str) -> InstallableItem {
        InstallableItem {
            identifier: identifier.into(),
            path: "x/y".into(),
            filename: "a.sh".into(),
            icon: None,
            is_template: false,
        }
    }

    #[test]
    fn valid_item_passes() {
        assert!(item("a").validate().is_ok());
    }

    #[test]
    fn rejects_empty_identifier() {
        let result = item("").validate();
        assert!(matches!(result, Err(InvalidItem::EmptyIdentifier)));
    }

    #[test]
    fn rejects_empty_filename() {
        let mut it = item("a");
        it.filename = String::new();
        assert!(matches!(it.validate(), Err(InvalidItem::EmptyFilename)));
    }

    #[test]
    fn rejects_traversing_path() {
        let mut it = item("a");
        it.path = "../../etc".into();
        assert!(it.validate().is_err());
    }

    #[test]
    fn rejects_absolute_icon_path() {
        let mut it = item("a");
        it.icon = Some(IconVariants {
            light: Some("/etc/passwd".into()),
            dark: None,
        });
        assert!(it.validate().is_err());
    }

    #[test]
    fn empty_icon_variant_treated_as_absent() {
        let mut it = item("a");
        it.icon = Some(IconVariants {
            light: Some(String::new()),
            dark: None,
        });
        assert!(it.validate().is_ok());
    }

    #[test]
    fn state_follows_needs_setup() {
        let record = InstalledRecord {
            identifier: "a".into(),
            needs_setup: true,
            content_hash: "hash".into(),
            files: RecordFiles {
                command: FileHandle {
                    path: "/cache/a.sh".into(),
                    link: "/root/a.template".into(),
                },
                icon_light: None,
                icon_dark: None,
            },
            source: item("a"),
        };
        assert_eq!(record.state(), SyncState::NeedsSetup);

        let mut done = record.clone();
        done.needs_setup = false;
        assert_eq!(done.state(), SyncState::Installed);
    }

    #[test]
    fn references_icon_matches_by_filename() {
        let mut record = InstalledRecord {
            identifier: "a".into(),
            needs_setup: false,
            content_hash: "hash".into(),
            files: RecordFiles {
                command: FileHandle {
                    path: "/cache/a.sh".into(),
                    link: "/root/a".into(),
                },
                icon_light: Some(FileHandle {
                    path: "/cache/x/sun.png".into(),
                    link: "/root/images/sun.png".into(),
                }),
                icon_dark: None,
            },
            source: item("a"),
        };
        assert!(record.references_icon(OsStr::new("sun.png")));
        assert!(!record.references_icon(OsStr::new("moon.png")));

        record.files.icon_light = None;
        assert!(!record.references_icon(OsStr::new("sun.png")));
    }

    #[test]
    fn item_serializes_camel_case() {
        let mut it = item("a");
        it.is_template = true;
        it.icon = Some(IconVariants {
            light: Some("img/sun.png".into()),
            dark: None,
        });

        let json = serde_json::to_value(&it).unwrap();
        assert_eq!(json["isTemplate"], true);
        assert_eq!(json["icon"]["light"], "img/sun.png");
        // Absent variants are omitted entirely.
        assert!(json["icon"].get("dark").is_none());
    }

    #[test]
    fn record_roundtrip() {
        let record = InstalledRecord {
            identifier: "a".into(),
            needs_setup: false,
            content_hash: "deadbeef".into(),
            files: RecordFiles {
                command: FileHandle {
                    path: "/cache/x/y/a.sh".into(),
                    link: "/root/a".into(),
                },
                icon_light: Some(FileHandle {
                    path: "/cache/x/y/sun.png".into(),
                    link: "/root/images/sun.png".into(),
                }),
                icon_dark: None,
            },
            source: item("a"),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: InstalledRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["contentHash"], "deadbeef");
        assert_eq!(value["files"]["iconLight"]["link"], "/root/images/sun.png");
    }
}
