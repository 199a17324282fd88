//! Fixed on-disk layout derived from the commands root.
//!
//! ```text
//! <root>/commands/<source-path>/<filename>   cached real command files
//! <root>/images/<icon-filename>              flat shared icon symlinks
//! <root>/<identifier>[.template]             flat user-facing command symlinks
//! ```

use std::path::{Path, PathBuf};

use crate::resolve::resolve_root;

/// Subfolder holding cached real command files, nested by source path.
pub const COMMANDS_DIR: &str = "commands";

/// Subfolder holding flat, filename-keyed shared icon symlinks.
pub const IMAGES_DIR: &str = "images";

/// Suffix on user-facing links of installs that still need setup.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// The layout of the synchronized commands folder.
#[derive(Debug, Clone)]
pub struct CommandPaths {
    root: PathBuf,
}

impl CommandPaths {
    /// Creates a layout rooted at an already-resolved path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a layout from a user-configured path, expanding `~`.
    pub fn from_user_path(user_path: &str) -> Self {
        Self {
            root: resolve_root(user_path),
        }
    }

    /// The resolved commands root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding the cached real command files.
    pub fn commands_dir(&self) -> PathBuf {
        self.root.join(COMMANDS_DIR)
    }

    /// Folder holding the shared icon symlinks.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Cache subfolder for an item's source path.
    ///
    /// `source_path` must have passed
    /// [`validate_relative_path`](crate::validate_relative_path).
    pub fn cache_dir(&self, source_path: &str) -> PathBuf {
        self.commands_dir().join(source_path)
    }

    /// Cached real-file location for an item.
    pub fn cached_file(&self, source_path: &str, filename: &str) -> PathBuf {
        self.cache_dir(source_path).join(filename)
    }

    /// Shared icon symlink location for an icon filename.
    pub fn icon_link(&self, filename: &str) -> PathBuf {
        self.images_dir().join(filename)
    }

    /// User-facing command symlink location.
    ///
    /// Template installs carry the [`TEMPLATE_SUFFIX`] until setup is
    /// finished.
    pub fn command_link(&self, identifier: &str, is_template: bool) -> PathBuf {
        if is_template {
            self.root.join(format!("{identifier}{TEMPLATE_SUFFIX}"))
        } else {
            self.root.join(identifier)
        }
    }
}
