//! Path resolution for the scriptdock on-disk layout.
//!
//! Expands the user-configured root folder and derives the fixed
//! subpaths the synchronizer reads and writes: the nested command
//! cache, the flat shared-icons folder, and the flat user-facing links.

mod layout;
mod resolve;
mod validate;

pub use layout::{COMMANDS_DIR, CommandPaths, IMAGES_DIR, TEMPLATE_SUFFIX};
pub use resolve::resolve_root;
pub use validate::validate_relative_path;

/// Errors from path resolution and validation.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
}
