//! User-configured root folder expansion.

use std::path::PathBuf;

/// Expands a leading `~` to the user's home directory.
///
/// Any other path passes through unchanged.
pub fn resolve_root(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}

/// Returns the user's home directory, `/tmp` as fallback.
fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_passes_through() {
        assert_eq!(
            resolve_root("/opt/commands"),
            PathBuf::from("/opt/commands")
        );
    }

    #[test]
    fn relative_path_passes_through() {
        assert_eq!(resolve_root("commands"), PathBuf::from("commands"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = resolve_root("~/commands");
        assert!(
            expanded.to_string_lossy().ends_with("/commands"),
            "expected path ending with /commands, got {expanded:?}"
        );
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn bare_tilde_expands() {
        let expanded = resolve_root("~");
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn tilde_in_middle_not_expanded() {
        assert_eq!(resolve_root("/data/~cache"), PathBuf::from("/data/~cache"));
    }
}
