use std::path::{Component, Path};

use crate::PathError;

/// Checks that a repository-relative path stays inside whatever base
/// directory it is later joined to.
///
/// Empty paths, absolute paths, `..` components and Windows path
/// prefixes (`C:`, `\\server`) are rejected. `.` and plain components
/// pass through.
pub fn validate_relative_path(path: &str) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::InvalidPath("path is empty".into()));
    }

    let parsed = Path::new(path);
    if parsed.is_absolute() {
        return Err(PathError::InvalidPath(format!(
            "absolute paths are not allowed: {path}"
        )));
    }

    for component in parsed.components() {
        match component {
            Component::ParentDir => {
                return Err(PathError::InvalidPath(format!(
                    "path escapes its base directory: {path}"
                )));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(PathError::InvalidPath(format!(
                    "rooted or prefixed path not allowed: {path}"
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_path_rejected() {
        assert!(validate_relative_path("").is_err());
    }

    #[test]
    fn traversal_rejected() {
        assert!(validate_relative_path("../../../etc/passwd").is_err());
    }

    #[test]
    fn traversal_below_normal_component_rejected() {
        assert!(validate_relative_path("sub/../../../escape").is_err());
    }

    #[test]
    fn absolute_path_rejected() {
        assert!(validate_relative_path("/tmp/evil.sh").is_err());
    }

    #[test]
    fn bare_parent_dir_rejected() {
        assert!(validate_relative_path("..").is_err());
    }

    #[test]
    fn plain_script_name_accepted() {
        assert!(validate_relative_path("deploy.sh").is_ok());
    }

    #[test]
    fn nested_icon_path_accepted() {
        assert!(validate_relative_path("img/sun.png").is_ok());
    }

    #[test]
    fn current_dir_prefix_accepted() {
        assert!(validate_relative_path("./deploy.sh").is_ok());
    }

    #[test]
    fn dotfile_accepted() {
        assert!(validate_relative_path(".hidden/cmd.sh").is_ok());
    }
}
