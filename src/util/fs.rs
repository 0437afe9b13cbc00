//! Filesystem utilities.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve `.` and `..` components without touching the filesystem.
///
/// Symlinks are left alone, so descriptor paths keep the spelling the user
/// gave them.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Make `path` absolute against the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    Ok(normalize_path(&cwd.join(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/work/app/../pom.xml")),
            PathBuf::from("/work/pom.xml")
        );
        assert_eq!(
            normalize_path(Path::new("/work/./lib/pom.xml")),
            PathBuf::from("/work/lib/pom.xml")
        );
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_absolute_keeps_absolute_paths() {
        assert_eq!(
            absolute(Path::new("/work/app/../lib")).unwrap(),
            PathBuf::from("/work/lib")
        );
        assert!(absolute(Path::new("lib")).unwrap().is_absolute());
    }
}
