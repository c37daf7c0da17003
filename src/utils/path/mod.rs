//! Path normalization.
//!
//! Watch events and build inputs are compared as normalized paths, so both
//! sides must go through [`normalize_path`].

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// A path that no longer exists keeps its file name under the canonical
/// parent, so a deleted file still compares equal to its earlier form.
/// Anything else is made absolute against the current directory.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && let Ok(parent) = parent.canonicalize()
    {
        return parent.join(name);
    }

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        assert_eq!(normalize_path(path), PathBuf::from("/absolute/path/file.txt"));
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        assert!(normalize_path(path).is_absolute());
    }

    #[test]
    fn test_normalize_deleted_file_matches_existing_form() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("life.ts");
        fs::write(&file, "").unwrap();
        let before = normalize_path(&file);

        fs::remove_file(&file).unwrap();
        assert_eq!(normalize_path(&file), before);
    }

    #[test]
    fn test_normalize_resolves_dot_segments() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("b.ts"), "").unwrap();

        assert_eq!(
            normalize_path(&dir.path().join("a/../b.ts")),
            normalize_path(&dir.path().join("b.ts"))
        );
    }
}
