//! Entry point discovery (reads the filesystem, no side effects).

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{EntryFile, RuleTable};

/// Failure while walking the source tree.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

/// Walk `root` and collect entry points using the default rule table.
///
/// Fails on the first unreadable path; no partial results are returned.
pub fn discover(root: &Path, bundle: bool) -> Result<Vec<EntryFile>, DiscoveryError> {
    let mut entries = Vec::new();
    walk(root, bundle, &RuleTable::default(), &mut entries)?;
    Ok(entries)
}

/// Same as [`discover`], returning only the ordered paths.
pub fn discover_paths(root: &Path, bundle: bool) -> Result<Vec<PathBuf>, DiscoveryError> {
    Ok(discover(root, bundle)?
        .into_iter()
        .map(|entry| {
            crate::debug!("discover"; "{} {}", entry.kind.label(), entry.path.display());
            entry.path
        })
        .collect())
}

/// Recursive helper. Children are visited in lexical name order so the
/// resulting entry order is stable across runs.
fn walk(
    dir: &Path,
    bundle: bool,
    rules: &RuleTable,
    entries: &mut Vec<EntryFile>,
) -> Result<(), DiscoveryError> {
    let io_err = |e| DiscoveryError::Io(dir.to_path_buf(), e);

    let mut children = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let path = child.path();
        let file_type = child
            .file_type()
            .map_err(|e| DiscoveryError::Io(path.clone(), e))?;

        if file_type.is_dir() {
            walk(&path, bundle, rules, entries)?;
            continue;
        }

        if let Some(kind) = rules.classify(child.file_name(), bundle) {
            entries.push(EntryFile::new(path, kind));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::EntryKind;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn names(entries: &[EntryFile]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["a.ts", "_b.ts", "c.test.ts", "d.css", "e.min.css"] {
            touch(dir.path(), name);
        }
        dir
    }

    #[test]
    fn test_discover_with_bundle() {
        let dir = fixture();
        let entries = discover(dir.path(), true).unwrap();
        assert_eq!(names(&entries), ["a.ts", "d.css"]);
        assert_eq!(entries[0].kind, EntryKind::Script);
        assert_eq!(entries[1].kind, EntryKind::Style);
    }

    #[test]
    fn test_discover_without_bundle() {
        let dir = fixture();
        let entries = discover(dir.path(), false).unwrap();
        assert_eq!(names(&entries), ["a.ts"]);
    }

    #[test]
    fn test_discover_descends_into_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "life/life.ts");
        touch(dir.path(), "life/cell.wgsl");
        touch(dir.path(), "life/_grid.ts");
        touch(dir.path(), "_shared/theme.css");
        touch(dir.path(), "base.tmpl");

        let paths = discover_paths(dir.path(), true).unwrap();
        assert_eq!(
            paths,
            vec![
                dir.path().join("_shared/theme.css"),
                dir.path().join("life/life.ts"),
            ]
        );
    }

    #[test]
    fn test_discover_order_is_stable() {
        let dir = TempDir::new().unwrap();
        for name in ["z.ts", "m.ts", "a.ts", "k/b.ts"] {
            touch(dir.path(), name);
        }
        let first = discover_paths(dir.path(), false).unwrap();
        let second = discover_paths(dir.path(), false).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0], dir.path().join("a.ts"));
    }

    #[test]
    fn test_discover_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = discover(&missing, true).unwrap_err();
        let DiscoveryError::Io(path, _) = err;
        assert_eq!(path, missing);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_non_utf8_script() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.ts");
        if fs::write(dir.path().join(name), "").is_err() {
            // Filesystem refuses non-UTF-8 names.
            return;
        }

        let paths = discover_paths(dir.path(), false).unwrap();
        assert_eq!(paths, vec![dir.path().join(name)]);
    }

    #[test]
    fn test_discover_empty_tree() {
        let dir = TempDir::new().unwrap();
        assert!(discover(dir.path(), true).unwrap().is_empty());
    }
}
