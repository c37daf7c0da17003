//! Output path mapping and writing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::{Message, SourceMap};

/// Lowest common ancestor directory of all entry points.
///
/// Outputs keep their position relative to this directory, so a single
/// entry `src/life/life.ts` written to `src` lands at `src/life.js`.
pub fn outbase(entries: &[PathBuf]) -> PathBuf {
    let mut dirs = entries.iter().filter_map(|p| p.parent());
    let Some(first) = dirs.next() else {
        return PathBuf::new();
    };

    let mut base = first.to_path_buf();
    for dir in dirs {
        while !dir.starts_with(&base) {
            if !base.pop() {
                break;
            }
        }
    }
    base
}

/// Where `entry` is written, given the final output extension.
pub fn output_path(entry: &Path, outbase: &Path, out_dir: &Path, extension: &str) -> PathBuf {
    let rel = entry
        .strip_prefix(outbase)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .or_else(|| entry.file_name().map(Path::new))
        .unwrap_or(entry);

    let stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    out_dir.join(rel).with_file_name(format!("{stem}{extension}"))
}

/// Write generated code (and its source map when linked).
///
/// Returns every file written.
pub fn write_output(
    path: &Path,
    code: &str,
    map: Option<String>,
    sourcemap: SourceMap,
) -> Result<Vec<PathBuf>, Message> {
    let write = |target: &Path, content: &str| {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Message::at(target, format!("failed to create output directory: {e}")))?;
        }
        fs::write(target, content)
            .map_err(|e| Message::at(target, format!("failed to write output: {e}")))
    };

    match (sourcemap, map) {
        (SourceMap::Linked, Some(map)) => {
            let map_path = sourcemap_path(path);
            let map_name = map_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let code = format!("{}\n//# sourceMappingURL={map_name}\n", code.trim_end());
            write(path, &code)?;
            write(&map_path, &map)?;
            Ok(vec![path.to_path_buf(), map_path])
        }
        _ => {
            write(path, code)?;
            Ok(vec![path.to_path_buf()])
        }
    }
}

fn sourcemap_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_outbase_single_entry_is_its_directory() {
        let entries = vec![PathBuf::from("src/life/life.ts")];
        assert_eq!(outbase(&entries), PathBuf::from("src/life"));
    }

    #[test]
    fn test_outbase_common_ancestor() {
        let entries = vec![
            PathBuf::from("src/life/life.ts"),
            PathBuf::from("src/style/site.css"),
            PathBuf::from("src/life/deep/extra.ts"),
        ];
        assert_eq!(outbase(&entries), PathBuf::from("src"));
    }

    #[test]
    fn test_outbase_empty() {
        assert_eq!(outbase(&[]), PathBuf::new());
    }

    #[test]
    fn test_output_path_single_entry() {
        let entry = Path::new("src/life/life.ts");
        let out = output_path(entry, Path::new("src/life"), Path::new("src"), ".js");
        assert_eq!(out, PathBuf::from("src/life.js"));
    }

    #[test]
    fn test_output_path_keeps_relative_layout() {
        let entry = Path::new("src/style/site.css");
        let out = output_path(entry, Path::new("src"), Path::new("src"), ".min.css");
        assert_eq!(out, PathBuf::from("src/style/site.min.css"));
    }

    #[test]
    fn test_write_output_linked_sourcemap() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/life.js");

        let written = write_output(
            &path,
            "console.log(1);\n",
            Some("{\"version\":3}".to_owned()),
            SourceMap::Linked,
        )
        .unwrap();

        assert_eq!(written.len(), 2);
        let code = fs::read_to_string(&path).unwrap();
        assert!(code.ends_with("//# sourceMappingURL=life.js.map\n"));
        let map = fs::read_to_string(dir.path().join("nested/life.js.map")).unwrap();
        assert_eq!(map, "{\"version\":3}");
    }

    #[test]
    fn test_write_output_without_map() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.min.css");

        let written = write_output(&path, "a{}", None, SourceMap::Linked).unwrap();

        assert_eq!(written, vec![path.clone()]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a{}");
    }
}
