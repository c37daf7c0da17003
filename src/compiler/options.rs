//! Build configuration handed to a compiler backend.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::plugin::PluginRegistry;

/// Runtime the output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Browser,
}

impl Platform {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Browser => "browser",
        }
    }
}

/// Module format of script output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// ES module: `import`/`export` are preserved.
    #[default]
    Esm,
}

/// Source map emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMap {
    #[default]
    None,
    /// Separate `<output>.map` file referenced by a trailing comment.
    Linked,
}

/// Minification switches, mirroring the usual whitespace/identifier/syntax split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Minify {
    pub whitespace: bool,
    pub identifiers: bool,
    pub syntax: bool,
}

impl Minify {
    pub const ALL: Self = Self {
        whitespace: true,
        identifiers: true,
        syntax: true,
    };

    pub const NONE: Self = Self {
        whitespace: false,
        identifiers: false,
        syntax: false,
    };
}

/// Text prepended to outputs, keyed by output type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    pub js: Option<String>,
    pub css: Option<String>,
}

/// Everything a compiler backend needs for one build.
///
/// Constructed once per build invocation and not mutated afterwards.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub entry_points: Vec<PathBuf>,
    pub bundle: bool,
    pub out_dir: PathBuf,
    pub platform: Platform,
    pub format: Format,
    pub minify: Minify,
    pub sourcemap: SourceMap,
    /// Output extension remap, e.g. `.css` → `.min.css`.
    pub out_extension: FxHashMap<String, String>,
    /// Import globs left unresolved for the browser to fetch.
    pub external: Vec<glob::Pattern>,
    pub banner: Banner,
    pub plugins: PluginRegistry,
    pub watch: bool,
}

impl BuildConfig {
    /// Config with defaults for everything but the entries and output dir.
    pub fn new(entry_points: Vec<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            entry_points,
            bundle: false,
            out_dir: out_dir.into(),
            platform: Platform::default(),
            format: Format::default(),
            minify: Minify::NONE,
            sourcemap: SourceMap::default(),
            out_extension: FxHashMap::default(),
            external: Vec::new(),
            banner: Banner::default(),
            plugins: PluginRegistry::new(),
            watch: false,
        }
    }

    /// Final extension for a default output extension (`.js`, `.css`).
    pub fn output_extension<'a>(&'a self, default: &'a str) -> &'a str {
        self.out_extension
            .get(default)
            .map_or(default, String::as_str)
    }

    /// Whether an import specifier should stay unresolved.
    pub fn is_external(&self, specifier: &str) -> bool {
        let name = Path::new(specifier)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(specifier);
        self.external
            .iter()
            .any(|p| p.matches(specifier) || p.matches(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_extension_remap() {
        let mut config = BuildConfig::new(vec![], "out");
        config
            .out_extension
            .insert(".css".to_owned(), ".min.css".to_owned());

        assert_eq!(config.output_extension(".css"), ".min.css");
        assert_eq!(config.output_extension(".js"), ".js");
    }

    #[test]
    fn test_external_matches_name_or_specifier() {
        let mut config = BuildConfig::new(vec![], "out");
        config.external.push(glob::Pattern::new("*.svg").unwrap());

        assert!(config.is_external("./icons/play.svg"));
        assert!(config.is_external("logo.svg"));
        assert!(!config.is_external("./cell.wgsl"));
    }
}
