//! Content-loader plugins.
//!
//! The compiler consults the registry for every file it has to load that it
//! does not understand natively. A plugin matches on the full file path and
//! returns the content to use plus a [`Loader`] telling the compiler how to
//! interpret it.

mod stub;

pub use stub::TypedStubPlugin;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

/// How the compiler should interpret plugin output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    /// Plain text, exposed as a string default export.
    Text,
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub plugin: String,
    pub contents: String,
    pub loader: Loader,
}

/// Failure inside a plugin's load hook.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("[{plugin}] failed to read `{}`", path.display())]
    Read {
        plugin: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[{plugin}] failed to write `{}`", path.display())]
    Write {
        plugin: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A load hook for files the compiler cannot handle natively.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Pattern matched against the full file path.
    fn filter(&self) -> &Regex;

    fn on_load(&self, path: &Path) -> Result<LoadResult, PluginError>;

    fn matches(&self, path: &Path) -> bool {
        self.filter().is_match(&path.to_string_lossy())
    }
}

/// Ordered set of plugins. The first plugin whose filter matches wins.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in WGSL passthrough plugin.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TypedStubPlugin::wgsl()));
        registry
    }

    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        crate::debug!("plugin"; "registered `{}` ({})", plugin.name(), plugin.filter().as_str());
        self.plugins.push(plugin);
    }

    pub fn find(&self, path: &Path) -> Option<&Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.matches(path))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_contain_wgsl() {
        let registry = PluginRegistry::with_defaults();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["wgsl"]);
        assert!(registry.find(Path::new("src/life/cell.wgsl")).is_some());
        assert!(registry.find(Path::new("src/life/life.ts")).is_none());
        // filter is anchored at the end of the path
        assert!(registry.find(Path::new("src/cell.wgsl.d.ts")).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(
            TypedStubPlugin::new("first", r"\.glsl$").unwrap(),
        ));
        registry.register(Arc::new(
            TypedStubPlugin::new("second", r"\.(glsl|frag)$").unwrap(),
        ));

        let found = registry.find(Path::new("shader.glsl")).unwrap();
        assert_eq!(found.name(), "first");
        let found = registry.find(Path::new("shader.frag")).unwrap();
        assert_eq!(found.name(), "second");
    }
}
