//! Build orchestration.
//!
//! Discovers entry points, assembles a [`BuildConfig`], and either runs a
//! single strict build or hands the configuration to a watch session.
//!
//! ```text
//! discover(root) ─► BuildConfig ─┬─ dev = false ─► compiler.build ─► any diagnostic? ─► Err
//!                                └─ dev = true  ─► WatchSession (initial build + rebuild on change)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::asset::{DiscoveryError, discover_paths};
use crate::asset::rule::{MINIFIED_STYLE_EXT, STYLE_EXT};
use crate::compiler::{
    Banner, BuildConfig, BuildContext, BuildResult, Compiler, Format, Message, Minify, Platform,
    SourceMap,
};
use crate::plugin::{Plugin, PluginRegistry};
use crate::utils::plural::plural_count;
use crate::watch::{WatchHandle, WatchSession};

/// License banner prepended to stylesheet output.
pub const DEFAULT_CSS_BANNER: &str = "/*!\n * Copyright the kiln authors. All rights reserved.\n */";

/// Asset references left for the browser to fetch directly.
pub const EXTERNAL_GLOBS: &[&str] = &["*.svg"];

/// Inputs of one build invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory walked for entry points; outputs are written here too.
    pub entry_point_root: PathBuf,
    /// Inline imported files into each entry; also enables stylesheet entries.
    pub bundle: bool,
    /// Unminified output and a persistent watch session.
    pub dev_mode: bool,
    /// Stylesheet banner.
    pub banner: String,
}

impl Config {
    pub fn new(entry_point_root: impl Into<PathBuf>, bundle: bool, dev_mode: bool) -> Self {
        Self {
            entry_point_root: entry_point_root.into(),
            bundle,
            dev_mode,
            banner: DEFAULT_CSS_BANNER.to_owned(),
        }
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Any error or warning diagnostic from a non-watch build.
    #[error("error building static files:\n{}", render_messages(.errors, .warnings))]
    Compile {
        errors: Vec<Message>,
        warnings: Vec<Message>,
    },

    #[error("failed to start watching `{}`", .0.display())]
    Watch(PathBuf, #[source] notify::Error),
}

impl BuildError {
    /// Fail on any diagnostic at all, warnings included.
    pub fn check(result: BuildResult) -> Result<BuildResult, Self> {
        if result.has_diagnostics() {
            return Err(Self::Compile {
                errors: result.errors,
                warnings: result.warnings,
            });
        }
        Ok(result)
    }
}

fn render_messages(errors: &[Message], warnings: &[Message]) -> String {
    errors
        .iter()
        .map(|m| format!("  error: {m}"))
        .chain(warnings.iter().map(|m| format!("  warning: {m}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs builds against a compiler backend with a fixed plugin registry.
pub struct Orchestrator {
    compiler: Arc<dyn Compiler>,
    plugins: PluginRegistry,
}

impl Orchestrator {
    /// Orchestrator with the built-in plugins registered.
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self {
            compiler,
            plugins: PluginRegistry::with_defaults(),
        }
    }

    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.register(plugin);
        self
    }

    /// Build once, or start a watch session when `config.dev_mode` is set.
    ///
    /// Returns the watch handle in dev mode, `None` otherwise.
    pub fn build(&self, config: &Config) -> Result<Option<WatchHandle>, BuildError> {
        let entries = discover_paths(&config.entry_point_root, config.bundle)?;
        crate::log!("build"; "{} in {}",
            plural_count(entries.len(), "entry point"),
            config.entry_point_root.display());

        let build_config = self.build_config(config, entries);
        let context = BuildContext::new(Arc::clone(&self.compiler), build_config);

        if context.config().watch {
            let session = WatchSession::new(context, &config.entry_point_root)
                .map_err(|e| BuildError::Watch(config.entry_point_root.clone(), e))?;
            return Ok(Some(session.start()));
        }

        let result = BuildError::check(context.rebuild())?;
        crate::log!("build"; "wrote {}", plural_count(result.outputs.len(), "file"));
        Ok(None)
    }

    /// Assemble the compiler configuration for a set of entries.
    pub fn build_config(&self, config: &Config, entry_points: Vec<PathBuf>) -> BuildConfig {
        let minify = if config.dev_mode {
            Minify::NONE
        } else {
            Minify::ALL
        };

        let mut out_extension = FxHashMap::default();
        out_extension.insert(STYLE_EXT.to_owned(), MINIFIED_STYLE_EXT.to_owned());

        let external = EXTERNAL_GLOBS
            .iter()
            .filter_map(|g| glob::Pattern::new(g).ok())
            .collect();

        BuildConfig {
            bundle: config.bundle,
            platform: Platform::Browser,
            format: Format::Esm,
            minify,
            sourcemap: SourceMap::Linked,
            out_extension,
            external,
            banner: Banner {
                js: None,
                css: Some(config.banner.clone()),
            },
            plugins: self.plugins.clone(),
            watch: config.dev_mode,
            ..BuildConfig::new(entry_points, &config.entry_point_root)
        }
    }
}
