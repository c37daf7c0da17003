//! Configuration for `kiln.toml`.
//!
//! The file is optional: without one every section takes its defaults and
//! the working directory is the project root. CLI flags override file values.
//!
//! | Section       | Purpose                                         |
//! |---------------|-------------------------------------------------|
//! | `[build]`     | Source root, bundling, banner, extra stubs      |
//! | `[serve]`     | Listen address, index page, static URL prefix   |
//! | `[templates]` | Base layout, page groups, shared helpers        |

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{BuildSection, ServeSection, TemplatesSection};

use util::{find_config_file, trim_prefix};

use crate::{build, cli::Cli, log, plugin::Plugin, plugin::TypedStubPlugin, template::Layout};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

pub const DEFAULT_CONFIG: &str = "kiln.toml";

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    /// Config file that was loaded, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root: the config file's directory, or cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub build: BuildSection,
    pub serve: ServeSection,
    pub templates: TemplatesSection,
}

impl KilnConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file; a missing default file
    /// is fine, a missing explicitly named one is an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = Some(path);
                config
            }
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                bail!("Config file '{}' not found", cli.config.display());
            }
            None => Self {
                root: cwd.clone(),
                ..Self::default()
            },
        };

        config.finalize(cli, &cwd);
        config.validate()?;
        Ok(config)
    }

    /// Resolve paths against the root, then apply CLI overrides.
    fn finalize(&mut self, cli: &Cli, cwd: &Path) {
        crate::logger::set_verbose(cli.verbose);

        self.build.src = match &cli.src {
            Some(src) => cwd.join(src),
            None => self.root.join(&self.build.src),
        };
        if let Some(host) = &cli.host {
            self.serve.host.clone_from(host);
        }
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored: {}", display_path, fields.join(", "));
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates.groups.is_empty() {
            return Err(ConfigError::Validation(
                "[templates] groups must name at least one page".into(),
            ));
        }
        if !self.templates.groups.contains(&self.serve.index) {
            return Err(ConfigError::Validation(format!(
                "[serve] index `{}` is not one of [templates] groups {:?}",
                self.serve.index, self.templates.groups
            )));
        }
        if self.static_prefix().is_empty() {
            return Err(ConfigError::Validation(
                "[serve] static_prefix must not be empty".into(),
            ));
        }
        self.stub_plugins().map(|_| ())
    }

    /// Source directory, absolute after loading.
    pub fn src_dir(&self) -> &Path {
        &self.build.src
    }

    /// URL prefix for raw source files, without slashes.
    pub fn static_prefix(&self) -> &str {
        trim_prefix(&self.serve.static_prefix)
    }

    pub fn build_config(&self, dev_mode: bool) -> build::Config {
        build::Config::new(&self.build.src, self.build.bundle, dev_mode)
            .with_banner(&self.build.banner)
    }

    /// Plugins declared under `[[build.stubs]]`.
    pub fn stub_plugins(&self) -> Result<Vec<Arc<dyn Plugin>>, ConfigError> {
        self.build
            .stubs
            .iter()
            .map(|stub| {
                TypedStubPlugin::new(&stub.name, &stub.filter)
                    .map(|p| Arc::new(p) as Arc<dyn Plugin>)
                    .map_err(|e| {
                        ConfigError::Validation(format!(
                            "[[build.stubs]] `{}` has an invalid filter: {e}",
                            stub.name
                        ))
                    })
            })
            .collect()
    }

    pub fn layout(&self) -> Layout {
        Layout {
            base: self.templates.base.clone(),
            groups: self.templates.groups.clone(),
            shared: self.templates.shared.clone(),
        }
    }
}

/// Parse a config snippet, panicking on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> KilnConfig {
    let (parsed, ignored) = KilnConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
