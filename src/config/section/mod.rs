//! Configuration sections.
//!
//! ```toml
//! [build]
//! src = "src"                 # entry root, also served as raw files
//! bundle = true
//! banner = "/*! ... */"       # prepended to stylesheet output
//!
//! [[build.stubs]]             # extra typed-stub plugins; wgsl is built in
//! name = "glsl"
//! filter = '\.glsl$'
//!
//! [serve]
//! host = "localhost:8080"
//! index = "life"              # page rendered at `/`
//! static_prefix = "src"       # URL prefix for raw source files
//!
//! [templates]
//! base = "base.tmpl"
//! groups = ["life"]
//! shared = "shared/*/*.tmpl"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::build::DEFAULT_CSS_BANNER;
use crate::template::{DEFAULT_BASE, DEFAULT_INDEX};

pub const DEFAULT_SRC: &str = "src";
pub const DEFAULT_HOST: &str = "localhost:8080";

/// `[build]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub src: PathBuf,
    pub bundle: bool,
    pub banner: String,
    pub stubs: Vec<StubConfig>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            src: PathBuf::from(DEFAULT_SRC),
            bundle: true,
            banner: DEFAULT_CSS_BANNER.to_owned(),
            stubs: Vec::new(),
        }
    }
}

/// One `[[build.stubs]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubConfig {
    pub name: String,
    /// Regex matched against the full path of imported files.
    pub filter: String,
}

/// `[serve]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeSection {
    pub host: String,
    pub index: String,
    pub static_prefix: String,
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            index: DEFAULT_INDEX.to_owned(),
            static_prefix: DEFAULT_SRC.to_owned(),
        }
    }
}

/// `[templates]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesSection {
    pub base: String,
    pub groups: Vec<String>,
    pub shared: Option<String>,
}

impl Default for TemplatesSection {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_owned(),
            groups: vec![DEFAULT_INDEX.to_owned()],
            shared: None,
        }
    }
}
