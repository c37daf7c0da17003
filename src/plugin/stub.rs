//! Passthrough plugin that emits a typed declaration stub.
//!
//! Loads an asset the compiler does not understand (e.g. a WGSL shader) as
//! plain text and writes `<file>.d.ts` next to it, so TypeScript importers
//! can `import shader from "./cell.wgsl"` with a `string` default export.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::{LoadResult, Loader, Plugin, PluginError};

/// Ambient declaration written next to every loaded asset.
const TYPED_STUB_DECLARATION: &str = "declare const _default: string;\nexport default _default;";

/// Suffix appended to the asset path for its declaration sidecar.
const DECLARATION_SUFFIX: &str = ".d.ts";

pub struct TypedStubPlugin {
    name: String,
    filter: Regex,
}

impl TypedStubPlugin {
    pub fn new(name: impl Into<String>, filter: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            filter: Regex::new(filter)?,
        })
    }

    /// WebGPU shading language sources.
    pub fn wgsl() -> Self {
        Self {
            name: "wgsl".to_owned(),
            filter: Regex::new(r"\.wgsl$").expect("static pattern"),
        }
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut sidecar = OsString::from(path.as_os_str());
        sidecar.push(DECLARATION_SUFFIX);
        PathBuf::from(sidecar)
    }
}

impl Plugin for TypedStubPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self) -> &Regex {
        &self.filter
    }

    /// Read → emit stub → return tagged content.
    ///
    /// The sidecar is written before returning; if that fails the load fails.
    fn on_load(&self, path: &Path) -> Result<LoadResult, PluginError> {
        let contents = fs::read_to_string(path).map_err(|source| PluginError::Read {
            plugin: self.name.clone(),
            path: path.to_path_buf(),
            source,
        })?;

        let sidecar = Self::sidecar_path(path);
        fs::write(&sidecar, TYPED_STUB_DECLARATION).map_err(|source| PluginError::Write {
            plugin: self.name.clone(),
            path: sidecar.clone(),
            source,
        })?;

        crate::debug!("plugin"; "[{}] loaded {}", self.name, path.display());

        Ok(LoadResult {
            plugin: self.name.clone(),
            contents,
            loader: Loader::Text,
        })
    }
}
