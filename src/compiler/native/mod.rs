//! In-process compiler backend.
//!
//! Scripts go through oxc (linking, type stripping, minification, codegen),
//! stylesheets through lightningcss (`@import` bundling, minification).
//! Entries are compiled in parallel; results are merged in entry order.

mod bundle;
mod output;
mod script;
mod style;

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::{BuildConfig, BuildResult, Compiler};
use crate::asset::EntryKind;
use crate::asset::rule::STYLE_EXT;

/// Compiled code for one entry, before it is written.
///
/// `inputs` starts with the entry and grows as files are read, so it is
/// complete even when compilation fails.
struct Artifact {
    code: String,
    map: Option<String>,
    inputs: Vec<PathBuf>,
}

impl Artifact {
    fn new(entry: &Path) -> Self {
        Self {
            code: String::new(),
            map: None,
            inputs: vec![entry.to_path_buf()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCompiler;

impl NativeCompiler {
    pub const fn new() -> Self {
        Self
    }

    fn compile_entry(&self, entry: &Path, outbase: &Path, config: &BuildConfig) -> BuildResult {
        let kind = entry_kind(entry);
        crate::debug!("compile"; "{} {}", kind.label(), entry.display());

        let mut artifact = Artifact::new(entry);
        let compiled = match kind {
            EntryKind::Script => script::compile(entry, config, &mut artifact),
            EntryKind::Style => style::compile(entry, config, &mut artifact),
        };

        let mut result = BuildResult {
            inputs: std::mem::take(&mut artifact.inputs),
            ..BuildResult::default()
        };
        if let Err(errors) = compiled {
            result.errors = errors;
            return result;
        }

        let extension = config.output_extension(kind.output_extension());
        let target = output::output_path(entry, outbase, &config.out_dir, extension);
        let map = match kind {
            EntryKind::Script => artifact.map,
            EntryKind::Style => None,
        };

        match output::write_output(&target, &artifact.code, map, config.sourcemap) {
            Ok(written) => result.outputs = written,
            Err(err) => result.errors.push(err),
        }
        result
    }
}

impl Compiler for NativeCompiler {
    fn build(&self, config: &BuildConfig) -> BuildResult {
        let outbase = output::outbase(&config.entry_points);

        let results: Vec<_> = config
            .entry_points
            .par_iter()
            .map(|entry| self.compile_entry(entry, &outbase, config))
            .collect();

        let mut merged = BuildResult::default();
        for result in results {
            merged.merge(result);
        }
        merged
    }
}

fn entry_kind(path: &Path) -> EntryKind {
    let is_style = path
        .to_str()
        .is_some_and(|p| p.ends_with(STYLE_EXT));
    if is_style {
        EntryKind::Style
    } else {
        EntryKind::Script
    }
}
