//! TypeScript entry compilation with oxc.
//!
//! Pipeline:
//! ```text
//! source ─► link imports (bundle only) ─► strip types ─► minify? ─► codegen (+ map)
//! ```
//!
//! Without bundling the entry is transpiled on its own and its imports are
//! left for the browser.

use std::fs;
use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::transformer::{TransformOptions, Transformer};

use super::Artifact;
use super::bundle::{link, source_type};
use crate::compiler::{BuildConfig, Message, SourceMap};

/// Compile one script entry into `artifact`.
///
/// Every file the entry pulled in is recorded in `artifact.inputs`, also
/// when compilation fails.
pub fn compile(
    entry: &Path,
    config: &BuildConfig,
    artifact: &mut Artifact,
) -> Result<(), Vec<Message>> {
    let source = fs::read_to_string(entry)
        .map_err(|e| vec![Message::at(entry, format!("failed to read: {e}"))])?;

    let source = if config.bundle {
        link(entry, &source, config, artifact)?
    } else {
        source
    };

    let (code, map) = transpile(entry, &source, config)?;
    artifact.code = match &config.banner.js {
        Some(banner) => format!("{banner}\n{code}"),
        None => code,
    };
    artifact.map = map;
    Ok(())
}

/// Strip types, optionally minify, and print.
fn transpile(
    entry: &Path,
    source: &str,
    config: &BuildConfig,
) -> Result<(String, Option<String>), Vec<Message>> {
    let to_messages = |errors: &[oxc::diagnostics::OxcDiagnostic]| {
        errors
            .iter()
            .map(|e| Message::at(entry, e.to_string()))
            .collect::<Vec<_>>()
    };

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(entry, config.format)).parse();
    if !ret.errors.is_empty() {
        return Err(to_messages(&ret.errors));
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();
    let ret = Transformer::new(&allocator, entry, &TransformOptions::default())
        .build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        return Err(to_messages(&ret.errors));
    }

    let minify = config.minify;
    let scoping = if minify.identifiers || minify.syntax {
        let options = MinifierOptions {
            mangle: minify.identifiers.then(MangleOptions::default),
            compress: minify.syntax.then(CompressOptions::smallest),
        };
        Minifier::new(options).minify(&allocator, &mut program).scoping
    } else {
        None
    };

    let mut options = CodegenOptions {
        minify: minify.whitespace,
        source_map_path: (config.sourcemap == SourceMap::Linked).then(|| entry.to_path_buf()),
        ..CodegenOptions::default()
    };
    if minify.whitespace {
        options.comments = CommentOptions::disabled();
    }

    let ret = Codegen::new()
        .with_options(options)
        .with_scoping(scoping)
        .build(&program);

    Ok((ret.code, ret.map.map(|map| map.to_json_string())))
}
