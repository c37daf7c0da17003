//! Stylesheet entry compilation with lightningcss.

use std::path::{Path, PathBuf};

use lightningcss::bundler::{Bundler, FileProvider, ResolveResult, SourceProvider};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use parking_lot::Mutex;

use super::Artifact;
use crate::compiler::{BuildConfig, Message};

/// File provider that remembers every stylesheet it reads.
struct TrackingProvider {
    inner: FileProvider,
    seen: Mutex<Vec<PathBuf>>,
}

impl TrackingProvider {
    fn new() -> Self {
        Self {
            inner: FileProvider::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn into_seen(self) -> Vec<PathBuf> {
        self.seen.into_inner()
    }
}

impl SourceProvider for TrackingProvider {
    type Error = std::io::Error;

    fn read<'a>(&'a self, file: &Path) -> Result<&'a str, Self::Error> {
        self.seen.lock().push(file.to_path_buf());
        self.inner.read(file)
    }

    fn resolve(
        &self,
        specifier: &str,
        originating_file: &Path,
    ) -> Result<ResolveResult, Self::Error> {
        self.inner.resolve(specifier, originating_file)
    }
}

/// Compile one stylesheet entry into `artifact`, inlining `@import`s when
/// bundling. Stylesheets the bundler tried to read are recorded even when
/// compilation fails.
pub fn compile(
    entry: &Path,
    config: &BuildConfig,
    artifact: &mut Artifact,
) -> Result<(), Vec<Message>> {
    let provider = TrackingProvider::new();
    let printed = print(entry, config, &provider);

    for path in provider.into_seen() {
        if !artifact.inputs.contains(&path) {
            artifact.inputs.push(path);
        }
    }

    let code = printed?;
    artifact.code = match &config.banner.css {
        Some(banner) => format!("{banner}\n{code}"),
        None => code,
    };
    Ok(())
}

fn print(
    entry: &Path,
    config: &BuildConfig,
    provider: &TrackingProvider,
) -> Result<String, Vec<Message>> {
    let fail = |text: String| vec![Message::at(entry, text)];
    let options = ParserOptions {
        filename: entry.to_string_lossy().into_owned(),
        ..ParserOptions::default()
    };

    let mut stylesheet = if config.bundle {
        let mut bundler = Bundler::new(provider, None, options);
        bundler.bundle(entry).map_err(|e| fail(e.to_string()))?
    } else {
        let source = provider
            .read(entry)
            .map_err(|e| fail(format!("failed to read: {e}")))?;
        StyleSheet::parse(source, options).map_err(|e| fail(e.to_string()))?
    };

    if config.minify.syntax {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| fail(e.to_string()))?;
    }

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: config.minify.whitespace,
            ..PrinterOptions::default()
        })
        .map_err(|e| fail(e.to_string()))?;

    Ok(printed.code)
}
