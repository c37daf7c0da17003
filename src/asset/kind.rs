//! Entry kind definitions.

use std::path::PathBuf;

/// Kind of buildable entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// TypeScript module compiled to an ES module.
    Script,
    /// Stylesheet bundled (and minified) to `.min.css`.
    Style,
}

impl EntryKind {
    /// Extension (with leading dot) the compiler emits before any remapping.
    pub const fn output_extension(self) -> &'static str {
        match self {
            Self::Script => ".js",
            Self::Style => ".css",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
        }
    }
}

/// A source file designated as a root for the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFile {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl EntryFile {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
