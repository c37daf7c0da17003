//! Build results and diagnostics.

use std::fmt;
use std::path::PathBuf;

/// A single diagnostic reported by a compiler backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub path: Option<PathBuf>,
    pub text: String,
    /// Plugin that produced the diagnostic, if any.
    pub plugin: Option<String>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
            plugin: None,
        }
    }

    pub fn at(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            text: text.into(),
            plugin: None,
        }
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(plugin) = &self.plugin {
            write!(f, "[plugin {plugin}] ")?;
        }
        if let Some(path) = &self.path {
            write!(f, "{}: ", path.display())?;
        }
        f.write_str(&self.text)
    }
}

/// Outcome of one compiler invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    /// Files written.
    pub outputs: Vec<PathBuf>,
    /// Every file read while building (entries and everything they pulled in).
    pub inputs: Vec<PathBuf>,
}

impl BuildResult {
    pub fn has_diagnostics(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }

    /// Merge another (per-entry) result into this one, preserving order.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.outputs.extend(other.outputs);
        for input in other.inputs {
            if !self.inputs.contains(&input) {
                self.inputs.push(input);
            }
        }
    }

    /// One line per diagnostic, errors first.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|m| format!("error: {m}"))
            .chain(self.warnings.iter().map(|m| format!("warning: {m}")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_display() {
        let msg = Message::at("src/cell.wgsl", "failed to read").with_plugin("wgsl");
        assert_eq!(msg.to_string(), "[plugin wgsl] src/cell.wgsl: failed to read");
        assert_eq!(Message::new("boom").to_string(), "boom");
    }

    #[test]
    fn test_merge_dedups_inputs() {
        let mut a = BuildResult {
            inputs: vec![PathBuf::from("a.ts"), PathBuf::from("cell.wgsl")],
            ..Default::default()
        };
        let b = BuildResult {
            inputs: vec![PathBuf::from("b.ts"), PathBuf::from("cell.wgsl")],
            warnings: vec![Message::new("careful")],
            ..Default::default()
        };
        a.merge(b);

        assert_eq!(a.inputs.len(), 3);
        assert!(a.has_diagnostics());
        assert_eq!(a.summary(), "warning: careful");
    }
}
