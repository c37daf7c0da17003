//! Classification rules for entry discovery.
//!
//! Rules are evaluated in order against the raw bytes of a file's base name,
//! so names that are not valid UTF-8 still classify. The first rule
//! whose predicate matches decides the outcome; a file no rule matches is not
//! an entry point.
//!
//! ```text
//! partial   _helper.ts, _reset.css  → skip
//! test      util.test.ts            → skip
//! script    life.ts                 → Script
//! style     site.css (bundle only)  → Style   (site.min.css is output, never input)
//! ```

use std::ffi::OsStr;

use super::EntryKind;

/// Prefix marking a partial that is only ever imported by an entry.
pub const PARTIAL_PREFIX: &str = "_";
/// Suffix marking a test module.
pub const TEST_SUFFIX: &str = ".test.ts";
/// Compiled-language extension.
pub const SCRIPT_EXT: &str = ".ts";
/// Stylesheet extension.
pub const STYLE_EXT: &str = ".css";
/// Already-minified stylesheet (also what style outputs are remapped to).
pub const MINIFIED_STYLE_EXT: &str = ".min.css";

/// What a matching rule does with the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skip,
    Entry(EntryKind),
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&[u8]) -> bool,
    pub outcome: Outcome,
    /// Rule only applies when bundling is enabled.
    pub requires_bundle: bool,
}

impl Rule {
    fn applies(&self, name: &[u8], bundle: bool) -> bool {
        (bundle || !self.requires_bundle) && (self.matches)(name)
    }
}

pub fn is_partial(name: &[u8]) -> bool {
    name.starts_with(PARTIAL_PREFIX.as_bytes())
}

pub fn is_test(name: &[u8]) -> bool {
    name.ends_with(TEST_SUFFIX.as_bytes())
}

pub fn is_script(name: &[u8]) -> bool {
    name.ends_with(SCRIPT_EXT.as_bytes())
}

pub fn is_style(name: &[u8]) -> bool {
    name.ends_with(STYLE_EXT.as_bytes()) && !name.ends_with(MINIFIED_STYLE_EXT.as_bytes())
}

/// Ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            rules: vec![
                Rule {
                    name: "partial",
                    matches: is_partial,
                    outcome: Outcome::Skip,
                    requires_bundle: false,
                },
                Rule {
                    name: "test",
                    matches: is_test,
                    outcome: Outcome::Skip,
                    requires_bundle: false,
                },
                Rule {
                    name: "script",
                    matches: is_script,
                    outcome: Outcome::Entry(EntryKind::Script),
                    requires_bundle: false,
                },
                Rule {
                    name: "style",
                    matches: is_style,
                    outcome: Outcome::Entry(EntryKind::Style),
                    requires_bundle: true,
                },
            ],
        }
    }
}

impl RuleTable {
    /// Classify a base file name. `None` means "not an entry point".
    pub fn classify(&self, name: impl AsRef<OsStr>, bundle: bool) -> Option<EntryKind> {
        let name = name.as_ref();
        let bytes = name.as_encoded_bytes();
        let rule = self.rules.iter().find(|r| r.applies(bytes, bundle))?;
        crate::debug!("discover"; "{} matched rule `{}`", name.to_string_lossy(), rule.name);
        match rule.outcome {
            Outcome::Skip => None,
            Outcome::Entry(kind) => Some(kind),
        }
    }
}
