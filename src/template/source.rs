//! Template files on disk and how they group into pages.

use std::fs;
use std::path::{Component, Path, PathBuf};

use minijinja::{AutoEscape, Environment, Value, context};

use super::TemplateError;
use super::funcs;

pub const DEFAULT_BASE: &str = "base.tmpl";
pub const DEFAULT_INDEX: &str = "life";

/// Read access confined to one directory.
///
/// Names are `/`-separated and relative; absolute names and `..` are refused.
#[derive(Debug, Clone)]
pub struct TrustedFs {
    root: PathBuf,
}

impl TrustedFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, TemplateError> {
        let rel = Path::new(name);
        let trusted = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !trusted {
            return Err(TemplateError::Read {
                path: rel.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "path escapes the template root",
                ),
            });
        }
        Ok(self.root.join(rel))
    }

    pub fn read(&self, name: &str) -> Result<String, TemplateError> {
        let path = self.resolve(name)?;
        fs::read_to_string(&path).map_err(|source| TemplateError::Read { path, source })
    }

    /// Names matching `pattern`, sorted.
    pub fn glob(&self, pattern: &str) -> Result<Vec<String>, TemplateError> {
        self.resolve(pattern)?;
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let query = format!("{root}/{pattern}");

        let paths = glob::glob(&query).map_err(|e| TemplateError::Parse {
            page: pattern.to_owned(),
            detail: e.to_string(),
        })?;

        let mut names = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| TemplateError::Read {
                path: e.path().to_path_buf(),
                source: e.into(),
            })?;
            if !path.is_file() {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(&self.root) {
                names.push(to_name(rel));
            }
        }
        names.sort();
        Ok(names)
    }
}

fn to_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Which files make up each page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Root template rendered for every page.
    pub base: String,
    /// Page names; each page also parses `<group>/*.tmpl`.
    pub groups: Vec<String>,
    /// Helper templates parsed into every page.
    pub shared: Option<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_owned(),
            groups: vec![DEFAULT_INDEX.to_owned()],
            shared: None,
        }
    }
}

/// One parsed page, renderable without further input.
#[derive(Debug)]
pub struct PageTemplate {
    name: String,
    base: String,
    generation: u64,
    env: Environment<'static>,
}

impl PageTemplate {
    /// Reparse count at the time this page was built.
    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Render with an empty context.
    pub fn render(&self) -> Result<String, TemplateError> {
        crate::debug!("template"; "render {} from generation {}", self.name, self.generation);
        let render_err = |source| TemplateError::Render {
            page: self.name.clone(),
            source,
        };
        let template = self.env.get_template(&self.base).map_err(render_err)?;
        template.render(context! {}).map_err(render_err)
    }
}

/// Parse the base, shared helpers and members of one group.
pub fn parse_page(
    fs: &TrustedFs,
    layout: &Layout,
    group: &str,
    generation: u64,
) -> Result<PageTemplate, TemplateError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    funcs::register(&mut env);

    let parse_err = |name: &str, e: minijinja::Error| TemplateError::Parse {
        page: group.to_owned(),
        detail: format!("{name}: {e:#}"),
    };

    let mut names = vec![layout.base.clone()];
    if let Some(shared) = &layout.shared {
        names.extend(fs.glob(shared)?);
    }

    let member_glob = format!("{group}/*.tmpl");
    let members = fs.glob(&member_glob)?;
    if members.is_empty() {
        return Err(TemplateError::Parse {
            page: group.to_owned(),
            detail: format!("pattern matches no files: {member_glob}"),
        });
    }
    names.extend(members.iter().cloned());

    for name in names {
        let source = fs.read(&name)?;
        env.add_template_owned(name.clone(), source)
            .map_err(|e| parse_err(&name, e))?;
    }

    env.add_global("group", Value::from(group));
    env.add_global("members", Value::from(members));

    Ok(PageTemplate {
        name: group.to_owned(),
        base: layout.base.clone(),
        generation,
        env,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_trusted_fs_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let fs = TrustedFs::new(dir.path());

        assert!(fs.read("../secret").is_err());
        assert!(fs.read("/etc/passwd").is_err());
    }

    #[test]
    fn test_glob_sorted_relative_names() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "life/b.tmpl", "");
        write(dir.path(), "life/a.tmpl", "");
        write(dir.path(), "life/notes.txt", "");

        let names = TrustedFs::new(dir.path()).glob("life/*.tmpl").unwrap();
        assert_eq!(names, vec!["life/a.tmpl", "life/b.tmpl"]);
    }

    #[test]
    fn test_parse_page_renders_members() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "base.tmpl",
            "<title>{{ group | capitalize }}</title>{% for m in members %}{% include m %}{% endfor %}",
        );
        write(dir.path(), "life/life.tmpl", "<canvas id=\"{{ group }}\"></canvas>");

        let page = parse_page(&TrustedFs::new(dir.path()), &Layout::default(), "life", 1).unwrap();

        assert_eq!(page.generation(), 1);
        assert_eq!(
            page.render().unwrap(),
            "<title>Life</title><canvas id=\"life\"></canvas>"
        );
    }

    #[test]
    fn test_shared_helpers_parsed() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "base.tmpl",
            "{% import 'shared/ui/button.tmpl' as ui %}{{ ui.button('go') }}",
        );
        write(
            dir.path(),
            "shared/ui/button.tmpl",
            "{% macro button(label) %}<button>{{ label }}</button>{% endmacro %}",
        );
        write(dir.path(), "life/life.tmpl", "");

        let layout = Layout {
            shared: Some("shared/*/*.tmpl".to_owned()),
            ..Layout::default()
        };
        let page = parse_page(&TrustedFs::new(dir.path()), &layout, "life", 1).unwrap();

        assert_eq!(page.render().unwrap(), "<button>go</button>");
    }

    #[test]
    fn test_output_is_escaped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "base.tmpl", "{{ '<b>' }}");
        write(dir.path(), "life/life.tmpl", "");

        let page = parse_page(&TrustedFs::new(dir.path()), &Layout::default(), "life", 1).unwrap();
        assert_eq!(page.render().unwrap(), "&lt;b&gt;");
    }

    #[test]
    fn test_empty_group_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "base.tmpl", "");

        let err = parse_page(&TrustedFs::new(dir.path()), &Layout::default(), "life", 1).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
        assert!(err.to_string().contains("matches no files"));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "base.tmpl", "{% if %}");
        write(dir.path(), "life/life.tmpl", "");

        let err = parse_page(&TrustedFs::new(dir.path()), &Layout::default(), "life", 1).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }

    #[test]
    fn test_missing_base_is_read_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "life/life.tmpl", "");

        let err = parse_page(&TrustedFs::new(dir.path()), &Layout::default(), "life", 1).unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
    }
}
