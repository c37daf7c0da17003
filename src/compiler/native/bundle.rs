//! Script bundling: every relative TypeScript module an entry imports is
//! inlined into the entry's output.
//!
//! Dependencies become lazily evaluated functions appended after the entry,
//! so the entry's own lines keep their positions for the source map:
//!
//! ```text
//! import { grid } from "./_grid.ts";  ─►  const { grid } = __kiln_mod_0();
//! draw(grid);                              draw(grid);
//!                                          var __kiln_cache_0;
//!                                          function __kiln_mod_0() {
//!                                          return __kiln_cache_0 ??= (() => {
//!                                          const grid = 4;
//!                                          return { get grid() { return grid; } };
//!                                          })();
//!                                          }
//! ```
//!
//! Plugin-matched imports are replaced by the loaded content. External,
//! URL and plain `.js` imports stay ES imports; inside dependencies they are
//! hoisted to the top level and rebased onto the entry's directory.
//! Import cycles between bundled modules are rejected.

use std::fs;
use std::path::{Component, Path, PathBuf};

use oxc::allocator::Allocator;
use oxc::ast::ast::{ExportDefaultDeclarationKind, ImportDeclarationSpecifier, Statement};
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType, Span};
use oxc::syntax::module_record::ExportExportName;
use rustc_hash::{FxHashMap, FxHashSet};

use super::Artifact;
use crate::asset::rule::SCRIPT_EXT;
use crate::compiler::{BuildConfig, Format, Message};
use crate::plugin::Loader;
use crate::utils::error::error_chain;

/// Local that holds an anonymous default export.
const DEFAULT_LOCAL: &str = "__kiln_default";

/// Byte-range replacement in a module source.
#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

impl Edit {
    fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            start: span.start as usize,
            end: span.end as usize,
            text: text.into(),
        }
    }

    fn remove(start: u32, end: u32) -> Self {
        Self::replace(Span::new(start, end), "")
    }
}

/// Apply non-overlapping edits, back to front so offsets stay valid.
fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start));
    let mut out = source.to_owned();
    for edit in edits {
        out.replace_range(edit.start..edit.end, &edit.text);
    }
    out
}

pub fn source_type(path: &Path, format: Format) -> SourceType {
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts());
    match format {
        Format::Esm => source_type.with_module(true),
    }
}

/// One name an import statement binds.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Default(String),
    Namespace(String),
    Named { imported: String, local: String },
}

#[derive(Debug)]
enum RequestKind {
    /// `import … from` or a bare `import "…"`.
    Import(Vec<Binding>),
    /// `export { imported as exported } from`.
    ExportNamed(Vec<(String, String)>),
    /// `export * from`, or `export * as name from`.
    ExportAll(Option<String>),
}

/// A statement that pulls in another module.
#[derive(Debug)]
struct Request {
    span: Span,
    specifier: String,
    kind: RequestKind,
}

/// Own export of a module: exported name and the local holding it.
#[derive(Debug)]
struct Export {
    name: String,
    local: String,
}

/// What linking needs to know about one module.
#[derive(Debug, Default)]
struct Outline {
    requests: Vec<Request>,
    exports: Vec<Export>,
    /// `export` keywords and type-only statements, stripped from dependencies.
    strip: Vec<Edit>,
}

fn outline(path: &Path, source: &str, format: Format) -> Result<Outline, Vec<Message>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(path, format)).parse();
    if !ret.errors.is_empty() {
        return Err(ret
            .errors
            .iter()
            .map(|e| Message::at(path, e.to_string()))
            .collect());
    }

    let mut outline = Outline::default();
    let mut type_names = FxHashSet::default();
    let mut stripped = FxHashSet::default();
    // `export { … }` lists; names re-exported from imports only show up here.
    let mut listed = Vec::new();

    for stmt in &ret.program.body {
        if let Some(decl) = stmt.as_declaration()
            && (decl.declare() || decl.is_type())
            && let Some(id) = decl.id()
        {
            type_names.insert(id.name.as_str().to_owned());
        }

        match stmt {
            Statement::ImportDeclaration(decl) => {
                let mut bindings = Vec::new();
                let mut has_specifiers = false;
                for specifier in decl.specifiers.iter().flatten() {
                    has_specifiers = true;
                    match specifier {
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            bindings.push(Binding::Default(s.local.name.as_str().to_owned()));
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            bindings.push(Binding::Namespace(s.local.name.as_str().to_owned()));
                        }
                        ImportDeclarationSpecifier::ImportSpecifier(s) if s.import_kind.is_type() => {
                            type_names.insert(s.local.name.as_str().to_owned());
                        }
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            bindings.push(Binding::Named {
                                imported: s.imported.name().as_str().to_owned(),
                                local: s.local.name.as_str().to_owned(),
                            });
                        }
                    }
                }

                // Type-only imports never load the module.
                if decl.import_kind.is_type() || (has_specifiers && bindings.is_empty()) {
                    outline.strip.push(Edit::remove(decl.span.start, decl.span.end));
                    continue;
                }
                outline.requests.push(Request {
                    span: decl.span,
                    specifier: decl.source.value.as_str().to_owned(),
                    kind: RequestKind::Import(bindings),
                });
            }
            Statement::ExportNamedDeclaration(decl) => {
                if decl.export_kind.is_type() {
                    stripped.insert(decl.span);
                    outline.strip.push(Edit::remove(decl.span.start, decl.span.end));
                    continue;
                }
                if let Some(source) = &decl.source {
                    let names = decl
                        .specifiers
                        .iter()
                        .filter(|s| !s.export_kind.is_type())
                        .map(|s| {
                            (
                                s.local.name().as_str().to_owned(),
                                s.exported.name().as_str().to_owned(),
                            )
                        })
                        .collect();
                    outline.requests.push(Request {
                        span: decl.span,
                        specifier: source.value.as_str().to_owned(),
                        kind: RequestKind::ExportNamed(names),
                    });
                    continue;
                }
                match &decl.declaration {
                    Some(d) if d.declare() || d.is_type() => {
                        stripped.insert(decl.span);
                        outline.strip.push(Edit::remove(decl.span.start, decl.span.end));
                    }
                    // `export const x` → `const x`
                    Some(d) => outline.strip.push(Edit::remove(decl.span.start, d.span().start)),
                    // `export { a, b as c }`
                    None => {
                        outline.strip.push(Edit::remove(decl.span.start, decl.span.end));
                        listed.extend(
                            decl.specifiers
                                .iter()
                                .filter(|s| !s.export_kind.is_type())
                                .map(|s| Export {
                                    name: s.exported.name().as_str().to_owned(),
                                    local: s.local.name().as_str().to_owned(),
                                }),
                        );
                    }
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                let body = decl.declaration.span();
                let named = match &decl.declaration {
                    ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
                        outline.strip.push(Edit::remove(decl.span.start, decl.span.end));
                        continue;
                    }
                    ExportDefaultDeclarationKind::FunctionDeclaration(f) => f.id.as_ref(),
                    ExportDefaultDeclarationKind::ClassDeclaration(c) => c.id.as_ref(),
                    _ => None,
                };

                let local = match named {
                    Some(id) => {
                        outline.strip.push(Edit::remove(decl.span.start, body.start));
                        id.name.as_str().to_owned()
                    }
                    None => {
                        outline.strip.push(Edit::replace(
                            Span::new(decl.span.start, body.start),
                            format!("const {DEFAULT_LOCAL} = "),
                        ));
                        if !source[..decl.span.end as usize].ends_with(';') {
                            outline.strip.push(Edit::replace(
                                Span::new(decl.span.end, decl.span.end),
                                ";",
                            ));
                        }
                        DEFAULT_LOCAL.to_owned()
                    }
                };
                outline.exports.push(Export {
                    name: "default".to_owned(),
                    local,
                });
            }
            Statement::ExportAllDeclaration(decl) => {
                if decl.export_kind.is_type() {
                    outline.strip.push(Edit::remove(decl.span.start, decl.span.end));
                    continue;
                }
                outline.requests.push(Request {
                    span: decl.span,
                    specifier: decl.source.value.as_str().to_owned(),
                    kind: RequestKind::ExportAll(
                        decl.exported.as_ref().map(|n| n.name().as_str().to_owned()),
                    ),
                });
            }
            _ => {}
        }
    }

    let declared = ret
        .module_record
        .local_export_entries
        .iter()
        .filter(|entry| !entry.is_type && !stripped.contains(&entry.statement_span))
        .filter_map(|entry| match (&entry.export_name, entry.local_name.name()) {
            (ExportExportName::Name(name), Some(local)) => Some(Export {
                name: name.name.as_str().to_owned(),
                local: local.as_str().to_owned(),
            }),
            _ => None,
        });
    for export in declared.chain(listed) {
        if type_names.contains(&export.local)
            || outline.exports.iter().any(|e| e.name == export.name)
        {
            continue;
        }
        outline.exports.push(export);
    }

    Ok(outline)
}

/// Where a request resolves to.
enum Target {
    /// Relative TypeScript module, bundled under this id.
    Module(usize),
    /// Plugin output, as a JS expression.
    Inline(String),
    /// Left for the browser to fetch, specifier as seen from the entry.
    Browser(String),
}

/// A top-level import hoisted out of a dependency.
struct Hoisted {
    specifier: String,
    namespace: Option<String>,
}

struct Linker<'a> {
    entry_dir: PathBuf,
    config: &'a BuildConfig,
    artifact: &'a mut Artifact,
    /// Module path → id, in first-visit order.
    modules: FxHashMap<PathBuf, usize>,
    /// Wrapped dependency code by id.
    wrapped: Vec<String>,
    /// Modules being linked, outermost first.
    stack: Vec<PathBuf>,
    hoisted: Vec<Hoisted>,
    errors: Vec<Message>,
}

/// Link `entry` and everything it imports into one module source.
///
/// Every file read (or attempted) is recorded in `artifact.inputs`, failed
/// links included.
pub fn link(
    entry: &Path,
    source: &str,
    config: &BuildConfig,
    artifact: &mut Artifact,
) -> Result<String, Vec<Message>> {
    let mut linker = Linker {
        entry_dir: parent_dir(entry),
        config,
        artifact,
        modules: FxHashMap::default(),
        wrapped: Vec::new(),
        stack: vec![entry.to_path_buf()],
        hoisted: Vec::new(),
        errors: Vec::new(),
    };

    let mut code = linker.link_module(entry, source, None);
    if !linker.errors.is_empty() {
        return Err(linker.errors);
    }

    for hoisted in &linker.hoisted {
        let specifier = quote(&hoisted.specifier);
        match &hoisted.namespace {
            Some(ns) => code.push_str(&format!("\nimport * as {ns} from {specifier};")),
            None => code.push_str(&format!("\nimport {specifier};")),
        }
    }
    for wrapped in &linker.wrapped {
        code.push('\n');
        code.push_str(wrapped);
    }
    Ok(code)
}

impl Linker<'_> {
    /// Edited source of the entry, or the wrapped function of dependency `id`.
    fn link_module(&mut self, path: &Path, source: &str, id: Option<usize>) -> String {
        let is_entry = id.is_none();
        let outline = match outline(path, source, self.config.format) {
            Ok(outline) => outline,
            Err(errors) => {
                self.errors.extend(errors);
                return String::new();
            }
        };

        let dir = parent_dir(path);
        let mut edits = if is_entry { Vec::new() } else { outline.strip };
        // Return-object members of a dependency beyond its own exports.
        let mut members = Vec::new();

        for request in outline.requests {
            let Some(target) = self.resolve(path, &dir, &request.specifier) else {
                continue;
            };
            let fail = |text: String| Message::at(path, text);

            // The entry keeps browser imports and re-exports as written.
            if is_entry && matches!(target, Target::Browser(_)) {
                continue;
            }

            let text = match (&request.kind, target) {
                (RequestKind::Import(bindings), Target::Inline(value)) => {
                    match inline_bindings(bindings, &value) {
                        Ok(text) => text,
                        Err(text) => {
                            self.errors.push(fail(format!("\"{}\" {text}", request.specifier)));
                            continue;
                        }
                    }
                }
                (_, Target::Inline(_)) => {
                    self.errors.push(fail(format!(
                        "\"{}\" is loaded by a plugin and can only be imported",
                        request.specifier
                    )));
                    continue;
                }
                (RequestKind::Import(bindings), target) => {
                    let ns = self.namespace(target, !bindings.is_empty());
                    match ns {
                        Some(ns) if bindings.is_empty() => format!("{ns};"),
                        Some(ns) => bind(bindings, &ns),
                        None => String::new(),
                    }
                }
                (RequestKind::ExportNamed(names), target) => {
                    let Some(ns) = self.namespace(target, true) else {
                        continue;
                    };
                    if is_entry {
                        match reexport_named(names, &ns) {
                            Ok(text) => text,
                            Err(text) => {
                                self.errors.push(fail(text));
                                continue;
                            }
                        }
                    } else {
                        members.extend(
                            names
                                .iter()
                                .map(|(imported, exported)| getter(exported, &member(&ns, imported))),
                        );
                        String::new()
                    }
                }
                (RequestKind::ExportAll(name), target) => {
                    let Some(ns) = self.namespace(target, true) else {
                        continue;
                    };
                    match (is_entry, name) {
                        (true, Some(name)) if is_identifier(name) => {
                            format!("export const {name} = {ns};")
                        }
                        (true, _) => {
                            self.errors.push(fail(format!(
                                "cannot re-export everything from bundled module \"{}\"",
                                request.specifier
                            )));
                            continue;
                        }
                        (false, Some(name)) => {
                            members.push(getter(name, &ns));
                            String::new()
                        }
                        (false, None) => {
                            members.push(format!("...(({{ default: _, ...rest }}) => rest)({ns})"));
                            String::new()
                        }
                    }
                }
            };
            edits.push(Edit::replace(request.span, text));
        }

        let code = apply_edits(source, edits);
        let Some(id) = id else {
            return code;
        };

        // Star re-exports first so own exports shadow them.
        members.sort_by_key(|m| !m.starts_with("..."));
        let own = outline
            .exports
            .iter()
            .map(|export| getter(&export.name, &export.local));
        let members: Vec<_> = members.into_iter().chain(own).collect();
        code_for_dependency(id, &code, &members)
    }

    fn resolve(&mut self, importer: &Path, dir: &Path, specifier: &str) -> Option<Target> {
        let config = self.config;
        if is_url_like(specifier) {
            return Some(Target::Browser(specifier.to_owned()));
        }
        if !is_relative(specifier) {
            if config.is_external(specifier) {
                return Some(Target::Browser(specifier.to_owned()));
            }
            self.errors.push(Message::at(
                importer,
                format!(
                    "could not resolve \"{specifier}\": package imports are not available on the {} platform",
                    config.platform.name()
                ),
            ));
            return None;
        }

        let target = resolve_relative(dir, specifier);
        if config.is_external(specifier) {
            return Some(Target::Browser(self.rebase(&target)));
        }

        if let Some(plugin) = config.plugins.find(&target) {
            self.track(&target);
            return match plugin.on_load(&target) {
                Ok(loaded) => Some(Target::Inline(match loaded.loader {
                    Loader::Text => quote(&loaded.contents),
                })),
                Err(e) => {
                    self.errors
                        .push(Message::at(&target, error_chain(&e)).with_plugin(plugin.name()));
                    None
                }
            };
        }

        match target.extension().and_then(|e| e.to_str()) {
            Some("ts") => self.visit(importer, &target).map(Target::Module),
            Some("js" | "mjs") => Some(Target::Browser(self.rebase(&target))),
            Some(ext) => {
                self.errors.push(Message::at(
                    importer,
                    format!("no loader is configured for \".{ext}\" files: {specifier}"),
                ));
                None
            }
            None => {
                self.errors.push(Message::at(
                    importer,
                    format!("could not resolve \"{specifier}\""),
                ));
                None
            }
        }
    }

    /// Bundle a dependency (once) and return its id.
    fn visit(&mut self, importer: &Path, path: &Path) -> Option<usize> {
        if self.stack.iter().any(|p| p == path) {
            self.errors.push(Message::at(
                importer,
                format!(
                    "circular import of \"{}\" cannot be bundled",
                    path.display()
                ),
            ));
            return None;
        }
        if let Some(&id) = self.modules.get(path) {
            return Some(id);
        }

        self.track(path);
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                self.errors.push(Message::at(
                    importer,
                    format!("could not read \"{}\": {e}", path.display()),
                ));
                return None;
            }
        };

        let id = self.wrapped.len();
        self.modules.insert(path.to_path_buf(), id);
        self.wrapped.push(String::new());

        self.stack.push(path.to_path_buf());
        self.wrapped[id] = self.link_module(path, &source, Some(id));
        self.stack.pop();

        Some(id)
    }

    /// JS expression for a target's module namespace. Side-effect-only
    /// browser imports are hoisted without a namespace and yield `None`.
    fn namespace(&mut self, target: Target, named: bool) -> Option<String> {
        match target {
            Target::Module(id) => Some(format!("__kiln_mod_{id}()")),
            Target::Inline(value) => Some(value),
            Target::Browser(specifier) if named => Some(self.hoist_namespace(specifier)),
            Target::Browser(specifier) => {
                if !self.hoisted.iter().any(|h| h.specifier == specifier) {
                    self.hoisted.push(Hoisted {
                        specifier,
                        namespace: None,
                    });
                }
                None
            }
        }
    }

    fn hoist_namespace(&mut self, specifier: String) -> String {
        if let Some(ns) = self
            .hoisted
            .iter()
            .find(|h| h.specifier == specifier)
            .and_then(|h| h.namespace.clone())
        {
            return ns;
        }
        let ns = format!("__kiln_ext_{}", self.hoisted.len());
        self.hoisted.push(Hoisted {
            specifier,
            namespace: Some(ns.clone()),
        });
        ns
    }

    /// Specifier for `target` as seen from the entry.
    fn rebase(&self, target: &Path) -> String {
        relative_specifier(&self.entry_dir, target)
    }

    fn track(&mut self, path: &Path) {
        if !self.artifact.inputs.iter().any(|p| p == path) {
            self.artifact.inputs.push(path.to_path_buf());
        }
    }
}

/// Memoized module function around a dependency body.
fn code_for_dependency(id: usize, body: &str, members: &[String]) -> String {
    format!(
        "var __kiln_cache_{id};\nfunction __kiln_mod_{id}() {{\nreturn __kiln_cache_{id} ??= (() => {{\n{}\nreturn {{ {} }};\n}})();\n}}",
        body.trim_end(),
        members.join(", ")
    )
}

/// Declarations binding an import's names from a namespace expression.
fn bind(bindings: &[Binding], ns: &str) -> String {
    let mut decls = Vec::new();
    let mut named = Vec::new();
    for binding in bindings {
        match binding {
            Binding::Default(local) => decls.push(format!("const {local} = {};", member(ns, "default"))),
            Binding::Namespace(local) => decls.push(format!("const {local} = {ns};")),
            Binding::Named { imported, local } if imported == local => named.push(local.clone()),
            Binding::Named { imported, local } => {
                named.push(format!("{}: {local}", property_key(imported)));
            }
        }
    }
    if !named.is_empty() {
        decls.push(format!("const {{ {} }} = {ns};", named.join(", ")));
    }
    decls.join(" ")
}

/// Declarations replacing an import of plugin-loaded content.
fn inline_bindings(bindings: &[Binding], value: &str) -> Result<String, &'static str> {
    let mut decls = Vec::new();
    for binding in bindings {
        match binding {
            Binding::Default(local) => decls.push(format!("const {local} = {value};")),
            Binding::Namespace(local) => decls.push(format!("const {local} = {{ default: {value} }};")),
            Binding::Named { .. } => return Err("only provides a default export"),
        }
    }
    Ok(decls.join(" "))
}

/// Entry-level `export { a as b } from` for a bundled module.
fn reexport_named(names: &[(String, String)], ns: &str) -> Result<String, String> {
    let mut decls = Vec::new();
    for (imported, exported) in names {
        let value = member(ns, imported);
        if exported == "default" {
            decls.push(format!("export default {value};"));
        } else if is_identifier(exported) {
            decls.push(format!("export const {exported} = {value};"));
        } else {
            return Err(format!("cannot re-export \"{exported}\" from a bundled module"));
        }
    }
    Ok(decls.join(" "))
}

fn getter(name: &str, value: &str) -> String {
    format!("get {}() {{ return {value}; }}", property_key(name))
}

fn member(object: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{object}.{name}")
    } else {
        format!("{object}[{}]", quote(name))
    }
}

fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_owned()
    } else {
        quote(name)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{text:?}"))
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

fn is_url_like(specifier: &str) -> bool {
    specifier.starts_with('/') || specifier.contains("://")
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Resolve `./x` against the importer's directory without touching the
/// filesystem, trying `.ts` for extensionless specifiers.
fn resolve_relative(dir: &Path, specifier: &str) -> PathBuf {
    let mut target = dir.to_path_buf();
    for component in Path::new(specifier).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !target.pop() {
                    target.push("..");
                }
            }
            other => target.push(other),
        }
    }
    if target.extension().is_none() && !target.exists() {
        let mut with_ext = target.into_os_string();
        with_ext.push(SCRIPT_EXT);
        return PathBuf::from(with_ext);
    }
    target
}

/// `./`-prefixed relative URL from `from_dir` to `target`.
fn relative_specifier(from_dir: &Path, target: &Path) -> String {
    let from: Vec<_> = from_dir.components().collect();
    let to: Vec<_> = target.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = std::iter::repeat_n("..".to_owned(), from.len() - common).collect();
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outline_of(source: &str) -> Outline {
        outline(Path::new("mod.ts"), source, Format::Esm).unwrap()
    }

    fn export_names(outline: &Outline) -> Vec<(&str, &str)> {
        outline
            .exports
            .iter()
            .map(|e| (e.name.as_str(), e.local.as_str()))
            .collect()
    }

    #[test]
    fn test_apply_edits_back_to_front() {
        let source = "import a from \"./a.wgsl\";\nimport b from \"./b.ts\";\nrun(a, b);";
        let edits = vec![
            Edit {
                start: 0,
                end: 25,
                text: "const a = \"A\";".to_owned(),
            },
            Edit {
                start: 40,
                end: 48,
                text: "\"./b.js\"".to_owned(),
            },
        ];
        let out = apply_edits(source, edits);
        assert_eq!(out, "const a = \"A\";\nimport b from \"./b.js\";\nrun(a, b);");
    }

    #[test]
    fn test_outline_collects_value_exports() {
        let outline = outline_of(
            "export const width = 4, height = 8;\n\
             export function step() {}\n\
             export interface Cell { alive: boolean }\n\
             export type Grid = Cell[];\n\
             const hidden = 1;\n\
             export { hidden as shown };\n\
             export default class Board {}\n",
        );

        assert_eq!(
            export_names(&outline),
            [
                ("default", "Board"),
                ("width", "width"),
                ("height", "height"),
                ("step", "step"),
                ("shown", "hidden"),
            ]
        );
        assert!(outline.requests.is_empty());
    }

    #[test]
    fn test_outline_anonymous_default() {
        let source = "export default 4 * 8";
        let outline = outline_of(source);
        assert_eq!(export_names(&outline), [("default", DEFAULT_LOCAL)]);

        let code = apply_edits(source, outline.strip);
        assert_eq!(code, format!("const {DEFAULT_LOCAL} = 4 * 8;"));
    }

    #[test]
    fn test_outline_skips_type_imports() {
        let outline = outline_of(
            "import type { Cell } from \"./_types.ts\";\n\
             import { type Grid } from \"./_grid.ts\";\n\
             import { step, type Rule } from \"./_rules.ts\";\n\
             import \"./_setup.ts\";\n",
        );

        let specifiers: Vec<_> = outline.requests.iter().map(|r| r.specifier.as_str()).collect();
        assert_eq!(specifiers, ["./_rules.ts", "./_setup.ts"]);
        let RequestKind::Import(bindings) = &outline.requests[0].kind else {
            panic!("expected import");
        };
        assert_eq!(
            bindings,
            &[Binding::Named {
                imported: "step".to_owned(),
                local: "step".to_owned()
            }]
        );
        assert_eq!(outline.strip.len(), 2);
    }

    #[test]
    fn test_bind_statements() {
        let bindings = vec![
            Binding::Default("grid".to_owned()),
            Binding::Named {
                imported: "step".to_owned(),
                local: "step".to_owned(),
            },
            Binding::Named {
                imported: "size".to_owned(),
                local: "gridSize".to_owned(),
            },
        ];
        assert_eq!(
            bind(&bindings, "__kiln_mod_0()"),
            "const grid = __kiln_mod_0().default; const { step, size: gridSize } = __kiln_mod_0();"
        );
    }

    #[test]
    fn test_inline_text_binding_escapes() {
        let bindings = vec![Binding::Default("CellShader".to_owned())];
        let text = inline_bindings(&bindings, &quote("fn main() {\n  \"x\"\n}")).unwrap();
        assert_eq!(text, r#"const CellShader = "fn main() {\n  \"x\"\n}";"#);
    }

    #[test]
    fn test_inline_rejects_named_imports() {
        let bindings = vec![Binding::Named {
            imported: "code".to_owned(),
            local: "code".to_owned(),
        }];
        assert!(inline_bindings(&bindings, "\"x\"").is_err());
    }

    #[test]
    fn test_dependency_wrapper() {
        let code = code_for_dependency(3, "const grid = 4;\n", &[getter("grid", "grid")]);
        assert_eq!(
            code,
            "var __kiln_cache_3;\nfunction __kiln_mod_3() {\nreturn __kiln_cache_3 ??= (() => {\n\
             const grid = 4;\nreturn { get grid() { return grid; } };\n})();\n}"
        );
    }

    #[test]
    fn test_specifier_classes() {
        assert!(is_relative("./a.ts"));
        assert!(is_relative("../a.ts"));
        assert!(!is_relative("lodash"));
        assert!(is_url_like("https://esm.sh/preact"));
        assert!(is_url_like("/static/app.js"));
        assert!(is_identifier("$grid_2"));
        assert!(!is_identifier("2grid"));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn test_resolve_relative_is_lexical() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("life");
        assert_eq!(
            resolve_relative(&base, "../shared/_grid.ts"),
            dir.path().join("shared/_grid.ts")
        );
        assert_eq!(resolve_relative(&base, "./_rules"), base.join("_rules.ts"));
    }

    #[test]
    fn test_relative_specifier() {
        let root = Path::new("/site/src");
        assert_eq!(
            relative_specifier(root, Path::new("/site/src/life/lib.js")),
            "./life/lib.js"
        );
        assert_eq!(
            relative_specifier(&root.join("game"), Path::new("/site/src/icons/play.svg")),
            "../icons/play.svg"
        );
    }
}
