//! URL routing and URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// What a request URL maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`: the index page.
    Index,
    /// `/<prefix>/<rest>`: a raw file under the source directory.
    Static(String),
    NotFound,
}

/// Map a request URL to a route. `prefix` has no surrounding slashes.
pub fn route(url: &str, prefix: &str) -> Route {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path == "/" {
        return Route::Index;
    }

    path.strip_prefix('/')
        .and_then(|p| p.strip_prefix(prefix))
        .and_then(|p| p.strip_prefix('/'))
        .map_or(Route::NotFound, |rest| Route::Static(rest.to_owned()))
}

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.split('/').any(|seg| seg == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Symlinks and encoded sequences must still land under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: decode, strip query string, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let path = url.split('?').next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}
