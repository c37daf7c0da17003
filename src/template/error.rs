use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// No page with this name in the current generation.
    #[error("template not found: {0:?}")]
    NotFound(String),

    #[error("failed to read template `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse page `{page}`: {detail}")]
    Parse { page: String, detail: String },

    #[error("failed to render page `{page}`")]
    Render {
        page: String,
        #[source]
        source: minijinja::Error,
    },
}
