//! HTTP server for pages and raw source files.
//!
//! | Route               | Response                                  |
//! |---------------------|-------------------------------------------|
//! | `/`                 | index page rendered from the template cache |
//! | `/<prefix>/<path>`  | file under the source directory           |
//! | anything else       | 404                                       |
//!
//! Dev mode adds `Cache-Control: no-cache` to every response.

mod lifecycle;
mod path;
mod response;

pub use lifecycle::{bind_with_retry, resolve_host};

use crate::{config::KilnConfig, log, template::TemplateCache};
use anyhow::{Context, Result};
use path::Route;
use response::Policy;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Request handler worker threads.
const WORKERS: usize = 4;

/// Everything a request handler needs; shared by all workers.
pub struct ServeContext {
    pub config: Arc<KilnConfig>,
    pub templates: Arc<TemplateCache>,
    pub dev_mode: bool,
}

impl ServeContext {
    pub fn new(config: Arc<KilnConfig>, templates: Arc<TemplateCache>, dev_mode: bool) -> Self {
        Self {
            config,
            templates,
            dev_mode,
        }
    }

    fn policy(&self) -> Policy {
        Policy {
            no_cache: self.dev_mode,
        }
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
}

/// Bind the HTTP server on the configured host and register it for shutdown.
pub fn bind_server(config: &KilnConfig) -> Result<BoundServer> {
    let base = resolve_host(&config.serve.host)?;
    let (server, addr) = bind_with_retry(base)?;
    let server = Arc::new(server);

    lifecycle::register_server_for_shutdown(Arc::clone(&server));
    log!("serve"; "http://{}", addr);

    Ok(BoundServer { server })
}

impl BoundServer {
    /// Run the request loop until the server is unblocked (blocking).
    pub fn run(self, context: Arc<ServeContext>) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(WORKERS)
            .build()
            .context("failed to create request thread pool")?;

        for request in self.server.incoming_requests() {
            let context = Arc::clone(&context);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &context) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, context: &ServeContext) -> Result<()> {
    log!("serve"; "{} {}", request.method(), request.url());

    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let config = &context.config;
    let policy = context.policy();

    match path::route(request.url(), config.static_prefix()) {
        Route::Index => {
            let rendered = context
                .templates
                .resolve(&config.serve.index, context.dev_mode)
                .and_then(|page| page.render());
            match rendered {
                Ok(html) => response::respond_page(request, html, policy),
                Err(e) => response::respond_template_error(request, &e, policy),
            }
        }
        Route::Static(rest) => match path::resolve_path(&rest, config.src_dir()) {
            Some(file) => response::respond_file(request, &file, policy),
            None => response::respond_not_found(request, policy),
        },
        Route::NotFound => response::respond_not_found(request, policy),
    }
}

#[cfg(test)]
mod tests;
