//! HTTP response handlers.

use crate::template::TemplateError;
use crate::utils::error::error_chain;
use crate::utils::mime::types::{HTML, PLAIN};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Per-response header policy.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    /// Send `Cache-Control: no-cache` (dev mode).
    pub no_cache: bool,
}

/// Respond with a static file.
pub fn respond_file(request: Request, path: &Path, policy: Policy) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type, policy);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body, policy)
}

/// Respond with a rendered page.
pub fn respond_page(request: Request, html: String, policy: Policy) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, HTML, policy);
    }
    send_body(request, 200, HTML, html.into_bytes(), policy)
}

/// Map a template failure to 404 (unknown page) or 500 (anything else).
pub fn respond_template_error(request: Request, error: &TemplateError, policy: Policy) -> Result<()> {
    let status = match error {
        TemplateError::NotFound(_) => 404,
        _ => 500,
    };
    crate::log!("serve"; "{status}: {}", error_chain(error));

    if is_head_request(&request) {
        return send_head(request, status, PLAIN, policy);
    }
    send_body(request, status, PLAIN, error_chain(error).into_bytes(), policy)
}

pub fn respond_not_found(request: Request, policy: Policy) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, PLAIN, policy);
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec(), policy)
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    let policy = Policy { no_cache: true };
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec(), policy)
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str, policy: Policy) -> Result<()> {
    let response = with_policy(
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type)),
        policy,
    );
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    policy: Policy,
) -> Result<()> {
    let response = with_policy(
        Response::from_data(body)
            .with_status_code(StatusCode(status))
            .with_header(make_header("Content-Type", content_type)),
        policy,
    );
    request.respond(response)?;
    Ok(())
}

fn with_policy<R: std::io::Read>(response: Response<R>, policy: Policy) -> Response<R> {
    if policy.no_cache {
        response.with_header(make_header("Cache-Control", "no-cache"))
    } else {
        response
    }
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
