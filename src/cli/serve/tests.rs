use std::fs;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;

use tempfile::TempDir;

use super::*;
use crate::template::TrustedFs;

fn site() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("life")).unwrap();
    fs::write(
        root.join("base.tmpl"),
        "<html>{% for m in members %}{% include m %}{% endfor %}</html>",
    )
    .unwrap();
    fs::write(root.join("life/life.tmpl"), "<canvas></canvas>").unwrap();
    fs::write(root.join("life.js"), "console.log(1);").unwrap();
    dir
}

fn context(dir: &TempDir, dev_mode: bool) -> Arc<ServeContext> {
    let mut config = KilnConfig::default();
    config.build.src = dir.path().to_path_buf();
    let templates = TemplateCache::new(TrustedFs::new(dir.path()), config.layout());
    Arc::new(ServeContext::new(
        Arc::new(config),
        Arc::new(templates),
        dev_mode,
    ))
}

/// Send one raw request through `handle_request` and return the raw response.
fn exchange(context: Arc<ServeContext>, method: &str, url: &str) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    let worker = thread::spawn(move || {
        let request = server.recv().unwrap();
        handle_request(request, &context).unwrap();
    });

    let mut stream = TcpStream::connect(addr).unwrap();
    write!(
        stream,
        "{method} {url} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
    )
    .unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    worker.join().unwrap();
    response
}

#[test]
fn test_index_renders_page() {
    let dir = site();
    let response = exchange(context(&dir, false), "GET", "/");

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("text/html"));
    assert!(response.ends_with("<html><canvas></canvas></html>"));
    assert!(!response.contains("no-cache"));
}

#[test]
fn test_static_file_served() {
    let dir = site();
    let response = exchange(context(&dir, false), "GET", "/src/life.js");

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("text/javascript"));
    assert!(response.ends_with("console.log(1);"));
}

#[test]
fn test_head_has_no_body() {
    let dir = site();
    let response = exchange(context(&dir, false), "HEAD", "/src/life.js");

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(!response.contains("console.log"));
}

#[test]
fn test_unknown_paths_are_404() {
    let dir = site();
    assert!(exchange(context(&dir, false), "GET", "/life").starts_with("HTTP/1.1 404"));
    assert!(exchange(context(&dir, false), "GET", "/src/missing.js").starts_with("HTTP/1.1 404"));
    assert!(exchange(context(&dir, false), "GET", "/src/../base.tmpl").starts_with("HTTP/1.1 404"));
}

#[test]
fn test_dev_mode_disables_caching() {
    let dir = site();
    let response = exchange(context(&dir, true), "GET", "/src/life.js");

    assert!(response.contains("Cache-Control: no-cache"), "{response}");
}

#[test]
fn test_template_parse_error_is_500() {
    let dir = site();
    fs::write(dir.path().join("life/life.tmpl"), "{% if %}").unwrap();

    let response = exchange(context(&dir, true), "GET", "/");
    assert!(response.starts_with("HTTP/1.1 500"), "{response}");
}

#[test]
fn test_missing_index_page_is_404() {
    let dir = site();
    let mut config = KilnConfig::default();
    config.build.src = dir.path().to_path_buf();
    config.serve.index = "game".to_owned();
    let templates = TemplateCache::new(TrustedFs::new(dir.path()), config.layout());
    let context = Arc::new(ServeContext::new(Arc::new(config), Arc::new(templates), false));

    assert!(exchange(context, "GET", "/").starts_with("HTTP/1.1 404"));
}
