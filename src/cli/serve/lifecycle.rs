//! Server lifecycle management.

use crate::{core::register_server, log};
use anyhow::{Context, Result};
use std::{
    net::{SocketAddr, ToSocketAddrs},
    sync::Arc,
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Resolve `host:port`, preferring IPv4 when a name has both.
pub fn resolve_host(host: &str) -> Result<SocketAddr> {
    let addrs: Vec<_> = host
        .to_socket_addrs()
        .with_context(|| format!("invalid host address `{host}`"))?
        .collect();

    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .with_context(|| format!("host `{host}` resolved to no addresses"))
}

/// Bind to the given address, trying the next ports when it is taken.
pub fn bind_with_retry(base: SocketAddr) -> Result<(Server, SocketAddr)> {
    let base_port = base.port();
    // Port 0 lets the OS pick; retrying it is pointless.
    let attempts = if base_port == 0 { 1 } else { MAX_PORT_RETRIES };

    for offset in 0..attempts {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(base.ip(), port);

        match Server::http(addr) {
            Ok(server) => {
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < attempts => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    attempts,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Register server for graceful shutdown.
pub fn register_server_for_shutdown(server: Arc<Server>) {
    register_server(server);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_host() {
        let addr = resolve_host("127.0.0.1:8080").unwrap();
        assert_eq!(addr, "127.0.0.1:8080".parse::<std::net::SocketAddr>().unwrap());
        assert!(resolve_host("no-port").is_err());
    }

    #[test]
    fn test_bind_retries_next_port() {
        let (first, addr) = bind_with_retry("127.0.0.1:0".parse().unwrap()).unwrap();
        let (_second, next) = bind_with_retry(addr).unwrap();

        assert_ne!(addr.port(), next.port());
        assert!(next.port() > addr.port());
        drop(first);
    }
}
