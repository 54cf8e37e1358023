//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to. Port 0 picks a free port.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections; extra ones get a 503.
    pub max_connections: usize,
    /// The largest request, head and body together, the server will read.
    pub read_buffer_size: usize,
    /// How long a client has to send its whole request before a 408.
    pub read_timeout: Duration,
}

impl ServerConfig {
    /// Default limits listening on `addr`.
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            addr,
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            max_connections: 1024,
            read_buffer_size: 8192,
            read_timeout: Duration::from_secs(10),
        }
    }
}
