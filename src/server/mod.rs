//! HTTP server implementation.
//!
//! A small tokio server: one request per connection, routes matched by path
//! pattern, a connection limit, and a stop handle for graceful shutdown.

mod response;
mod config;
mod error;
mod handler;
mod http_server;
#[cfg(test)]
pub(crate) mod mock;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::Error;
pub use handler::{HandlerFn, HandlerFuture, Route, RoutePattern};
pub use http_server::HttpServer;
