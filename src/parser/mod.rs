//! HTTP parser module.
//!
//! Turns the raw bytes read from a connection into an [`HttpRequest`]:
//! request line, headers and a `Content-Length` bounded body.

mod request;
mod method;
mod version;
mod error;
mod tests;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

pub use request::{parse_request, request_complete};
