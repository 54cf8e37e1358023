//! Error types for the HTTP server.

use std::time::Duration;

use thiserror::Error;

use crate::parser::{Error as ParserError, Method};
use crate::server::response::{HttpResponse, StatusCode};
use crate::store::Error as StoreError;

/// Errors that can occur during HTTP server operation.
///
/// Handlers return these; the server turns each into a response through
/// [`Error::to_response`], so a failing handler never takes the server down.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request or its body.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The request is well formed but its content is not acceptable.
    #[error("{0}")]
    BadRequest(String),

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Method not allowed for the requested resource.
    #[error("Method {method} not allowed for path: {path}")]
    MethodNotAllowed {
        /// The method the client used.
        method: Method,
        /// The request path.
        path: String,
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },

    /// The request did not fit in the read buffer.
    #[error("Request exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// The client did not finish sending its request in time.
    #[error("Request not received within {0:?}")]
    RequestTimeout(Duration),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// JSON serialization error while building a response.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Error::NotFound(err.to_string()),
        }
    }
}

impl Error {
    /// The status code reported to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::ParseError(_) | Error::BadRequest(_) => StatusCode::BadRequest,
            Error::NotFound(_) => StatusCode::NotFound,
            Error::MethodNotAllowed { .. } => StatusCode::MethodNotAllowed,
            Error::PayloadTooLarge(_) => StatusCode::PayloadTooLarge,
            Error::RequestTimeout(_) => StatusCode::RequestTimeout,
            Error::IoError(_) | Error::InternalError(_) | Error::JsonError(_) => {
                StatusCode::InternalServerError
            }
        }
    }

    /// Render the error as a plain-text response.
    pub fn to_response(&self) -> HttpResponse {
        let response = HttpResponse::new(self.status_code())
            .with_content_type("text/plain")
            .with_body_string(self.to_string());

        match self {
            Error::MethodNotAllowed { allowed, .. } => {
                let allowed = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                response.with_header("Allow", allowed)
            }
            _ => response,
        }
    }
}
