//! Error types for the record store.

use thiserror::Error;

/// Errors returned by [`Store`](crate::store::Store) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No record has the given id.
    #[error("No record with id `{0}`")]
    NotFound(String),
}
