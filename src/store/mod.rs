//! In-memory record storage.
//!
//! A [`Store`] keeps one collection of records in insertion order and hands
//! out identifiers through an injected [`IdGenerator`].

mod error;
mod id;
mod memory;

// Re-export public items
pub use error::Error;
pub use id::{IdGenerator, SequentialIds, UuidIds};
pub use memory::{Record, Store};
