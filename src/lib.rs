//! A small in-memory recipe and shopping-list HTTP API.
//!
//! The crate is split into four layers:
//!
//! - [`parser`]: turns raw request bytes into an [`HttpRequest`]
//! - [`server`]: a tokio HTTP server with pattern routing and graceful shutdown
//! - [`store`]: insertion-ordered in-memory collections with pluggable ids
//! - [`api`]: the `/recipes` and `/shopping-list` CRUD routes
//!
//! # Examples
//!
//! ```no_run
//! use recipe_box::{api, HttpServer, ServerConfig, Stores};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), recipe_box::ServerError> {
//!     let stores = Stores::sequential();
//!     stores.seed();
//!
//!     let server = HttpServer::new(ServerConfig::default());
//!     api::mount(&server, &stores).await;
//!     server.start().await
//! }
//! ```
//!
//! Records serialize flat:
//!
//! ```
//! use recipe_box::{RecipeFields, Record};
//!
//! let recipe = Record {
//!     id: "1".to_string(),
//!     fields: RecipeFields { name: "bread".to_string(), ingredients: vec!["water".to_string()] },
//! };
//! assert_eq!(
//!     serde_json::to_string(&recipe).unwrap(),
//!     r#"{"id":"1","name":"bread","ingredients":["water"]}"#
//! );
//! ```

pub mod api;
pub mod parser;
pub mod server;
pub mod store;

// Re-export commonly used items for convenience
pub use api::{Recipe, RecipeFields, ShoppingListFields, ShoppingListItem, Stores};
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{Error as ServerError, HttpResponse, HttpServer, ServerConfig, StatusCode};
pub use store::{Error as StoreError, IdGenerator, Record, SequentialIds, Store, UuidIds};
