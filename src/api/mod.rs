//! The recipe and shopping-list HTTP API.
//!
//! Each collection gets the same four routes:
//!
//! | Method | Path             | Success                      |
//! |--------|------------------|------------------------------|
//! | GET    | `/{prefix}`      | 200, JSON array of records   |
//! | POST   | `/{prefix}`      | 201, the created record      |
//! | PUT    | `/{prefix}/{id}` | 200, the updated record      |
//! | DELETE | `/{prefix}/{id}` | 204, empty                   |
//!
//! Missing `name`/`ingredients` give 400, unknown ids give 404.

mod handlers;
mod models;

use std::sync::Arc;

use log::info;

use crate::parser::Method;
use crate::server::HttpServer;
use crate::store::{IdGenerator, SequentialIds, Store};

pub use handlers::{create, list, remove, update};
pub use models::{Recipe, RecipeFields, RecordBody, Resource, ShoppingListFields, ShoppingListItem};

/// Path prefix of the recipes collection.
pub const RECIPES_PATH: &str = "/recipes";
/// Path prefix of the shopping-list collection.
pub const SHOPPING_LIST_PATH: &str = "/shopping-list";

/// The stores behind the API, one per collection.
pub struct Stores {
    pub recipes: Arc<Store<RecipeFields>>,
    pub shopping_list: Arc<Store<ShoppingListFields>>,
}

impl Stores {
    /// Empty stores, each with its own generator from `make_ids`.
    pub fn new(make_ids: impl Fn() -> Box<dyn IdGenerator>) -> Self {
        Self {
            recipes: Arc::new(Store::with_generator(make_ids())),
            shopping_list: Arc::new(Store::with_generator(make_ids())),
        }
    }

    /// Empty stores numbering their records from 1.
    pub fn sequential() -> Self {
        Self::new(|| Box::new(SequentialIds::new()) as Box<dyn IdGenerator>)
    }

    /// Fill the stores with the starter records.
    pub fn seed(&self) {
        let recipes = [
            ("boiled white rice", &["1 cup white rice", "2 cups water", "pinch of salt"][..]),
            ("milkshake", &["2 tbsp cocoa", "2 cups vanilla ice cream", "1 cup milk"][..]),
        ];
        for (name, ingredients) in recipes {
            self.recipes.insert(RecipeFields::from_parts(name.to_string(), to_strings(ingredients)));
        }

        for name in ["beans", "tomatoes", "peppers"] {
            self.shopping_list.insert(ShoppingListFields::from_parts(name.to_string(), Vec::new()));
        }

        info!(
            "Seeded {recipes} recipes and {items} shopping-list items",
            recipes = self.recipes.len(),
            items = self.shopping_list.len()
        );
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Register the four CRUD routes for one collection under `prefix`.
pub async fn mount_resource<T: Resource>(server: &HttpServer, prefix: &str, store: Arc<Store<T>>) {
    let item_path = format!("{prefix}/{{id}}");

    let s = store.clone();
    server
        .add_route(prefix, vec![Method::GET], move |_req| {
            let store = s.clone();
            async move { list(&store) }
        })
        .await;

    let s = store.clone();
    server
        .add_route(prefix, vec![Method::POST], move |req| {
            let store = s.clone();
            async move { create(&store, &req) }
        })
        .await;

    let s = store.clone();
    server
        .add_route(item_path.as_str(), vec![Method::PUT], move |req| {
            let store = s.clone();
            async move { update(&store, &req) }
        })
        .await;

    server
        .add_route(item_path.as_str(), vec![Method::DELETE], move |req| {
            let store = store.clone();
            async move { remove(&store, &req) }
        })
        .await;
}

/// Register both collections on `server`.
pub async fn mount(server: &HttpServer, stores: &Stores) {
    mount_resource(server, RECIPES_PATH, stores.recipes.clone()).await;
    mount_resource(server, SHOPPING_LIST_PATH, stores.shopping_list.clone()).await;
}
