//! Resource types exposed over HTTP.

use serde::{Deserialize, Serialize};

use crate::server::Error;
use crate::store::Record;

/// Fields of a resource, as stored and as sent over the wire next to `id`.
pub trait Resource: Clone + Serialize + Send + Sync + 'static {
    /// Singular name used in log lines.
    const KIND: &'static str;

    /// Build the resource from validated body fields.
    fn from_parts(name: String, ingredients: Vec<String>) -> Self;
}

/// A recipe: a name and its ingredient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeFields {
    pub name: String,
    pub ingredients: Vec<String>,
}

impl Resource for RecipeFields {
    const KIND: &'static str = "recipe";

    fn from_parts(name: String, ingredients: Vec<String>) -> Self {
        Self { name, ingredients }
    }
}

/// An entry on the shopping list. Same shape as a recipe, separate collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListFields {
    pub name: String,
    pub ingredients: Vec<String>,
}

impl Resource for ShoppingListFields {
    const KIND: &'static str = "shopping-list item";

    fn from_parts(name: String, ingredients: Vec<String>) -> Self {
        Self { name, ingredients }
    }
}

pub type Recipe = Record<RecipeFields>;
pub type ShoppingListItem = Record<ShoppingListFields>;

/// A POST or PUT body before presence checks.
///
/// Unknown keys are ignored; a present key of the wrong type fails JSON
/// decoding.
#[derive(Debug, Default, Deserialize)]
pub struct RecordBody {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ingredients: Option<Vec<String>>,
}

impl RecordBody {
    /// Check that `name` and `ingredients` are present, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadRequest`] naming the first missing field.
    pub fn into_fields<T: Resource>(self) -> Result<T, Error> {
        let name = self.name.ok_or_else(|| missing("name"))?;
        let ingredients = self.ingredients.ok_or_else(|| missing("ingredients"))?;
        Ok(T::from_parts(name, ingredients))
    }
}

fn missing(field: &str) -> Error {
    Error::BadRequest(format!("Missing `{field}` in request body"))
}
