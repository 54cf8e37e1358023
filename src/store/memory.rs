//! Insertion-ordered record store.

use indexmap::IndexMap;
use log::debug;
use parking_lot::RwLock;
use serde::Serialize;

use crate::store::error::Error;
use crate::store::id::IdGenerator;

/// A stored entity: the store-assigned id plus the resource fields.
///
/// Serializes flat, e.g. `{"id": "1", "name": "...", "ingredients": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record<T> {
    /// Assigned on insert, never changed afterwards.
    pub id: String,
    /// Resource-specific fields.
    #[serde(flatten)]
    pub fields: T,
}

/// One collection of records.
///
/// Every operation takes the lock once, so each is atomic with respect to
/// concurrent callers.
pub struct Store<T> {
    records: RwLock<IndexMap<String, T>>,
    ids: Box<dyn IdGenerator>,
}

impl<T: Clone> Store<T> {
    /// Create an empty store using `ids` to assign identifiers.
    pub fn new(ids: impl IdGenerator + 'static) -> Self {
        Self::with_generator(Box::new(ids))
    }

    /// Create an empty store from an already boxed generator.
    pub fn with_generator(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            records: RwLock::new(IndexMap::new()),
            ids,
        }
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<Record<T>> {
        self.records
            .read()
            .iter()
            .map(|(id, fields)| Record {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect()
    }

    /// Look up a single record.
    pub fn get(&self, id: &str) -> Option<Record<T>> {
        self.records.read().get(id).map(|fields| Record {
            id: id.to_string(),
            fields: fields.clone(),
        })
    }

    /// Store `fields` under a freshly generated id and return the new record.
    pub fn insert(&self, fields: T) -> Record<T> {
        let mut records = self.records.write();

        let mut id = self.ids.next_id();
        while records.contains_key(&id) {
            id = self.ids.next_id();
        }

        records.insert(id.clone(), fields.clone());
        debug!("Inserted record {id} ({len} total)", len = records.len());

        Record { id, fields }
    }

    /// Replace the fields of an existing record, keeping its id and position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has `id`.
    pub fn update(&self, id: &str, fields: T) -> Result<Record<T>, Error> {
        let mut records = self.records.write();
        let slot = records
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        *slot = fields.clone();
        debug!("Updated record {id}");

        Ok(Record {
            id: id.to_string(),
            fields,
        })
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has `id`.
    pub fn remove(&self, id: &str) -> Result<(), Error> {
        let mut records = self.records.write();
        records
            .shift_remove(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        debug!("Removed record {id} ({len} left)", len = records.len());
        Ok(())
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
