use super::{Collection, Document, DocumentStore, Listener, Subscription};
use crate::constants::USER_FIELD;
use crate::error::{AppError, Result};
use crate::models::Record;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed, user-scoped view of one collection.
///
/// Every document written carries the user tag; reads drop documents
/// tagged for anyone else. Documents that no longer decode are skipped
/// with a warning.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            user_id: self.user_id.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            _record: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        T::COLLECTION
    }

    /// `{user}_{record}`. The user part is escaped so its first `_` is
    /// always the separator.
    fn key(&self, record_id: &str) -> String {
        let user = self.user_id.replace('%', "%25").replace('_', "%5F");
        format!("{user}_{record_id}")
    }

    fn encode(&self, record: &T) -> Result<Value> {
        let mut value = serde_json::to_value(record)?;
        match value.as_object_mut() {
            Some(map) => {
                map.insert(USER_FIELD.to_string(), Value::String(self.user_id.clone()));
                Ok(value)
            }
            None => Err(AppError::ValidationSkipped {
                field: T::ENTITY,
                reason: "does not serialize to a document".into(),
            }),
        }
    }

    /// Upsert by record id.
    pub fn save(&self, record: &T) -> Result<()> {
        let data = self.encode(record)?;
        self.store.put(T::COLLECTION, &self.key(&record.id()), data)
    }

    pub fn get(&self, record_id: &str) -> Result<Option<T>> {
        let doc = self.store.get(T::COLLECTION, &self.key(record_id))?;
        Ok(doc.and_then(|doc| decode_scoped(&self.user_id, doc)))
    }

    pub fn get_all(&self) -> Result<Vec<T>> {
        let docs = self.store.get_all(T::COLLECTION)?;
        Ok(decode_all(&self.user_id, docs))
    }

    pub fn delete(&self, record_id: &str) -> Result<()> {
        self.store.delete(T::COLLECTION, &self.key(record_id))
    }

    /// Deliver the scoped record set to `callback` now and after every
    /// change, until the returned handle is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn(Result<Vec<T>>) + Send + Sync + 'static,
    {
        let user_id = self.user_id.clone();
        let listener: Listener = Arc::new(move |docs: Result<Vec<Document>>| {
            callback(docs.map(|docs| decode_all(&user_id, docs)));
        });
        let id = self.store.subscribe(T::COLLECTION, listener)?;
        Ok(Subscription::new(Arc::clone(&self.store), T::COLLECTION, id))
    }
}

fn decode_all<T: Record>(user_id: &str, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| decode_scoped(user_id, doc))
        .collect()
}

fn decode_scoped<T: Record>(user_id: &str, doc: Document) -> Option<T> {
    let Document { id, data: mut value } = doc;
    let map = value.as_object_mut()?;
    if map.get(USER_FIELD).and_then(Value::as_str) != Some(user_id) {
        return None;
    }
    map.remove(USER_FIELD);
    let decoded = serde_json::from_value::<T>(value)
        .map_err(AppError::from)
        .and_then(T::normalized);
    match decoded {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("Skipping malformed {} document '{id}': {e}", T::COLLECTION);
            None
        }
    }
}
