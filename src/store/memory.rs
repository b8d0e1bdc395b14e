use super::listeners::ListenerRegistry;
use super::{Collection, Document, DocumentStore, Listener, SubscriptionId};
use crate::error::{AppError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

type Documents = HashMap<Collection, BTreeMap<String, Value>>;

/// In-process document store.
///
/// Stands in for the hosted database in tests and offline sessions. Faults
/// can be injected: [`set_offline`](Self::set_offline) fails every call,
/// [`fail_writes`](Self::fail_writes) fails writes to one collection.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Documents>,
    listeners: ListenerRegistry,
    offline: AtomicBool,
    failing: Mutex<HashSet<Collection>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, collection: Collection, failing: bool) {
        let mut set = crate::safe_lock(&self.failing, "MemoryStore failures");
        if failing {
            set.insert(collection);
        } else {
            set.remove(&collection);
        }
    }

    /// Successful puts and deletes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self, collection: Collection) -> usize {
        crate::safe_lock(&self.documents, "MemoryStore")
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    pub fn subscriber_count(&self, collection: Collection) -> usize {
        self.listeners.count(collection)
    }

    fn check_online(&self, operation: &str, collection: Collection) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::unavailable(format!("{operation} {collection}"), "store is offline"));
        }
        Ok(())
    }

    fn check_writable(&self, operation: &str, collection: Collection) -> Result<()> {
        self.check_online(operation, collection)?;
        if crate::safe_lock(&self.failing, "MemoryStore failures").contains(&collection) {
            return Err(AppError::unavailable(
                format!("{operation} {collection}"),
                "permission denied",
            ));
        }
        Ok(())
    }

    fn snapshot(&self, collection: Collection) -> Result<Vec<Document>> {
        self.check_online("read", collection)?;
        let documents = crate::safe_lock(&self.documents, "MemoryStore");
        Ok(documents
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl DocumentStore for MemoryStore {
    fn put(&self, collection: Collection, id: &str, data: Value) -> Result<()> {
        self.check_writable("put", collection)?;
        crate::safe_lock(&self.documents, "MemoryStore")
            .entry(collection)
            .or_default()
            .insert(id.to_string(), data);
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.listeners.notify(collection, || self.snapshot(collection));
        Ok(())
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        self.check_online("get", collection)?;
        let documents = crate::safe_lock(&self.documents, "MemoryStore");
        Ok(documents
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    fn get_all(&self, collection: Collection) -> Result<Vec<Document>> {
        self.snapshot(collection)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.check_writable("delete", collection)?;
        let removed = crate::safe_lock(&self.documents, "MemoryStore")
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        self.writes.fetch_add(1, Ordering::SeqCst);
        if removed {
            self.listeners.notify(collection, || self.snapshot(collection));
        }
        Ok(())
    }

    fn subscribe(&self, collection: Collection, listener: Listener) -> Result<SubscriptionId> {
        let id = self.listeners.add(collection, std::sync::Arc::clone(&listener));
        listener(self.snapshot(collection));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id);
    }
}
