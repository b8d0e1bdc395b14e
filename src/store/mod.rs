//! Document store boundary.
//!
//! The remote store is an opaque set of named collections holding JSON
//! documents keyed by id, with put/get/delete and snapshot subscriptions.
//! [`MemoryStore`] and [`SqliteStore`] implement it; [`Repository`] layers
//! typed, user-scoped records on top.

pub mod listeners;
pub mod memory;
pub mod repository;
pub mod sqlite;

pub use memory::MemoryStore;
pub use repository::Repository;
pub use sqlite::SqliteStore;

use crate::error::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    CompletedTasks,
    TestScores,
    Stats,
    Notes,
    QuestionLogs,
    FocusSessions,
    TimerState,
    CalendarTasks,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::CompletedTasks,
        Collection::TestScores,
        Collection::Stats,
        Collection::Notes,
        Collection::QuestionLogs,
        Collection::FocusSessions,
        Collection::TimerState,
        Collection::CalendarTasks,
    ];

    /// Collection name in the store.
    pub fn name(self) -> &'static str {
        match self {
            Collection::CompletedTasks => "completedTasks",
            Collection::TestScores => "testScores",
            Collection::Stats => "stats",
            Collection::Notes => "notes",
            Collection::QuestionLogs => "questionLogs",
            Collection::FocusSessions => "focusSessions",
            Collection::TimerState => "timerState",
            Collection::CalendarTasks => "calendarTasks",
        }
    }

    pub fn parse(name: &str) -> Option<Collection> {
        Collection::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Snapshot callback. Receives the whole collection after every change,
/// and once immediately on subscribe.
pub type Listener = Arc<dyn Fn(Result<Vec<Document>>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub trait DocumentStore: Send + Sync {
    /// Create or wholesale replace the document `id`.
    fn put(&self, collection: Collection, id: &str, data: Value) -> Result<()>;

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    fn get_all(&self, collection: Collection) -> Result<Vec<Document>>;

    /// Deleting a missing document is not an error.
    fn delete(&self, collection: Collection, id: &str) -> Result<()>;

    /// Register `listener` and deliver the current snapshot to it before
    /// returning. Listeners run on the writer's thread.
    fn subscribe(&self, collection: Collection, listener: Listener) -> Result<SubscriptionId>;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Releases its listener when dropped.
pub struct Subscription {
    store: Arc<dyn DocumentStore>,
    id: SubscriptionId,
    collection: Collection,
}

impl Subscription {
    pub fn new(store: Arc<dyn DocumentStore>, collection: Collection, id: SubscriptionId) -> Self {
        Self { store, id, collection }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        log::debug!("Releasing {} subscription {:?}", self.collection, self.id);
        self.store.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::parse(collection.name()), Some(collection));
        }
        assert_eq!(Collection::parse("nope"), None);
        assert_eq!(Collection::Notes.to_string(), "notes");
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let store = Arc::new(MemoryStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let listener: Listener = Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let id = store.subscribe(Collection::Notes, listener).unwrap();
        let shared = Arc::clone(&store);
        let dyn_store: Arc<dyn DocumentStore> = shared;
        let sub = Subscription::new(dyn_store, Collection::Notes, id);

        store.put(Collection::Notes, "a", serde_json::json!({})).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        drop(sub);
        store.put(Collection::Notes, "b", serde_json::json!({})).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
