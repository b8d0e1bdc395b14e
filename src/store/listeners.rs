use super::{Collection, Document, Listener, SubscriptionId};
use crate::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Subscriber bookkeeping shared by the store implementations.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Collection, Listener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, collection: Collection, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        crate::safe_lock(&self.entries, "ListenerRegistry").push((id, collection, listener));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = crate::safe_lock(&self.entries, "ListenerRegistry");
        let before = entries.len();
        entries.retain(|(entry_id, _, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn count(&self, collection: Collection) -> usize {
        crate::safe_lock(&self.entries, "ListenerRegistry")
            .iter()
            .filter(|(_, c, _)| *c == collection)
            .count()
    }

    fn listeners_for(&self, collection: Collection) -> Vec<Listener> {
        crate::safe_lock(&self.entries, "ListenerRegistry")
            .iter()
            .filter(|(_, c, _)| *c == collection)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect()
    }

    /// Deliver a fresh snapshot to every listener of `collection`.
    ///
    /// `snapshot` is evaluated once per listener so each receives its own
    /// result. No registry lock is held while listeners run.
    pub fn notify<F>(&self, collection: Collection, snapshot: F)
    where
        F: Fn() -> Result<Vec<Document>>,
    {
        let listeners = self.listeners_for(collection);
        if listeners.is_empty() {
            return;
        }
        log::debug!("Notifying {} {collection} listener(s)", listeners.len());
        for listener in listeners {
            listener(snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_listener(counter: &Arc<AtomicUsize>) -> Listener {
        let counter = Arc::clone(counter);
        Arc::new(move |result: Result<Vec<Document>>| {
            if result.is_ok() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[test]
    fn test_notify_reaches_only_matching_collection() {
        let registry = ListenerRegistry::new();
        let notes = Arc::new(AtomicUsize::new(0));
        let scores = Arc::new(AtomicUsize::new(0));
        registry.add(Collection::Notes, counting_listener(&notes));
        registry.add(Collection::TestScores, counting_listener(&scores));

        registry.notify(Collection::Notes, || Ok(Vec::new()));

        assert_eq!(notes.load(Ordering::SeqCst), 1);
        assert_eq!(scores.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let id = registry.add(Collection::Notes, counting_listener(&counter));
        assert_eq!(registry.count(Collection::Notes), 1);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        registry.notify(Collection::Notes, || Ok(Vec::new()));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_unsubscribe_itself() {
        let registry = Arc::new(ListenerRegistry::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
        let reg = Arc::clone(&registry);
        let own = Arc::clone(&slot);
        let id = registry.add(
            Collection::Notes,
            Arc::new(move |_| {
                if let Some(id) = *own.lock().unwrap() {
                    reg.remove(id);
                }
            }),
        );
        *slot.lock().unwrap() = Some(id);

        registry.notify(Collection::Notes, || Ok(Vec::new()));
        assert_eq!(registry.count(Collection::Notes), 0);
    }
}
