use crate::models::Record;
use std::collections::HashMap;
use std::sync::Mutex;

/// Where a change to in-memory state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A mutation made on this client.
    Local,
    /// A one-shot read of the store (bulk load or post-write reload).
    Reload,
    /// A snapshot pushed by a store subscription.
    Subscription,
}

#[derive(Debug, Clone)]
pub enum Change<T> {
    Replace(Vec<T>),
    Upsert(T),
    Remove(String),
}

struct Inner<T> {
    items: Vec<T>,
    sequence: u64,
    last_origin: Option<Origin>,
}

/// In-memory copy of one collection.
///
/// All changes, local or remote, go through [`apply`](Self::apply) one at a
/// time; whichever is applied last wins. Each applied change bumps the
/// sequence number.
pub struct SyncedCollection<T> {
    name: &'static str,
    order: Option<fn(&mut [T])>,
    inner: Mutex<Inner<T>>,
}

impl<T: Record> SyncedCollection<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            order: None,
            inner: Mutex::new(Inner {
                items: Vec::new(),
                sequence: 0,
                last_origin: None,
            }),
        }
    }

    /// Keep items sorted with `order` after every change.
    #[must_use]
    pub fn ordered_by(mut self, order: fn(&mut [T])) -> Self {
        self.order = Some(order);
        self
    }

    /// Apply one change and return the new sequence number.
    pub fn apply(&self, origin: Origin, change: Change<T>) -> u64 {
        let mut inner = crate::safe_lock(&self.inner, self.name);
        match change {
            Change::Replace(items) => inner.items = dedupe(items),
            Change::Upsert(item) => {
                let id = item.id();
                match inner.items.iter_mut().find(|existing| existing.id() == id) {
                    Some(existing) => *existing = item,
                    None => inner.items.push(item),
                }
            }
            Change::Remove(id) => inner.items.retain(|existing| existing.id() != id),
        }
        if let Some(order) = self.order {
            order(&mut inner.items);
        }
        inner.sequence += 1;
        inner.last_origin = Some(origin);
        log::debug!(
            "{} <- {origin:?} (seq {}, {} items)",
            self.name,
            inner.sequence,
            inner.items.len()
        );
        inner.sequence
    }

    pub fn snapshot(&self) -> Vec<T> {
        crate::safe_lock(&self.inner, self.name).items.clone()
    }

    /// Run `f` over the current items without cloning them.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&crate::safe_lock(&self.inner, self.name).items)
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.with(|items| items.iter().find(|item| item.id() == id).cloned())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.with(|items| items.iter().any(|item| item.id() == id))
    }

    pub fn first(&self) -> Option<T> {
        self.with(|items| items.first().cloned())
    }

    pub fn len(&self) -> usize {
        self.with(<[T]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sequence(&self) -> u64 {
        crate::safe_lock(&self.inner, self.name).sequence
    }

    pub fn last_origin(&self) -> Option<Origin> {
        crate::safe_lock(&self.inner, self.name).last_origin
    }
}

/// Keep the last occurrence of every id, in first-seen order.
fn dedupe<T: Record>(items: Vec<T>) -> Vec<T> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let id = item.id();
        match slots.get(&id).and_then(|&slot| unique.get_mut(slot)) {
            Some(existing) => *existing = item,
            None => {
                slots.insert(id, unique.len());
                unique.push(item);
            }
        }
    }
    unique
}
