//! Sync and migration layer of a study-progress tracker.
//!
//! Entities live in a per-collection [`store::DocumentStore`]. A
//! [`SyncCore`] keeps an in-memory copy of every collection for the UI,
//! writes mutations through to the store, follows changes made by other
//! clients and, on first start, moves legacy locally cached data into the
//! store.

pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod db;
pub mod derived;
pub mod error;
pub mod migration;
pub mod models;
pub mod store;
pub mod sync;
pub mod timer;
pub mod validation;
#[cfg(test)]
mod test_utils;

pub use cache::LocalCache;
pub use clock::{Clock, SystemClock};
pub use config::SyncConfig;
pub use error::{AppError, Result};
pub use store::{DocumentStore, MemoryStore, SqliteStore};
pub use sync::SyncCore;

use crate::db::Database;
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Open the on-disk database and return the local cache and document
/// store backed by it.
pub fn open_local(config: &SyncConfig) -> Result<(LocalCache, Arc<SqliteStore>)> {
    let db_path = config.database_path()?;
    let db = Database::open(&db_path)
        .inspect_err(|e| error!("Failed to open database at {}: {e}", db_path.display()))?
        .into_shared();
    info!("Opened local database at {}", db_path.display());
    Ok((LocalCache::new(Arc::clone(&db)), Arc::new(SqliteStore::new(db))))
}

/// Start syncing against the local database with the system clock.
pub fn start(config: SyncConfig) -> Result<SyncCore> {
    let (cache, store) = open_local(&config)?;
    let store: Arc<dyn DocumentStore> = store;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    Ok(SyncCore::start(store, cache, config, clock))
}
