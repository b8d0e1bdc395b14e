//! Shared test fixtures.

#![cfg(test)]

use crate::cache::LocalCache;
use crate::clock::{Clock, FixedClock};
use crate::config::SyncConfig;
use crate::db::{Database, SharedDatabase};
use crate::store::{DocumentStore, MemoryStore};
use crate::sync::SyncCore;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

/// Create a temporary on-disk database with the schema applied.
///
/// The TempDir must be kept alive for the duration of the test to prevent
/// the database file from being deleted.
pub fn setup_test_db() -> (SharedDatabase, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    (db.into_shared(), dir)
}

pub fn memory_cache() -> LocalCache {
    LocalCache::new(
        Database::open_in_memory()
            .expect("Failed to open in-memory database")
            .into_shared(),
    )
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid test date")
}

pub fn clock_on(s: &str) -> Arc<FixedClock> {
    Arc::new(FixedClock::on(date(s)))
}

/// Config with a short timer debounce so tests do not wait long.
pub fn test_config() -> SyncConfig {
    SyncConfig {
        user_id: "test-user".into(),
        timer_debounce: Duration::from_millis(20),
        ..SyncConfig::default()
    }
}

pub fn start_sync_with(store: &Arc<MemoryStore>, cache: LocalCache, clock: &Arc<FixedClock>) -> SyncCore {
    let shared = Arc::clone(store);
    let store: Arc<dyn DocumentStore> = shared;
    let shared_clock = Arc::clone(clock);
    let clock: Arc<dyn Clock> = shared_clock;
    SyncCore::start(store, cache, test_config(), clock)
}

pub fn start_sync(store: &Arc<MemoryStore>, clock: &Arc<FixedClock>) -> SyncCore {
    start_sync_with(store, memory_cache(), clock)
}
