//! Local snapshot cache: small key/value strings kept on the device.
//!
//! Holds the data written before remote sync existed, plus migration
//! bookkeeping. Values are JSON text.

use crate::db::{with_connection, SharedDatabase};
use crate::error::Result;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone)]
pub struct LocalCache {
    db: SharedDatabase,
}

impl LocalCache {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        with_connection(&self.db, "read local cache", |conn| {
            conn.query_row("SELECT value FROM local_cache WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        with_connection(&self.db, "write local cache", |conn| {
            conn.execute(
                "INSERT INTO local_cache (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
        })?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        with_connection(&self.db, "clear local cache", |conn| {
            conn.execute("DELETE FROM local_cache WHERE key = ?1", params![key])
        })?;
        Ok(())
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// A flag counts as set only when it holds JSON `true`.
    pub fn flag(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some_and(|v| v.trim() == "true"))
    }

    pub fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" })
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, &serde_json::to_string(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use std::collections::BTreeMap;

    #[test]
    fn test_set_get_remove() {
        let (db, _dir) = setup_test_db();
        let cache = LocalCache::new(db);
        assert_eq!(cache.get("k").unwrap(), None);

        cache.set("k", "1").unwrap();
        cache.set("k", "2").unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("2"));
        assert!(cache.contains("k").unwrap());

        cache.remove("k").unwrap();
        assert!(!cache.contains("k").unwrap());
    }

    #[test]
    fn test_flags() {
        let (db, _dir) = setup_test_db();
        let cache = LocalCache::new(db);
        assert!(!cache.flag("done").unwrap());
        cache.set_flag("done", true).unwrap();
        assert!(cache.flag("done").unwrap());
        cache.set("done", "\"yes\"").unwrap();
        assert!(!cache.flag("done").unwrap());
    }

    #[test]
    fn test_json_values() {
        let (db, _dir) = setup_test_db();
        let cache = LocalCache::new(db);
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1);
        cache.set_json("m", &map).unwrap();
        assert_eq!(cache.get_json::<BTreeMap<String, i32>>("m").unwrap(), Some(map));

        cache.set("broken", "{").unwrap();
        assert!(cache.get_json::<BTreeMap<String, i32>>("broken").is_err());
    }
}
