use super::listeners::ListenerRegistry;
use super::{Collection, Document, DocumentStore, Listener, SubscriptionId};
use crate::db::{with_connection, SharedDatabase};
use crate::error::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::sync::Arc;

/// Document store persisted in the local SQLite database.
///
/// Listeners only see writes made through this instance.
pub struct SqliteStore {
    db: SharedDatabase,
    listeners: ListenerRegistry,
}

fn decode_row(collection: Collection, id: String, raw: &str) -> Option<Document> {
    match serde_json::from_str(raw) {
        Ok(data) => Some(Document { id, data }),
        Err(e) => {
            log::warn!("Skipping unreadable {collection} document '{id}': {e}");
            None
        }
    }
}

fn load_all(conn: &Connection, collection: Collection) -> rusqlite::Result<Vec<(String, String)>> {
    let mut stmt =
        conn.prepare("SELECT id, data FROM documents WHERE collection = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![collection.name()], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

impl SqliteStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self {
            db,
            listeners: ListenerRegistry::new(),
        }
    }

    fn snapshot(&self, collection: Collection) -> Result<Vec<Document>> {
        let rows = with_connection(&self.db, &format!("load {collection}"), |conn| {
            load_all(conn, collection)
        })?;
        Ok(rows
            .into_iter()
            .filter_map(|(id, raw)| decode_row(collection, id, &raw))
            .collect())
    }
}

impl DocumentStore for SqliteStore {
    fn put(&self, collection: Collection, id: &str, data: Value) -> Result<()> {
        let raw = serde_json::to_string(&data)?;
        with_connection(&self.db, &format!("save {collection}"), |conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, data, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                params![collection.name(), id, raw, Utc::now().timestamp_millis()],
            )
        })?;
        self.listeners.notify(collection, || self.snapshot(collection));
        Ok(())
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let raw: Option<String> = with_connection(&self.db, &format!("get {collection}"), |conn| {
            conn.query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.name(), id],
                |row| row.get(0),
            )
            .optional()
        })?;
        Ok(raw.and_then(|raw| decode_row(collection, id.to_string(), &raw)))
    }

    fn get_all(&self, collection: Collection) -> Result<Vec<Document>> {
        self.snapshot(collection)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let removed = with_connection(&self.db, &format!("delete {collection}"), |conn| {
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.name(), id],
            )
        })?;
        if removed > 0 {
            self.listeners.notify(collection, || self.snapshot(collection));
        }
        Ok(())
    }

    fn subscribe(&self, collection: Collection, listener: Listener) -> Result<SubscriptionId> {
        let id = self.listeners.add(collection, Arc::clone(&listener));
        listener(self.snapshot(collection));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id);
    }
}
