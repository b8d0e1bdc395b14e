use crate::db::Database;
use crate::error::{is_busy, AppError, Result};
use rusqlite::Connection;
use std::sync::Mutex;

/// Execute a database operation with lock handling and error mapping.
///
/// A busy or locked database is reported as `StoreUnavailable`, anything
/// else as a plain database error. Both are logged with `operation`.
///
/// # Example
/// ```ignore
/// with_connection(&db, "load notes", |conn| {
///     conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
/// })
/// ```
pub fn with_connection<F, T>(db: &Mutex<Database>, operation: &str, f: F) -> Result<T>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    let db = crate::safe_lock(db, "Database");

    f(db.connection()).map_err(|e| {
        log::error!("Failed to {operation}: {e}");
        if is_busy(&e) {
            AppError::unavailable(operation, e)
        } else {
            AppError::Database(e)
        }
    })
}
