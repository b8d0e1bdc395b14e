use super::schema::{SCHEMA, SCHEMA_VERSION};
use rusqlite::{Connection, Result};

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    stamp_version(conn)?;
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

fn stamp_version(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;
    if current < SCHEMA_VERSION {
        log::info!("Database schema upgraded from v{current} to v{SCHEMA_VERSION}");
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}
