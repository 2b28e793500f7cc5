//! Database migration system.
//!
//! Schema version stored in `PRAGMA user_version`. Migrations are forward-only.

use rusqlite::Connection;

use crate::{schema, DbError, Result, SCHEMA_VERSION};

/// Create the schema on a fresh database; reject a newer one.
pub fn run(conn: &Connection) -> Result<()> {
    let current_version: u32 =
        conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    match current_version {
        0 => {
            tracing::info!("Initializing database schema v{SCHEMA_VERSION}");
            conn.execute_batch(schema::SCHEMA_V1)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        v if v > SCHEMA_VERSION => {
            return Err(DbError::Migration(format!(
                "Database version {v} is newer than supported {SCHEMA_VERSION}"
            )));
        }
        _ => {}
    }

    Ok(())
}
