//! # wastewatch-db
//!
//! Persistence layer for the WasteWatch daemon.
//! Manages the single SQLite database at `$WASTEWATCH_DATA_DIR/wastewatch.db`.
//!
//! ## Layout
//!
//! Two independent ordered key-value namespaces, `reports` and `users`.
//! Each row holds one JSON-serialized record under its identifier.
//! - WAL mode
//! - Keys bounded at [`wastewatch_types::MAX_KEY_BYTES`], values at a
//!   per-repository limit
//! - Schema version stored in `PRAGMA user_version`

pub mod migrations;
pub mod repository;
pub mod schema;

use rusqlite::Connection;
use std::path::Path;

pub use repository::Repository;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open or create the WasteWatch database at the given path.
///
/// Configures WAL mode and runs any pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Configure SQLite pragmas.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}
