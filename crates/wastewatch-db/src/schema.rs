//! SQL schema definitions.

/// Table holding report records.
pub const REPORTS_TABLE: &str = "reports";

/// Table holding the registered user record.
pub const USERS_TABLE: &str = "users";

/// Complete schema for the v1 database.
///
/// Every namespace shares the same shape: a text key and the JSON record.
/// `WITHOUT ROWID` keeps rows clustered by key so full scans come back in
/// key order.
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    record TEXT NOT NULL
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    record TEXT NOT NULL
) WITHOUT ROWID;
"#;
