//! Ordered key-value repository over a single table.
//!
//! Both namespaces (`reports`, `users`) share this contract: upsert, point
//! lookup, removal, full scan in key order and an emptiness check. Records
//! are stored as JSON text.

use std::marker::PhantomData;

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wastewatch_types::{Report, User, MAX_KEY_BYTES};

use crate::schema::{REPORTS_TABLE, USERS_TABLE};
use crate::{DbError, Result};

/// Typed handle onto one key-value table.
pub struct Repository<T> {
    table: &'static str,
    max_record_bytes: usize,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Repository<T> {}

impl Repository<Report> {
    pub fn reports(max_record_bytes: usize) -> Self {
        Self::new(REPORTS_TABLE, max_record_bytes)
    }
}

impl Repository<User> {
    pub fn users(max_record_bytes: usize) -> Self {
        Self::new(USERS_TABLE, max_record_bytes)
    }
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    /// `table` must be one of the tables created by the schema.
    pub fn new(table: &'static str, max_record_bytes: usize) -> Self {
        Self {
            table,
            max_record_bytes,
            _record: PhantomData,
        }
    }

    /// Insert or overwrite the record stored under `id`.
    pub fn insert(&self, conn: &Connection, id: &str, record: &T) -> Result<()> {
        if id.len() > MAX_KEY_BYTES {
            return Err(DbError::Constraint(format!(
                "{} key is {} bytes, limit is {MAX_KEY_BYTES}",
                self.table,
                id.len()
            )));
        }

        let encoded = serde_json::to_string(record)?;
        if encoded.len() > self.max_record_bytes {
            return Err(DbError::Constraint(format!(
                "{} record {id} is {} bytes, limit is {}",
                self.table,
                encoded.len(),
                self.max_record_bytes
            )));
        }

        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (id, record) VALUES (?1, ?2)",
                self.table
            ),
            rusqlite::params![id, encoded],
        )?;
        Ok(())
    }

    /// Point lookup. A missing key is `Ok(None)`.
    pub fn get(&self, conn: &Connection, id: &str) -> Result<Option<T>> {
        let encoded: Option<String> = conn
            .query_row(
                &format!("SELECT record FROM {} WHERE id = ?1", self.table),
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match encoded {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Delete the record under `id`. Returns whether one existed.
    pub fn remove(&self, conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.table),
            [id],
        )?;
        Ok(changed > 0)
    }

    /// Every record, in key order.
    pub fn list_all(&self, conn: &Connection) -> Result<Vec<T>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT record FROM {} ORDER BY id",
            self.table
        ))?;

        let encoded = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        encoded
            .iter()
            .map(|text| serde_json::from_str(text).map_err(DbError::from))
            .collect()
    }

    pub fn is_empty(&self, conn: &Connection) -> Result<bool> {
        let exists: bool = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {})", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(!exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wastewatch_types::{Identity, ReportId, ReportStatus, UserId};

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    fn report(id: &str) -> Report {
        Report {
            id: ReportId::new(id),
            location: "riverbank".into(),
            latitude: 1.5,
            longitude: 2.5,
            type_of_waste: "glass".into(),
            description: "broken bottles".into(),
            status: ReportStatus::Pending,
            reporter_id: "rep-1".into(),
            created_at: 10,
            updated_at: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let conn = test_db();
        let repo = Repository::reports(1024);

        repo.insert(&conn, "a", &report("a")).expect("insert");
        let fetched = repo.get(&conn, "a").expect("get");
        assert_eq!(fetched, Some(report("a")));
        assert_eq!(repo.get(&conn, "missing").expect("get"), None);
    }

    #[test]
    fn test_insert_overwrites() {
        let conn = test_db();
        let repo = Repository::reports(1024);

        repo.insert(&conn, "a", &report("a")).expect("insert");
        let mut changed = report("a");
        changed.status = ReportStatus::Resolved;
        repo.insert(&conn, "a", &changed).expect("upsert");

        let all = repo.list_all(&conn).expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, ReportStatus::Resolved);
    }

    #[test]
    fn test_remove_reports_presence() {
        let conn = test_db();
        let repo = Repository::reports(1024);
        repo.insert(&conn, "a", &report("a")).expect("insert");

        assert!(repo.remove(&conn, "a").expect("remove"));
        assert!(!repo.remove(&conn, "a").expect("remove again"));
        assert!(repo.is_empty(&conn).expect("is_empty"));
    }

    #[test]
    fn test_list_all_in_key_order() {
        let conn = test_db();
        let repo = Repository::reports(1024);
        for id in ["c", "a", "b"] {
            repo.insert(&conn, id, &report(id)).expect("insert");
        }

        let ids: Vec<String> = repo
            .list_all(&conn)
            .expect("list")
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let conn = test_db();
        let reports = Repository::reports(1024);
        let users = Repository::users(1024);

        reports.insert(&conn, "x", &report("x")).expect("insert");
        assert!(!reports.is_empty(&conn).expect("reports"));
        assert!(users.is_empty(&conn).expect("users"));

        let user = User {
            id: UserId::new("x"),
            username: "bob".into(),
            email: "bob@example.org".into(),
            identity: Identity::new("uid:7"),
            created_at: 1,
            updated_at: None,
        };
        users.insert(&conn, "x", &user).expect("insert user");
        assert_eq!(users.get(&conn, "x").expect("get"), Some(user));
        assert_eq!(reports.get(&conn, "x").expect("get"), Some(report("x")));
    }

    #[test]
    fn test_oversized_record_rejected() {
        let conn = test_db();
        let repo = Repository::reports(64);

        let result = repo.insert(&conn, "a", &report("a"));
        assert!(matches!(result, Err(DbError::Constraint(_))));
        assert!(repo.is_empty(&conn).expect("is_empty"));
    }

    #[test]
    fn test_oversized_key_rejected() {
        let conn = test_db();
        let repo = Repository::reports(1024);
        let key = "k".repeat(MAX_KEY_BYTES + 1);

        let result = repo.insert(&conn, &key, &report("a"));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }
}
