//! SQLite-backed fallback store.

use std::path::Path;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::{check_quota, LocalStore};
use crate::types::PersistError;

pub struct SqliteStore {
    conn: Connection,
    quota: usize,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path, quota: usize) -> Result<Self, PersistError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(sql_error)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(sql_error)?;
        Self::init(conn, quota)
    }

    pub fn open_in_memory(quota: usize) -> Result<Self, PersistError> {
        let conn = Connection::open_in_memory().map_err(sql_error)?;
        Self::init(conn, quota)
    }

    fn init(conn: Connection, quota: usize) -> Result<Self, PersistError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )
        .map_err(sql_error)?;
        Ok(Self { conn, quota })
    }
}

impl LocalStore for SqliteStore {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), PersistError> {
        let tx = self.conn.transaction().map_err(sql_error)?;
        let others: i64 = tx
            .query_row(
                "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(value)), 0)
                 FROM kv WHERE key != ?1",
                params![key],
                |row| row.get(0),
            )
            .map_err(sql_error)?;
        check_quota(self.quota, others.max(0) as usize, key, value)?;
        tx.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(sql_error)?;
        tx.commit().map_err(sql_error)
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(sql_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map(|_| ())
            .map_err(sql_error)
    }

    fn usage(&mut self) -> Result<usize, PersistError> {
        let used: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(value)), 0) FROM kv",
                [],
                |row| row.get(0),
            )
            .map_err(sql_error)?;
        Ok(used.max(0) as usize)
    }

    fn quota(&self) -> usize {
        self.quota
    }
}

fn sql_error(e: rusqlite::Error) -> PersistError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DiskFull) => PersistError::CapacityExceeded {
            needed: 0,
            available: 0,
        },
        _ => PersistError::Transient(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove_in_memory() {
        let mut store = SqliteStore::open_in_memory(1024).unwrap();
        store.put("pending", b"{\"a\":1}").unwrap();
        assert_eq!(
            store.get("pending").unwrap().as_deref(),
            Some(&b"{\"a\":1}"[..])
        );
        assert_eq!(store.usage().unwrap(), "pending".len() + 7);
        store.remove("pending").unwrap();
        assert_eq!(store.get("pending").unwrap(), None);
    }

    #[test]
    fn quota_is_enforced_and_store_unchanged() {
        let mut store = SqliteStore::open_in_memory(16).unwrap();
        store.put("k", b"12345").unwrap();
        let err = store.put("k2", b"0123456789abcdef").unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(store.get("k2").unwrap(), None);
        // replacing an existing key only counts the new value
        store.put("k", b"123456789012345").unwrap();
    }

    #[test]
    fn contents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.sqlite");
        {
            let mut store = SqliteStore::open(&path, 1024).unwrap();
            store.put("pending", b"draft").unwrap();
        }
        let mut store = SqliteStore::open(&path, 1024).unwrap();
        assert_eq!(store.get("pending").unwrap().as_deref(), Some(&b"draft"[..]));
    }
}
