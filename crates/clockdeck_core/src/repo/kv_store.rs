//! String-keyed persistent store.
//!
//! # Responsibility
//! - Provide the `key -> text value` contract the app persists through.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `put` replaces the whole value for a key atomically.
//! - `remove` of a missing key is a no-op.

use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

pub const ALARMS_KEY: &str = "alarms";
pub const CLOCK_SETTINGS_KEY: &str = "clockSettings";

/// Key-value persistence contract.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&self, key: &str) -> RepoResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        (**self).remove(key)
    }
}

/// SQLite-backed key-value store over the `kv_store` table.
///
/// Owns its connection so long-lived services can hold it.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, SqliteKeyValueStore};
    use crate::db::open_db_in_memory;

    #[test]
    fn put_overwrites_and_remove_is_idempotent() {
        let store = SqliteKeyValueStore::new(open_db_in_memory().expect("open db"));
        assert_eq!(store.get("alarms").expect("get"), None);

        store.put("alarms", "[]").expect("first put");
        store.put("alarms", "[1]").expect("second put");
        assert_eq!(store.get("alarms").expect("get").as_deref(), Some("[1]"));

        store.remove("alarms").expect("remove");
        store.remove("alarms").expect("second remove");
        assert_eq!(store.get("alarms").expect("get"), None);
    }
}
