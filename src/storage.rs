//! A key/value store for persisted records, backed by a SQLite table.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

/// String records keyed by name, similar to a browser's local storage.
///
/// The session record and the document table are each stored as a single JSON
/// value. An optional quota limits the total number of bytes (keys plus
/// values) the store will hold.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    connection: Arc<Mutex<Connection>>,
    quota: Option<usize>,
}

impl LocalStorage {
    /// Create a store over `connection` without a quota.
    ///
    /// The storage table must already exist, see [crate::initialize_db].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            connection,
            quota: None,
        }
    }

    /// Limit the total size of stored keys and values to `quota` bytes.
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Get the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the query fails or [Error::LockPoisoned]
    /// if the connection lock is poisoned.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let connection = self.lock()?;

        connection
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                (key,),
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an [Error::StorageFull] if the write would exceed the quota,
    /// an [Error::SqlError] if the write fails or [Error::LockPoisoned] if the
    /// connection lock is poisoned. The previous value is kept on error.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let connection = self.lock()?;

        if let Some(quota) = self.quota {
            let other_bytes: i64 = connection.query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                 FROM local_storage WHERE key != ?1",
                (key,),
                |row| row.get(0),
            )?;
            let attempted = other_bytes as usize + key.len() + value.len();

            if attempted > quota {
                tracing::warn!(
                    "Rejected write to \"{key}\": {attempted} bytes exceeds quota of {quota} bytes"
                );
                return Err(Error::StorageFull { attempted, quota });
            }
        }

        connection.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;

        Ok(())
    }

    /// Delete the value stored under `key`, does nothing if there is none.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the delete fails or [Error::LockPoisoned]
    /// if the connection lock is poisoned.
    pub fn remove_item(&self, key: &str) -> Result<(), Error> {
        let connection = self.lock()?;
        connection.execute("DELETE FROM local_storage WHERE key = ?1", (key,))?;

        Ok(())
    }

    /// The total number of bytes of all stored keys and values.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the query fails or [Error::LockPoisoned]
    /// if the connection lock is poisoned.
    pub fn used_bytes(&self) -> Result<usize, Error> {
        let connection = self.lock()?;
        let used: i64 = connection.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM local_storage",
            [],
            |row| row.get(0),
        )?;

        Ok(used as usize)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::LockPoisoned)
    }
}

/// Create the local storage table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_storage_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{Error, db::initialize, storage::LocalStorage};

    fn get_test_storage() -> LocalStorage {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        LocalStorage::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn get_missing_item_returns_none() {
        let storage = get_test_storage();

        assert_eq!(storage.get_item("missing"), Ok(None));
    }

    #[test]
    fn set_then_get_returns_value() {
        let storage = get_test_storage();

        storage.set_item("greeting", "hello").unwrap();

        assert_eq!(storage.get_item("greeting"), Ok(Some("hello".to_owned())));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let storage = get_test_storage();

        storage.set_item("greeting", "hello").unwrap();
        storage.set_item("greeting", "kia ora").unwrap();

        assert_eq!(storage.get_item("greeting"), Ok(Some("kia ora".to_owned())));
    }

    #[test]
    fn remove_deletes_value_and_ignores_missing_keys() {
        let storage = get_test_storage();
        storage.set_item("greeting", "hello").unwrap();

        storage.remove_item("greeting").unwrap();
        storage.remove_item("greeting").unwrap();

        assert_eq!(storage.get_item("greeting"), Ok(None));
    }

    #[test]
    fn used_bytes_counts_keys_and_values() {
        let storage = get_test_storage();

        storage.set_item("ab", "cde").unwrap();
        storage.set_item("f", "ünï").unwrap();

        // "ünï" is 5 bytes in UTF-8.
        assert_eq!(storage.used_bytes(), Ok(2 + 3 + 1 + 5));
    }

    #[test]
    fn set_fails_when_quota_exceeded_and_keeps_old_value() {
        let storage = get_test_storage().with_quota(Some(10));
        storage.set_item("key", "value").unwrap();

        let result = storage.set_item("key", "a much longer value");

        assert_eq!(
            result,
            Err(Error::StorageFull {
                attempted: 3 + 19,
                quota: 10
            })
        );
        assert_eq!(storage.get_item("key"), Ok(Some("value".to_owned())));
    }

    #[test]
    fn quota_ignores_the_value_being_replaced() {
        let storage = get_test_storage().with_quota(Some(8));
        storage.set_item("key", "12345").unwrap();

        assert_eq!(storage.set_item("key", "54321"), Ok(()));
    }
}
