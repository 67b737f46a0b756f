//! Credential store for signform.
//!
//! This module owns the SQLite connection that backs the sign-in form. A store
//! is opened once per process under a connection name, ensures the
//! `user_credentials` table exists, seeds one sample record and then serves
//! two operations: inserting a credential and looking one up by name.
//!
//! All statements bind their arguments; no query text is ever built from user
//! input.

use log::{debug, info, warn};
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

/// Name of the record created every time a store is initialized.
pub const SEED_NAME: &str = "testUser";
/// Password of the seeded record.
pub const SEED_PASSWORD: &str = "testPassword";

/// Names of the stores currently open in this process.
static OPEN_STORES: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Errors reported by [`CredentialStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A store with the same connection name is already open in this process.
    #[error("connection `{0}` already exists")]
    ConnectionExists(String),
    /// The database file could not be opened or created.
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),
    /// The schema statement failed.
    #[error("failed to create credential table: {0}")]
    Schema(#[source] rusqlite::Error),
    /// A unique or not-null constraint rejected the write.
    #[error("credential `{name}` violates a table constraint")]
    ConstraintViolation {
        name: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Any other statement failure.
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
    /// Closing the connection failed.
    #[error("failed to close database: {0}")]
    Close(#[source] rusqlite::Error),
}

/// Holds a connection name in the process registry until dropped.
#[derive(Debug)]
struct Registration(String);

impl Registration {
    /// Runs `open` while holding the registry lock and records `name` only if
    /// it succeeds.
    fn acquire<T>(
        name: &str,
        open: impl FnOnce() -> Result<T, StoreError>,
    ) -> Result<(T, Self), StoreError> {
        let mut open_stores = OPEN_STORES.lock().unwrap_or_else(|e| e.into_inner());
        if open_stores.iter().any(|n| n == name) {
            warn!("connection exists: {name}");
            return Err(StoreError::ConnectionExists(name.to_string()));
        }
        let value = open()?;
        open_stores.push(name.to_string());
        Ok((value, Self(name.to_string())))
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut open_stores = OPEN_STORES.lock().unwrap_or_else(|e| e.into_inner());
        open_stores.retain(|n| n != &self.0);
    }
}

/// An open credential store.
///
/// The connection lives as long as the store; dropping the store closes it and
/// releases the connection name so it can be opened again.
#[derive(Debug)]
pub struct CredentialStore {
    conn: Connection,
    registration: Registration,
}

impl CredentialStore {
    /// Opens (creating if absent) the database at `path` under
    /// `connection_name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConnectionExists`] if a store with the same name is
    /// already open, [`StoreError::Open`] if the file cannot be opened and
    /// [`StoreError::Schema`] if the table cannot be created. A failure to seed
    /// the sample record is only logged.
    pub fn open(connection_name: &str, path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        Self::init(connection_name, || {
            info!("opening credential store {} at {}", connection_name, path.display());
            Connection::open(path).map_err(StoreError::Open)
        })
    }

    /// Opens a private in-memory store under `connection_name`.
    pub fn open_in_memory(connection_name: &str) -> Result<Self, StoreError> {
        Self::init(connection_name, || {
            info!("opening in-memory credential store {connection_name}");
            Connection::open_in_memory().map_err(StoreError::Open)
        })
    }

    fn init(
        connection_name: &str,
        connect: impl FnOnce() -> Result<Connection, StoreError>,
    ) -> Result<Self, StoreError> {
        let (conn, registration) = Registration::acquire(connection_name, || {
            let conn = connect()?;
            conn.execute_batch(include_str!("schema.sql"))
                .map_err(StoreError::Schema)?;
            Ok(conn)
        })?;

        let store = Self { conn, registration };
        if let Err(e) = store.insert(SEED_NAME, SEED_PASSWORD) {
            warn!("sample credential not inserted: {e}");
        }
        Ok(store)
    }

    /// The connection name this store was opened under.
    pub fn connection_name(&self) -> &str {
        &self.registration.0
    }

    /// Inserts a new credential.
    ///
    /// Empty values are not rejected here; callers validate input.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConstraintViolation`] if the name (or password)
    /// is already stored, leaving the existing row untouched.
    pub fn insert(&self, name: &str, password: &str) -> Result<(), StoreError> {
        let result = self.conn.execute(
            "INSERT INTO user_credentials (name, password) VALUES (?1, ?2)",
            params![name, password],
        );
        debug!("insert user {name}: {}", result.is_ok());

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                Err(StoreError::ConstraintViolation {
                    name: name.to_string(),
                    source: e,
                })
            }
            Err(e) => Err(StoreError::Query(e)),
        }
    }

    /// Looks up the password stored for `name`.
    ///
    /// Every matching row is scanned and the last one wins. Returns `None` when
    /// nothing matched or the stored password is empty.
    pub fn find_by_name(&self, name: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, password FROM user_credentials WHERE name = ?1")?;
        let mut rows = stmt.query(params![name])?;

        let mut password = String::new();
        while let Some(row) = rows.next()? {
            let found: String = row.get(0)?;
            password = row.get(1)?;
            debug!("find user {name}: matched {found}");
        }

        Ok((!password.is_empty()).then_some(password))
    }

    /// Number of stored credentials.
    pub fn count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM user_credentials", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Closes the connection and releases the connection name.
    pub fn close(self) -> Result<(), StoreError> {
        let Self { conn, registration } = self;
        info!("closing credential store {}", registration.0);
        conn.close().map_err(|(_, e)| StoreError::Close(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_db(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "signform-{}-{}.db",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn open_seeds_sample_credential() {
        let store = CredentialStore::open_in_memory("db-seed").unwrap();
        assert_eq!(
            store.find_by_name(SEED_NAME).unwrap().as_deref(),
            Some(SEED_PASSWORD)
        );
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn second_open_with_same_name_fails_without_touching_data() {
        let path = temp_db("twice");
        let store = CredentialStore::open("db-twice", &path).unwrap();
        store.insert("alice", "wonderland").unwrap();

        let err = CredentialStore::open("db-twice", &path).unwrap_err();
        assert!(matches!(err, StoreError::ConnectionExists(ref n) if n == "db-twice"));

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(
            store.find_by_name("alice").unwrap().as_deref(),
            Some("wonderland")
        );

        store.close().unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn name_is_released_after_drop() {
        let store = CredentialStore::open_in_memory("db-release").unwrap();
        assert_eq!(store.connection_name(), "db-release");
        drop(store);
        assert!(CredentialStore::open_in_memory("db-release").is_ok());
    }

    #[test]
    fn reopening_a_file_keeps_rows_and_tolerates_existing_seed() {
        let path = temp_db("reopen");
        let store = CredentialStore::open("db-reopen", &path).unwrap();
        store.insert("bob", "builder").unwrap();
        store.close().unwrap();

        let store = CredentialStore::open("db-reopen", &path).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.find_by_name("bob").unwrap().as_deref(), Some("builder"));
        drop(store);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unopenable_path_fails_and_frees_name() {
        let path = std::env::temp_dir()
            .join(format!("signform-missing-{}", std::process::id()))
            .join("nested")
            .join("store.db");

        let err = CredentialStore::open("db-unopenable", &path).unwrap_err();
        assert!(matches!(err, StoreError::Open(_)));
        assert!(CredentialStore::open_in_memory("db-unopenable").is_ok());
    }

    #[test]
    fn non_database_file_fails_schema_and_frees_name() {
        let path = temp_db("not-a-db");
        std::fs::write(&path, "this is plain text, not an sqlite database\n".repeat(64)).unwrap();

        let err = CredentialStore::open("db-not-a-db", &path).unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));
        assert!(CredentialStore::open_in_memory("db-not-a-db").is_ok());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn insert_then_find_returns_password() {
        let store = CredentialStore::open_in_memory("db-insert").unwrap();
        store.insert("carol", "s3cret").unwrap();
        assert_eq!(store.find_by_name("carol").unwrap().as_deref(), Some("s3cret"));
    }

    #[test]
    fn unknown_name_is_not_found() {
        let store = CredentialStore::open_in_memory("db-unknown").unwrap();
        assert_eq!(store.find_by_name("nobody").unwrap(), None);
    }

    #[test]
    fn duplicate_name_is_rejected_and_password_kept() {
        let store = CredentialStore::open_in_memory("db-dup").unwrap();
        let err = store.insert(SEED_NAME, "another").unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation { ref name, .. } if name == SEED_NAME));
        assert_eq!(
            store.find_by_name(SEED_NAME).unwrap().as_deref(),
            Some(SEED_PASSWORD)
        );
    }

    #[test]
    fn shared_password_is_rejected() {
        let store = CredentialStore::open_in_memory("db-shared-pw").unwrap();
        let err = store.insert("dave", SEED_PASSWORD).unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation { .. }));
        assert_eq!(store.find_by_name("dave").unwrap(), None);
    }

    #[test]
    fn quotes_in_input_are_stored_verbatim() {
        let store = CredentialStore::open_in_memory("db-quotes").unwrap();
        store.insert("o'brien", "pa'ss; DROP TABLE x").unwrap();
        assert_eq!(
            store.find_by_name("o'brien").unwrap().as_deref(),
            Some("pa'ss; DROP TABLE x")
        );
        assert_eq!(store.find_by_name("' OR '1'='1").unwrap(), None);
    }

    #[test]
    fn empty_stored_password_reads_as_not_found() {
        let store = CredentialStore::open_in_memory("db-empty-pw").unwrap();
        store.insert("erin", "").unwrap();
        assert_eq!(store.find_by_name("erin").unwrap(), None);
    }
}
