//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    config::LedgerConfig,
    db::initialize,
    document::{DEFAULT_DOCUMENT_NAME, DocumentRepository},
    session::{Debouncer, SessionController, SessionState},
    storage::LocalStorage,
    timezone::get_local_offset,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The open document.
    pub session: Arc<Mutex<SessionController>>,

    /// The saved documents.
    pub repository: DocumentRepository,

    /// Delays renames sent while the document name is being typed.
    pub rename_debouncer: Arc<Debouncer>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] backed by a SQLite database connection.
    ///
    /// This function will initialize the database by adding the storage
    /// table, then restore the session that was open when the server last
    /// stopped. If there was none, a new document with the default name is
    /// opened.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized, the session
    /// cannot be restored, or `config.local_timezone` is not a valid,
    /// canonical timezone name.
    pub fn new(db_connection: Connection, config: LedgerConfig) -> Result<Self, Error> {
        if get_local_offset(&config.local_timezone).is_none() {
            return Err(Error::InvalidTimezone(config.local_timezone));
        }

        initialize(&db_connection)?;

        let storage = LocalStorage::new(Arc::new(Mutex::new(db_connection)))
            .with_quota(config.storage_quota);
        tracing::info!("Local storage holds {} bytes", storage.used_bytes()?);
        let repository = DocumentRepository::new(storage.clone());
        let mut session = SessionController::restore(repository.clone(), storage)?;

        if session.state() == SessionState::Unloaded {
            session.open_new(DEFAULT_DOCUMENT_NAME)?;
        }

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            repository,
            rename_debouncer: Arc::new(Debouncer::new(config.rename_debounce)),
            local_timezone: config.local_timezone,
        })
    }
}
