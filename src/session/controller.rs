//! The open document and the operations that change it.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    document::{DEFAULT_DOCUMENT_NAME, DocumentRepository, DocumentSummary, document_name},
    storage::LocalStorage,
    transaction::{
        Category, Transaction, TransactionBuilder, TransactionId, TransactionStore,
        TransactionType,
    },
};

/// The storage key of the active session record.
pub const SESSION_KEY: &str = "financeData";

/// Whether a document is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No document has been opened yet.
    Unloaded,
    /// A document is open and its transactions are in the store.
    Open,
}

/// A description of the session for clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Whether a document is open.
    pub state: SessionState,
    /// The name the open document is saved under.
    pub current_file: Option<String>,
    /// The number of transactions in the open document.
    pub transaction_count: usize,
}

/// The active session as written to storage after every change, so that the
/// open document survives a restart.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveSessionRecord {
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    current_file: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    last_updated: Option<OffsetDateTime>,
}

/// Binds one open document to a [TransactionStore].
///
/// Every successful change to the transactions is followed by a save of the
/// whole document to the [DocumentRepository]. If that save fails the error
/// is returned, but the change stays in memory; callers should retry
/// [SessionController::save].
#[derive(Debug)]
pub struct SessionController {
    store: TransactionStore,
    current_file: Option<String>,
    repository: DocumentRepository,
    storage: LocalStorage,
}

impl SessionController {
    /// Create a session with no open document.
    ///
    /// `storage` holds the active session record, which is usually the same
    /// storage the `repository` uses.
    pub fn new(repository: DocumentRepository, storage: LocalStorage) -> Self {
        Self {
            store: TransactionStore::new(),
            current_file: None,
            repository,
            storage,
        }
    }

    /// Rebuild the session from the active session record in `storage`.
    ///
    /// If there is no record the session is [SessionState::Unloaded]. A record
    /// that cannot be parsed, or whose transaction IDs leave no room for new
    /// ones, is logged and replaced by an empty session open on
    /// [DEFAULT_DOCUMENT_NAME].
    ///
    /// # Errors
    /// Returns a persistence error if the record cannot be read.
    pub fn restore(repository: DocumentRepository, storage: LocalStorage) -> Result<Self, Error> {
        let record = storage.get_item(SESSION_KEY)?;
        let mut session = Self::new(repository, storage);

        let Some(json) = record else {
            tracing::debug!("No active session record found");
            return Ok(session);
        };

        let restored = serde_json::from_str::<ActiveSessionRecord>(&json)
            .map_err(|error| error.to_string())
            .and_then(|record| {
                let count = record.transactions.len();
                session
                    .store
                    .replace(record.transactions)
                    .map_err(|error| error.to_string())?;
                Ok((document_name(&record.current_file), count))
            });

        match restored {
            Ok((name, count)) => {
                tracing::info!("Restored session \"{name}\" with {count} transactions");
                session.current_file = Some(name);
            }
            Err(reason) => {
                tracing::warn!("Discarding corrupt session record: {reason}");
                session.current_file = Some(DEFAULT_DOCUMENT_NAME.to_owned());
            }
        }

        Ok(session)
    }

    /// Whether a document is open.
    pub fn state(&self) -> SessionState {
        match self.current_file {
            Some(_) => SessionState::Open,
            None => SessionState::Unloaded,
        }
    }

    /// The name the open document will be saved under.
    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// A copy of the open document's transactions, in the order they were
    /// recorded.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.store.snapshot()
    }

    /// Describe the session.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            state: self.state(),
            current_file: self.current_file.clone(),
            transaction_count: self.store.len(),
        }
    }

    /// Open a new, empty document called `name`, discarding the transactions
    /// of the current document.
    ///
    /// Nothing is written to the document table until the first save. Any
    /// confirmation for discarding unsaved transactions is the caller's
    /// responsibility.
    ///
    /// # Errors
    /// Returns a persistence error if the active session record cannot be
    /// written. The new document is open regardless.
    pub fn open_new(&mut self, name: &str) -> Result<(), Error> {
        let name = document_name(name);
        tracing::info!("Opening new document \"{name}\"");

        self.store.replace(Vec::new())?;
        self.current_file = Some(name);

        self.persist_session()
    }

    /// Open the saved document `name`, replacing the transactions in the
    /// store.
    ///
    /// # Errors
    /// Returns an [Error::DocumentNotFound] if there is no such document, in
    /// which case the session is unchanged. Returns a persistence error if the
    /// document cannot be read, or if the active session record cannot be
    /// written after the document was opened.
    pub fn open_existing(&mut self, name: &str) -> Result<(), Error> {
        let name = document_name(name);
        let transactions = self.repository.load(&name)?;
        let count = transactions.len();

        self.store.replace(transactions)?;
        tracing::info!("Opened document \"{name}\" with {count} transactions");
        self.current_file = Some(name);

        self.persist_session()
    }

    /// Save the open document under its current name.
    ///
    /// # Errors
    /// Returns an [Error::NoOpenDocument] if no document is open, or a
    /// persistence error if the document or session record cannot be written.
    pub fn save(&self) -> Result<DocumentSummary, Error> {
        let name = self.current_file.as_deref().ok_or(Error::NoOpenDocument)?;

        let summary = self.repository.save(name, &self.store.snapshot())?;
        self.persist_session()?;

        Ok(summary)
    }

    /// Change the name the open document is saved under.
    ///
    /// The document saved under the old name is left as it is, so after the
    /// next save both names exist as separate documents.
    ///
    /// # Errors
    /// Returns an [Error::NoOpenDocument] if no document is open, or a
    /// persistence error if the active session record cannot be written.
    pub fn rename(&mut self, name: &str) -> Result<(), Error> {
        if self.current_file.is_none() {
            return Err(Error::NoOpenDocument);
        }

        let name = document_name(name);
        tracing::debug!("Renaming open document to \"{name}\"");
        self.current_file = Some(name);

        self.persist_session()
    }

    /// Record a new transaction and save the document.
    ///
    /// # Errors
    /// Returns an [Error::NoOpenDocument] if no document is open, or a
    /// validation error if the transaction is invalid; the store is unchanged
    /// in both cases. A persistence error means the transaction was recorded
    /// in memory but could not be saved.
    pub fn add_transaction(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        self.ensure_open()?;

        let transaction = self.store.add(builder)?;
        self.after_mutation()?;

        Ok(transaction)
    }

    /// Record a transaction dated `today` with the default description for
    /// its type.
    ///
    /// # Errors
    /// See [SessionController::add_transaction].
    pub fn quick_add(
        &mut self,
        transaction_type: TransactionType,
        amount: f64,
        category: Category,
        today: Date,
    ) -> Result<Transaction, Error> {
        let builder = Transaction::build(
            transaction_type,
            amount,
            transaction_type.default_description(),
            today,
        )
        .category(category);

        self.add_transaction(builder)
    }

    /// Delete the transaction `id` and save the document.
    ///
    /// Returns whether a transaction was deleted. Deleting a missing ID is not
    /// an error and still saves the document.
    ///
    /// # Errors
    /// Returns an [Error::NoOpenDocument] if no document is open. A
    /// persistence error means the transaction was deleted in memory but the
    /// document could not be saved.
    pub fn delete_transaction(&mut self, id: TransactionId) -> Result<bool, Error> {
        self.ensure_open()?;

        let removed = self.store.remove(id);
        self.after_mutation()?;

        Ok(removed)
    }

    /// Delete every transaction and save the (now empty) document.
    ///
    /// # Errors
    /// Returns an [Error::NoOpenDocument] if no document is open. A
    /// persistence error means the transactions were deleted in memory but the
    /// document could not be saved.
    pub fn clear_all(&mut self) -> Result<(), Error> {
        self.ensure_open()?;

        self.store.clear();
        self.after_mutation()
    }

    fn ensure_open(&self) -> Result<(), Error> {
        match self.current_file {
            Some(_) => Ok(()),
            None => Err(Error::NoOpenDocument),
        }
    }

    /// Runs after every change to the store.
    fn after_mutation(&self) -> Result<(), Error> {
        self.save()
            .map(|_| ())
            .inspect_err(|error| tracing::error!("Auto-save failed: {error}"))
    }

    fn persist_session(&self) -> Result<(), Error> {
        let record = ActiveSessionRecord {
            transactions: self.store.snapshot(),
            current_file: self.current_file.clone().unwrap_or_default(),
            last_updated: Some(OffsetDateTime::now_utc()),
        };
        let json = serde_json::to_string(&record)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        self.storage.set_item(SESSION_KEY, &json)
    }
}
