//! Named documents of transactions, persisted as a single table record.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, storage::LocalStorage, transaction::Transaction};

/// The storage key of the document table.
pub const DOCUMENT_TABLE_KEY: &str = "financeFiles";

/// The name used for documents saved with a blank name.
pub const DEFAULT_DOCUMENT_NAME: &str = "Financial Records";

/// Normalize a user supplied document name.
///
/// Surrounding whitespace is removed and a blank name maps to
/// [DEFAULT_DOCUMENT_NAME].
pub fn document_name(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        DEFAULT_DOCUMENT_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Bookkeeping stored alongside a document's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// When a document with this name was first saved.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    /// When the document was last saved.
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
    /// The number of transactions in the document.
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DocumentData {
    #[serde(default)]
    transactions: Vec<Transaction>,
    metadata: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument {
    data: DocumentData,
    #[serde(with = "time::serde::rfc3339")]
    last_modified: OffsetDateTime,
    size: usize,
}

type DocumentTable = BTreeMap<String, StoredDocument>;

/// A document as shown in a list of saved documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// The unique name of the document.
    pub name: String,
    /// When the document was last saved.
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
    /// The size of the serialized document in bytes.
    pub size: usize,
}

/// Everything known about a saved document except its transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    /// The unique name of the document.
    pub name: String,
    /// The size of the serialized document in bytes.
    pub size: usize,
    /// Creation and modification times and the transaction count.
    pub metadata: DocumentMetadata,
}

/// Saves, loads, lists and deletes named documents.
///
/// All documents live in one record of the underlying [LocalStorage], so every
/// change is a read-modify-write of the whole table. Changes are serialized so
/// that concurrent saves behave as last-write-wins instead of losing each
/// other's documents.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    storage: LocalStorage,
    write_lock: Arc<Mutex<()>>,
}

impl DocumentRepository {
    /// Create a repository over `storage`.
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// List every saved document, in no particular order.
    ///
    /// # Errors
    /// Returns a persistence error if the document table cannot be read.
    pub fn list(&self) -> Result<Vec<DocumentSummary>, Error> {
        let table = self.read_table()?;

        Ok(table
            .into_iter()
            .map(|(name, document)| DocumentSummary {
                name,
                last_modified: document.last_modified,
                size: document.size,
            })
            .collect())
    }

    /// Get the metadata of the document `name`.
    ///
    /// # Errors
    /// Returns an [Error::DocumentNotFound] if there is no such document, or a
    /// persistence error if the document table cannot be read.
    pub fn info(&self, name: &str) -> Result<DocumentInfo, Error> {
        let name = document_name(name);
        let mut table = self.read_table()?;

        let document = table
            .remove(&name)
            .ok_or_else(|| Error::DocumentNotFound(name.clone()))?;

        Ok(DocumentInfo {
            name,
            size: document.size,
            metadata: document.data.metadata,
        })
    }

    /// Save `transactions` as the document `name`, replacing any document
    /// already saved under that name.
    ///
    /// The creation time of an existing document is kept.
    ///
    /// # Errors
    /// Returns a persistence error, e.g. [Error::StorageFull], if the document
    /// table cannot be read or written. The stored table is unchanged on error.
    pub fn save(&self, name: &str, transactions: &[Transaction]) -> Result<DocumentSummary, Error> {
        let name = document_name(name);
        let _guard = self.lock_writes()?;
        let mut table = self.read_table()?;

        let now = OffsetDateTime::now_utc();
        let created = table
            .get(&name)
            .map(|existing| existing.data.metadata.created)
            .unwrap_or(now);

        let data = DocumentData {
            transactions: transactions.to_vec(),
            metadata: DocumentMetadata {
                created,
                last_modified: now,
                transaction_count: transactions.len(),
            },
        };
        let size = serde_json::to_string(&data)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?
            .len();

        table.insert(
            name.clone(),
            StoredDocument {
                data,
                last_modified: now,
                size,
            },
        );
        self.write_table(&table)?;

        tracing::info!(
            "Saved document \"{name}\" with {} transactions ({size} bytes)",
            transactions.len()
        );

        Ok(DocumentSummary {
            name,
            last_modified: now,
            size,
        })
    }

    /// Load the transactions of the document `name`, in the order they were
    /// saved.
    ///
    /// # Errors
    /// Returns an [Error::DocumentNotFound] if there is no such document, or a
    /// persistence error if the document table cannot be read.
    pub fn load(&self, name: &str) -> Result<Vec<Transaction>, Error> {
        let name = document_name(name);
        let mut table = self.read_table()?;

        table
            .remove(&name)
            .map(|document| document.data.transactions)
            .ok_or(Error::DocumentNotFound(name))
    }

    /// Delete the document `name`, does nothing if there is no such document.
    ///
    /// Deleting the last document removes the document table record itself.
    /// Returns whether a document was deleted.
    ///
    /// # Errors
    /// Returns a persistence error if the document table cannot be read or
    /// written.
    pub fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = document_name(name);
        let _guard = self.lock_writes()?;
        let mut table = self.read_table()?;

        if table.remove(&name).is_none() {
            return Ok(false);
        }

        if table.is_empty() {
            self.storage.remove_item(DOCUMENT_TABLE_KEY)?;
        } else {
            self.write_table(&table)?;
        }
        tracing::info!("Deleted document \"{name}\"");

        Ok(true)
    }

    fn read_table(&self) -> Result<DocumentTable, Error> {
        match self.storage.get_item(DOCUMENT_TABLE_KEY)? {
            Some(json) => serde_json::from_str(&json).map_err(|error| Error::CorruptRecord {
                key: DOCUMENT_TABLE_KEY.to_owned(),
                reason: error.to_string(),
            }),
            None => Ok(DocumentTable::new()),
        }
    }

    fn write_table(&self, table: &DocumentTable) -> Result<(), Error> {
        let json = serde_json::to_string(table)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        self.storage
            .set_item(DOCUMENT_TABLE_KEY, &json)
            .inspect_err(|error| tracing::error!("Could not write the document table: {error}"))
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, Error> {
        self.write_lock
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire document table lock: {error}"))
            .map_err(|_| Error::LockPoisoned)
    }
}
