//! Pocket Ledger is a personal finance ledger for recording income and
//! expenses.
//!
//! Transactions are recorded into a single open document (the session) and
//! persisted as named documents in a local key/value store. Summaries by type,
//! month and category are computed on demand from a snapshot of the open
//! document.
//!
//! This library provides a JSON API over these operations.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod config;
mod db;
mod document;
pub mod endpoints;
mod logging;
mod not_found;
mod routing;
mod session;
mod storage;
mod summary;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use config::LedgerConfig;
pub use db::initialize as initialize_db;
pub use document::{
    DEFAULT_DOCUMENT_NAME, DocumentInfo, DocumentMetadata, DocumentRepository, DocumentSummary,
    document_name,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use session::{Debouncer, SessionController, SessionInfo, SessionState};
pub use storage::LocalStorage;
pub use summary::{
    CategoryTotals, DEFAULT_RECENT_LIMIT, DEFAULT_TOP_EXPENSES_LIMIT, MonthlyTotals, Summary,
    YearMonth, category_summary, monthly_summary, recent, summary, top_expenses,
};
pub use transaction::{
    Category, Transaction, TransactionBuilder, TransactionId, TransactionStore, TransactionType,
    parse_date,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction amount was zero, negative, NaN or infinite.
    #[error("amount must be a finite number greater than zero, got {0}")]
    InvalidAmount(f64),

    /// A transaction description was empty or only contained whitespace.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// A transaction date could not be parsed as a `YYYY-MM-DD` date.
    ///
    /// Dates are checked when a transaction is recorded so that summaries
    /// never have to deal with malformed dates.
    #[error("could not parse \"{0}\" as a YYYY-MM-DD date")]
    InvalidDate(String),

    /// No document with the given name exists in the document table.
    #[error("the document \"{0}\" could not be found")]
    DocumentNotFound(String),

    /// An operation that needs an open document was called before any
    /// document was opened.
    #[error("no document is open")]
    NoOpenDocument,

    /// The write was rejected because it would push the storage over its
    /// quota.
    ///
    /// The in-memory session is left as is, callers should retry the save
    /// after freeing up space, e.g. by deleting old documents.
    #[error("writing {attempted} bytes would exceed the storage quota of {quota} bytes")]
    StorageFull {
        /// The total number of bytes the storage would hold after the write.
        attempted: usize,
        /// The configured maximum number of bytes.
        quota: usize,
    },

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// A persisted record could not be parsed.
    #[error("stored record \"{key}\" is corrupt: {reason}")]
    CorruptRecord {
        /// The storage key of the record.
        key: String,
        /// Why the record could not be parsed.
        reason: String,
    },

    /// Could not acquire a lock because another thread panicked while holding it.
    #[error("could not acquire the lock")]
    LockPoisoned,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Every transaction ID has been handed out, or a stored transaction uses
    /// the largest possible ID.
    #[error("no transaction IDs are left to assign")]
    TransactionIdsExhausted,
}

/// The broad classes of [Error].
///
/// Callers use the kind to decide how to recover: validation errors leave
/// everything unchanged, not found errors leave everything unchanged, and
/// persistence errors may leave the in-memory session ahead of storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input was malformed or missing.
    Validation,
    /// The requested document (or an open document) does not exist.
    NotFound,
    /// The storage medium failed to read or write.
    Persistence,
}

impl Error {
    /// Get the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidAmount(_)
            | Error::EmptyDescription
            | Error::InvalidDate(_)
            | Error::InvalidTimezone(_) => ErrorKind::Validation,
            Error::DocumentNotFound(_) | Error::NoOpenDocument => ErrorKind::NotFound,
            Error::StorageFull { .. }
            | Error::SqlError(_)
            | Error::JSONSerializationError(_)
            | Error::CorruptRecord { .. }
            | Error::LockPoisoned
            | Error::TransactionIdsExhausted => ErrorKind::Persistence,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorKind,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match (&self, kind) {
            (Error::StorageFull { .. }, _) => StatusCode::INSUFFICIENT_STORAGE,
            (_, ErrorKind::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
            (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
            (_, ErrorKind::Persistence) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if kind == ErrorKind::Persistence {
            tracing::error!("A persistence error occurred: {}", self);
        }

        let body = ErrorBody {
            error: kind,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, ErrorKind};

    #[test]
    fn classifies_errors() {
        assert_eq!(Error::InvalidAmount(0.0).kind(), ErrorKind::Validation);
        assert_eq!(Error::EmptyDescription.kind(), ErrorKind::Validation);
        assert_eq!(
            Error::InvalidDate("2024-13-01".to_owned()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::DocumentNotFound("missing".to_owned()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(Error::NoOpenDocument.kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::StorageFull {
                attempted: 10,
                quota: 5
            }
            .kind(),
            ErrorKind::Persistence
        );
        assert_eq!(Error::LockPoisoned.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn maps_kinds_to_status_codes() {
        let cases = [
            (Error::EmptyDescription, StatusCode::UNPROCESSABLE_ENTITY),
            (
                Error::DocumentNotFound("missing".to_owned()),
                StatusCode::NOT_FOUND,
            ),
            (
                Error::StorageFull {
                    attempted: 10,
                    quota: 5,
                },
                StatusCode::INSUFFICIENT_STORAGE,
            ),
            (Error::LockPoisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, want_status) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), want_status);
        }
    }
}
