//! Defines the endpoints for deleting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    session::{SessionController, lock_session},
    transaction::TransactionId,
};

/// The state needed to delete transactions.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The open document.
    pub session: Arc<Mutex<SessionController>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
        }
    }
}

/// A route handler for deleting a transaction from the open document.
///
/// Deleting a transaction that does not exist is not an error, the response
/// is `204 No Content` either way.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let removed = lock_session(&state.session)?.delete_transaction(transaction_id)?;

    if !removed {
        tracing::debug!("Transaction {transaction_id} was already gone");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for deleting every transaction in the open document.
pub async fn clear_transactions_endpoint(
    State(state): State<DeleteTransactionState>,
) -> Result<StatusCode, Error> {
    lock_session(&state.session)?.clear_all()?;

    Ok(StatusCode::NO_CONTENT)
}
