//! Defines the endpoint for listing the transactions of the open document.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};

use crate::{
    AppState, Error,
    session::{SessionController, lock_session},
    transaction::Transaction,
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The open document.
    pub session: Arc<Mutex<SessionController>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
        }
    }
}

/// A route handler for listing every transaction in the open document, latest
/// date first.
///
/// Transactions on the same date keep the order they were recorded in.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let mut transactions = lock_session(&state.session)?.snapshot();
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(Json(transactions))
}
