//! Defines the endpoints for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    session::{SessionController, lock_session},
    timezone::today,
    transaction::{Category, Transaction, TransactionType, parse_date},
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The open document.
    pub session: Arc<Mutex<SessionController>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The value of the transaction.
    pub amount: f64,
    /// Text detailing the transaction.
    pub description: String,
    /// The category, [Category::Other] if missing.
    #[serde(default)]
    pub category: Option<Category>,
    /// The date when the transaction occurred, formatted as `YYYY-MM-DD`.
    pub date: String,
}

/// The request body for recording a transaction dated today.
#[derive(Debug, Deserialize)]
pub struct QuickAddForm {
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The value of the transaction.
    pub amount: f64,
    /// The category, [Category::Other] if missing.
    #[serde(default)]
    pub category: Option<Category>,
}

/// A route handler for recording a new transaction in the open document.
///
/// Responds with `201 Created` and the recorded transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Json(form): Json<TransactionForm>,
) -> Result<impl IntoResponse, Error> {
    let date = parse_date(&form.date)?;
    let builder = Transaction::build(form.transaction_type, form.amount, &form.description, date)
        .category(form.category.unwrap_or_default());

    let transaction = lock_session(&state.session)?.add_transaction(builder)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for recording a transaction dated today in the local
/// timezone, described as "Income" or "Expense".
pub async fn quick_add_endpoint(
    State(state): State<CreateTransactionState>,
    Json(form): Json<QuickAddForm>,
) -> Result<impl IntoResponse, Error> {
    let today = today(&state.local_timezone)?;

    let transaction = lock_session(&state.session)?.quick_add(
        form.transaction_type,
        form.amount,
        form.category.unwrap_or_default(),
        today,
    )?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
