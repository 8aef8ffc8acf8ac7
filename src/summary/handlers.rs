//! Summary HTTP handlers.
//!
//! Each handler takes a snapshot of the open document and runs one of the
//! aggregation functions over it.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    session::{SessionController, lock_session},
    summary::aggregation::{
        CategoryTotals, DEFAULT_RECENT_LIMIT, DEFAULT_TOP_EXPENSES_LIMIT, MonthlyTotals, Summary,
        YearMonth, category_summary, monthly_summary, recent, summary, top_expenses,
    },
    transaction::{Category, Transaction},
};

/// The state needed for the summary handlers.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The open document.
    pub session: Arc<Mutex<SessionController>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
        }
    }
}

/// Query parameters for handlers that return a limited number of transactions.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    /// The maximum number of transactions to return, zero or less returns none.
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn limit_or(&self, default: usize) -> usize {
        match self.limit {
            Some(limit) => usize::try_from(limit).unwrap_or(0),
            None => default,
        }
    }
}

fn snapshot(state: &SummaryState) -> Result<Vec<Transaction>, Error> {
    Ok(lock_session(&state.session)?.snapshot())
}

/// Get the total income, expenses and balance of the open document.
pub async fn get_summary(State(state): State<SummaryState>) -> Result<Json<Summary>, Error> {
    let transactions = snapshot(&state)?;

    Ok(Json(summary(&transactions)))
}

/// Get the totals of the open document by month.
pub async fn get_monthly_summary(
    State(state): State<SummaryState>,
) -> Result<Json<BTreeMap<YearMonth, MonthlyTotals>>, Error> {
    let transactions = snapshot(&state)?;

    Ok(Json(monthly_summary(&transactions)))
}

/// Get the totals of the open document by category.
pub async fn get_category_summary(
    State(state): State<SummaryState>,
) -> Result<Json<BTreeMap<Category, CategoryTotals>>, Error> {
    let transactions = snapshot(&state)?;

    Ok(Json(category_summary(&transactions)))
}

/// Get the transactions with the latest dates, 10 by default.
pub async fn get_recent_transactions(
    State(state): State<SummaryState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let transactions = snapshot(&state)?;
    let limit = query.limit_or(DEFAULT_RECENT_LIMIT);

    Ok(Json(
        recent(&transactions, limit).into_iter().cloned().collect(),
    ))
}

/// Get the largest expenses, 5 by default.
pub async fn get_top_expenses(
    State(state): State<SummaryState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let transactions = snapshot(&state)?;
    let limit = query.limit_or(DEFAULT_TOP_EXPENSES_LIMIT);

    Ok(Json(
        top_expenses(&transactions, limit)
            .into_iter()
            .cloned()
            .collect(),
    ))
}
