//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/documents/{name}', use
//! [format_endpoint].

use std::fmt::Display;

/// A route that always responds with "418 I'm a teapot".
pub const COFFEE: &str = "/api/coffee";
/// The route for describing the open document.
pub const SESSION: &str = "/api/session";
/// The route for saving the open document under its current name.
pub const SAVE_SESSION: &str = "/api/session/save";
/// The route for renaming the open document immediately.
pub const SESSION_NAME: &str = "/api/session/name";
/// The route for renaming the open document while the name is being typed.
pub const SESSION_NAME_INPUT: &str = "/api/session/name/input";
/// The route for listing, recording and clearing transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for recording a transaction dated today.
pub const QUICK_ADD_TRANSACTION: &str = "/api/transactions/quick";
/// The route for deleting a single transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the transactions with the latest dates.
pub const RECENT_TRANSACTIONS: &str = "/api/transactions/recent";
/// The route for the largest expenses.
pub const TOP_EXPENSES: &str = "/api/transactions/top-expenses";
/// The route for total income, expenses and balance.
pub const SUMMARY: &str = "/api/summary";
/// The route for totals by month.
pub const MONTHLY_SUMMARY: &str = "/api/summary/monthly";
/// The route for totals by category.
pub const CATEGORY_SUMMARY: &str = "/api/summary/categories";
/// The route for listing saved documents and creating new ones.
pub const DOCUMENTS: &str = "/api/documents";
/// The route for getting or deleting a saved document.
pub const DOCUMENT: &str = "/api/documents/{name}";
/// The route for opening a saved document.
pub const OPEN_DOCUMENT: &str = "/api/documents/{name}/open";

/// Replace the first parameter in `endpoint_path` with `param`.
///
/// If there is no parameter, `endpoint_path` is returned as is. The caller is
/// responsible for percent-encoding `param` if needed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_endpoint("/api/transactions/{transaction_id}", 1), "/api/transactions/1");
/// ```
pub fn format_endpoint(endpoint_path: &str, param: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        param,
        &endpoint_path[param_end..]
    )
}
