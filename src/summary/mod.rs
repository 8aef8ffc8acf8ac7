//! Summaries of the open document.
//!
//! This module contains:
//! - Pure aggregation functions over a snapshot of transactions
//! - Route handlers exposing the aggregations as JSON

mod aggregation;
mod handlers;

pub use aggregation::{
    CategoryTotals, DEFAULT_RECENT_LIMIT, DEFAULT_TOP_EXPENSES_LIMIT, MonthlyTotals, Summary,
    YearMonth, category_summary, monthly_summary, recent, summary, top_expenses,
};
pub use handlers::{
    get_category_summary, get_monthly_summary, get_recent_transactions, get_summary,
    get_top_expenses,
};
