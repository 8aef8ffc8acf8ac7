//! Transaction data aggregation.
//!
//! Provides functions to total transactions by type, month and category, and
//! to pick out the most recent transactions and the largest expenses.
//!
//! Every function takes a snapshot of the open document and never changes it.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Serialize, Serializer};
use time::Date;

use crate::transaction::{Category, Transaction, TransactionType};

/// The number of transactions returned by [recent] when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// The number of transactions returned by [top_expenses] when no limit is given.
pub const DEFAULT_TOP_EXPENSES_LIMIT: usize = 5;

/// Totals of a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The sum of all income.
    pub total_income: f64,
    /// The sum of all expenses.
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
}

/// Totals of the transactions in one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyTotals {
    /// The sum of income in the month.
    pub income: f64,
    /// The sum of expenses in the month.
    pub expense: f64,
    /// Income minus expenses for the month.
    pub balance: f64,
}

/// Totals of the transactions in one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryTotals {
    /// The sum of income in the category.
    pub income: f64,
    /// The sum of expenses in the category.
    pub expense: f64,
    /// The number of transactions in the category.
    pub count: usize,
}

/// A calendar month, used to group transactions by their date.
///
/// Serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    /// The calendar year.
    pub year: i32,
    /// The month of the year, 1 to 12.
    pub month: u8,
}

impl From<Date> for YearMonth {
    fn from(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Totals income and expenses.
///
/// The totals are the sums of the [monthly_summary] totals, so adding up the
/// months always gives exactly these totals even when the amounts do not add
/// exactly as floats.
///
/// # Returns
/// The sums of income and expenses and the balance between them, all zero for
/// no transactions.
pub fn summary(transactions: &[Transaction]) -> Summary {
    let months = monthly_summary(transactions);
    let total_income = months.values().fold(0.0, |sum, totals| sum + totals.income);
    let total_expense = months.values().fold(0.0, |sum, totals| sum + totals.expense);

    Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    }
}

/// Totals income and expenses by the month of each transaction's date.
///
/// # Returns
/// A map from each month that has at least one transaction to its totals, in
/// chronological order.
pub fn monthly_summary(transactions: &[Transaction]) -> BTreeMap<YearMonth, MonthlyTotals> {
    let mut months: BTreeMap<YearMonth, MonthlyTotals> = BTreeMap::new();

    for transaction in transactions {
        let totals = months.entry(YearMonth::from(transaction.date)).or_default();

        match transaction.transaction_type {
            TransactionType::Income => totals.income += transaction.amount,
            TransactionType::Expense => totals.expense += transaction.amount,
        }
    }

    for totals in months.values_mut() {
        totals.balance = totals.income - totals.expense;
    }

    months
}

/// Totals income and expenses, and counts transactions, by category.
///
/// # Returns
/// A map from each category that has at least one transaction to its totals.
pub fn category_summary(transactions: &[Transaction]) -> BTreeMap<Category, CategoryTotals> {
    let mut categories: BTreeMap<Category, CategoryTotals> = BTreeMap::new();

    for transaction in transactions {
        let totals = categories.entry(transaction.category).or_default();

        match transaction.transaction_type {
            TransactionType::Income => totals.income += transaction.amount,
            TransactionType::Expense => totals.expense += transaction.amount,
        }

        totals.count += 1;
    }

    categories
}

/// Picks the `limit` transactions with the latest dates.
///
/// # Returns
/// Up to `limit` transactions, newest date first. Transactions on the same
/// date keep the order they were recorded in.
pub fn recent(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    // `sort_by` is stable, so ties keep their recorded order.
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}

/// Picks the `limit` largest expenses.
///
/// # Returns
/// Up to `limit` expense transactions, largest amount first. Expenses with the
/// same amount keep the order they were recorded in.
pub fn top_expenses(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    let mut expenses: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
        .collect();
    expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    expenses.truncate(limit);
    expenses
}
