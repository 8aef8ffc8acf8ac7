//! Defines the core data model for transactions and how new transactions are
//! validated.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

// ============================================================================
// MODELS
// ============================================================================

/// Identifies a transaction within a document.
///
/// IDs are handed out by [crate::TransactionStore] and are never reused while
/// a document is open, even after the transaction with the largest ID is
/// deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Wrap a raw ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The description used for transactions recorded without one.
    pub fn default_description(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

/// The fixed set of tags used to break down transactions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Wages and other regular pay.
    Salary,
    /// Groceries and eating out.
    Food,
    /// Fuel, fares and parking.
    Transport,
    /// General purchases.
    Shopping,
    /// Utilities, rent and subscriptions.
    Bills,
    /// Leisure spending.
    Entertainment,
    /// Anything else.
    #[default]
    Other,
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are immutable once recorded. To create a new `Transaction`,
/// use [Transaction::build] and add it to a [crate::TransactionStore].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction, unique within its document.
    pub id: TransactionId,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned, always greater than zero.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The tag used when breaking transactions down by category.
    #[serde(default)]
    pub category: Category,
    /// When the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        description: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            description: description.to_owned(),
            category: Category::default(),
            date,
        }
    }
}

/// The user supplied fields of a [Transaction] that has not been recorded yet.
///
/// The ID and creation time are assigned when the builder is added to a
/// [crate::TransactionStore], which is also where the fields are validated.
///
/// # Examples
///
/// ```
/// use time::macros::date;
///
/// use pocket_ledger::{Category, Transaction, TransactionStore, TransactionType};
///
/// let mut store = TransactionStore::new();
/// let transaction = store
///     .add(
///         Transaction::build(TransactionType::Expense, 12.5, "Lunch", date!(2025 - 01 - 15))
///             .category(Category::Food),
///     )
///     .unwrap();
///
/// assert_eq!(transaction.category, Category::Food);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,

    /// The amount of money, must be finite and greater than zero.
    ///
    /// The sign is never used to encode the direction of the transaction,
    /// that is what `transaction_type` is for.
    pub amount: f64,

    /// A human-readable description of the transaction.
    ///
    /// Leading and trailing whitespace is removed, and the trimmed text must
    /// not be empty.
    pub description: String,

    /// The category of the transaction, defaults to [Category::Other].
    pub category: Category,

    /// The date when the transaction occurred.
    pub date: Date,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Check the fields and build the transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is not a finite number greater than zero,
    /// - or [Error::EmptyDescription] if the description is empty after trimming.
    pub(crate) fn finalize(
        self,
        id: TransactionId,
        created_at: OffsetDateTime,
    ) -> Result<Transaction, Error> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        Ok(Transaction {
            id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            description: description.to_owned(),
            category: self.category,
            date: self.date,
            created_at,
        })
    }
}

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace.
///
/// # Errors
/// Returns [Error::InvalidDate] if `raw` is not a valid calendar date in that format.
pub fn parse_date(raw: &str) -> Result<Date, Error> {
    Date::parse(raw.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(raw.to_owned()))
}

// ============================================================================
// TESTS
// ============================================================================
