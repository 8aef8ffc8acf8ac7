//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The `TransactionStore` holding the transactions of the open document
//! - Route handlers for recording, listing and deleting transactions

mod core;
mod create_transaction_endpoint;
mod delete_transaction_endpoint;
mod store;
mod transactions_endpoint;

pub use core::{
    Category, Transaction, TransactionBuilder, TransactionId, TransactionType, parse_date,
};
pub use create_transaction_endpoint::{create_transaction_endpoint, quick_add_endpoint};
pub use delete_transaction_endpoint::{clear_transactions_endpoint, delete_transaction_endpoint};
pub use store::TransactionStore;
pub use transactions_endpoint::get_transactions_endpoint;
