//! The in-memory transactions of the open document.

use time::OffsetDateTime;

use crate::{
    Error,
    transaction::{Transaction, TransactionBuilder, TransactionId},
};

/// An ordered list of transactions, in the order they were recorded.
///
/// The store is the source of truth for the open document. Aggregation and
/// display work on a [TransactionStore::snapshot] so they never see a list
/// that is halfway through being changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    next_id: u64,
}

impl TransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            next_id: 1,
        }
    }

    /// Validate `builder` and append the resulting transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is not a finite number greater than zero,
    /// - [Error::EmptyDescription] if the description is empty after trimming,
    /// - or [Error::TransactionIdsExhausted] if there are no IDs left to hand out.
    ///
    /// The store is left unchanged on error.
    pub fn add(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or(Error::TransactionIdsExhausted)?;
        let id = TransactionId::new(self.next_id);
        let transaction = builder.finalize(id, OffsetDateTime::now_utc())?;

        self.next_id = next_id;
        self.transactions.push(transaction.clone());
        tracing::debug!("Added transaction {id}");

        Ok(transaction)
    }

    /// Remove the transaction with `id`.
    ///
    /// Returns whether a transaction was removed; removing an ID that is not in
    /// the store does nothing.
    pub fn remove(&mut self, id: TransactionId) -> bool {
        let count_before = self.transactions.len();
        self.transactions.retain(|transaction| transaction.id != id);
        let removed = self.transactions.len() != count_before;

        if removed {
            tracing::debug!("Removed transaction {id}");
        }

        removed
    }

    /// Remove every transaction.
    pub fn clear(&mut self) {
        tracing::debug!("Cleared {} transactions", self.transactions.len());
        self.transactions.clear();
    }

    /// Swap the contents of the store for `transactions`, e.g. when opening a
    /// saved document.
    ///
    /// New IDs continue from the largest ID in `transactions`.
    ///
    /// # Errors
    /// Returns an [Error::TransactionIdsExhausted] if the largest ID is
    /// `u64::MAX`, leaving the store unchanged.
    pub fn replace(&mut self, transactions: Vec<Transaction>) -> Result<(), Error> {
        let largest_id = transactions
            .iter()
            .map(|transaction| transaction.id.as_u64())
            .max()
            .unwrap_or(0);
        let next_id = largest_id
            .checked_add(1)
            .ok_or(Error::TransactionIdsExhausted)?;

        self.transactions = transactions;
        self.next_id = next_id;

        Ok(())
    }

    /// A copy of the transactions in the order they were recorded.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    /// The number of transactions in the store.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the store has no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        transaction::{
            Transaction, TransactionBuilder, TransactionId, TransactionStore, TransactionType,
        },
    };

    fn expense(amount: f64, description: &str) -> TransactionBuilder {
        Transaction::build(
            TransactionType::Expense,
            amount,
            description,
            date!(2025 - 04 - 01),
        )
    }

    #[test]
    fn add_appends_in_order() {
        let mut store = TransactionStore::new();

        let first = store.add(expense(1.0, "first")).unwrap();
        let second = store.add(expense(2.0, "second")).unwrap();

        assert_eq!(store.snapshot(), vec![first, second]);
    }

    #[test]
    fn add_rejects_zero_amount_without_changing_the_store() {
        let mut store = TransactionStore::new();
        store.add(expense(1.0, "kept")).unwrap();
        let before = store.snapshot();

        let result = store.add(expense(0.0, "free lunch"));

        assert_eq!(result, Err(Error::InvalidAmount(0.0)));
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_rejects_blank_description_without_changing_the_store() {
        let mut store = TransactionStore::new();

        let result = store.add(expense(10.0, " \t "));

        assert_eq!(result, Err(Error::EmptyDescription));
        assert!(store.is_empty());
    }

    #[test]
    fn failed_add_does_not_use_up_an_id() {
        let mut store = TransactionStore::new();

        let _ = store.add(expense(-5.0, "refund?"));
        let transaction = store.add(expense(5.0, "coffee")).unwrap();

        assert_eq!(transaction.id, TransactionId::new(1));
    }

    #[test]
    fn remove_deletes_matching_transaction() {
        let mut store = TransactionStore::new();
        let keep = store.add(expense(1.0, "keep")).unwrap();
        let delete = store.add(expense(2.0, "delete")).unwrap();

        assert!(store.remove(delete.id));
        assert_eq!(store.snapshot(), vec![keep]);
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let mut store = TransactionStore::new();
        store.add(expense(1.0, "keep")).unwrap();

        assert!(!store.remove(TransactionId::new(42)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_are_not_reused_after_removing_the_latest_transaction() {
        let mut store = TransactionStore::new();
        store.add(expense(1.0, "first")).unwrap();
        let second = store.add(expense(2.0, "second")).unwrap();
        store.remove(second.id);

        let third = store.add(expense(3.0, "third")).unwrap();

        assert_ne!(third.id, second.id);
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut store = TransactionStore::new();
        let first = store.add(expense(1.0, "first")).unwrap();
        store.clear();

        let second = store.add(expense(2.0, "second")).unwrap();

        assert!(store.len() == 1);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn replace_continues_ids_after_loaded_transactions() {
        let mut source = TransactionStore::new();
        for i in 1..=3 {
            source.add(expense(i as f64, "loaded")).unwrap();
        }

        let mut store = TransactionStore::new();
        store.replace(source.snapshot()).unwrap();
        let added = store.add(expense(4.0, "new")).unwrap();

        assert_eq!(added.id, TransactionId::new(4));
        assert_eq!(store.len(), 4);
    }

    fn with_id(id: u64) -> Transaction {
        let mut source = TransactionStore::new();
        let mut transaction = source.add(expense(1.0, "loaded")).unwrap();
        transaction.id = TransactionId::new(id);
        transaction
    }

    #[test]
    fn replace_rejects_the_largest_possible_id() {
        let mut store = TransactionStore::new();
        let kept = store.add(expense(1.0, "kept")).unwrap();

        let result = store.replace(vec![with_id(u64::MAX)]);

        assert_eq!(result, Err(Error::TransactionIdsExhausted));
        assert_eq!(store.snapshot(), vec![kept]);
    }

    #[test]
    fn add_fails_once_ids_run_out() {
        let mut store = TransactionStore::new();
        store.replace(vec![with_id(u64::MAX - 2)]).unwrap();

        let last = store.add(expense(2.0, "last")).unwrap();
        let result = store.add(expense(3.0, "one too many"));

        assert_eq!(last.id, TransactionId::new(u64::MAX - 1));
        assert_eq!(result, Err(Error::TransactionIdsExhausted));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn snapshot_is_independent_of_later_changes() {
        let mut store = TransactionStore::new();
        store.add(expense(1.0, "first")).unwrap();

        let snapshot = store.snapshot();
        store.add(expense(2.0, "second")).unwrap();
        store.clear();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].description, "first");
    }
}
