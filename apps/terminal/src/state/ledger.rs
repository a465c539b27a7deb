//! # Ledger State
//!
//! The raw transaction set last loaded from storage.
//!
//! Only the records are kept. Sorting, rows and running balances are
//! reconstructed from them on every view, so there is no balance here that
//! could drift from the data.

use std::sync::{Arc, Mutex};

use tally_core::Transaction;

#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    transactions: Arc<Mutex<Vec<Transaction>>>,
}

impl LedgerState {
    pub fn new() -> Self {
        LedgerState::default()
    }

    pub fn with_transactions<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Transaction]) -> R,
    {
        let transactions = self.transactions.lock().expect("Ledger mutex poisoned");
        f(&transactions)
    }

    /// Copy of the loaded records, in storage order.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.with_transactions(<[Transaction]>::to_vec)
    }

    /// Swaps in a freshly loaded set.
    pub fn replace(&self, transactions: Vec<Transaction>) {
        let mut current = self.transactions.lock().expect("Ledger mutex poisoned");
        *current = transactions;
    }

    /// Inserts or replaces a single record by id.
    pub fn upsert(&self, tx: Transaction) {
        let mut current = self.transactions.lock().expect("Ledger mutex poisoned");
        match current.iter_mut().find(|t| t.id == tx.id) {
            Some(existing) => *existing = tx,
            None => current.push(tx),
        }
    }

    pub fn find(&self, id: &str) -> Option<Transaction> {
        self.with_transactions(|txs| txs.iter().find(|t| t.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.with_transactions(<[Transaction]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
