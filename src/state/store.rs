use crate::{Transaction, Txid};
use std::collections::{HashMap, HashSet};

/// Transaction records keyed by txid, fed by an external indexer.
///
/// Also keeps a spender index (`prev txid -> txids spending it`) so cached
/// validity can be cascaded to descendants when an ancestor is removed.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: HashMap<Txid, Transaction>,
    spenders: HashMap<Txid, HashSet<Txid>>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. Returns whether the map changed.
    pub fn insert(&mut self, tx: Transaction) -> bool {
        if self.transactions.get(&tx.id) == Some(&tx) {
            return false;
        }
        if let Some(previous) = self.transactions.remove(&tx.id) {
            self.unlink(&previous);
        }
        for input in &tx.inputs {
            self.spenders.entry(input.txid).or_default().insert(tx.id);
        }
        self.transactions.insert(tx.id, tx);
        true
    }

    /// Remove a record, returning it if it was present.
    ///
    /// Entries recording who spends the removed transaction are kept: those
    /// spenders are still in the store and still reference it.
    pub fn remove(&mut self, txid: &Txid) -> Option<Transaction> {
        let removed = self.transactions.remove(txid)?;
        self.unlink(&removed);
        Some(removed)
    }

    pub fn get(&self, txid: &Txid) -> Option<&Transaction> {
        self.transactions.get(txid)
    }

    pub fn contains(&self, txid: &Txid) -> bool {
        self.transactions.contains_key(txid)
    }

    /// Transactions in the store that spend at least one output of `txid`
    pub fn spenders_of(&self, txid: &Txid) -> impl Iterator<Item = &Txid> + '_ {
        self.spenders.get(txid).into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    fn unlink(&mut self, tx: &Transaction) {
        for input in &tx.inputs {
            if let Some(set) = self.spenders.get_mut(&input.txid) {
                set.remove(&tx.id);
                if set.is_empty() {
                    self.spenders.remove(&input.txid);
                }
            }
        }
    }
}
