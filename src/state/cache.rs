use crate::Txid;
use std::collections::HashSet;

/// Set of transactions already proven valid.
///
/// Grows through successful validation (`proven`) or explicit checkpoint
/// seeding (`checkpoints`). Checkpoints are pinned: eviction never removes
/// them.
#[derive(Debug, Default)]
pub struct ValidityCache {
    proven: HashSet<Txid>,
    checkpoints: HashSet<Txid>,
}

impl ValidityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, txid: &Txid) -> bool {
        self.proven.contains(txid) || self.checkpoints.contains(txid)
    }

    pub fn is_pinned(&self, txid: &Txid) -> bool {
        self.checkpoints.contains(txid)
    }

    /// Record a transaction proven by validation. Returns whether the set changed.
    pub fn insert(&mut self, txid: Txid) -> bool {
        let fresh = !self.contains(&txid);
        self.proven.insert(txid);
        fresh
    }

    /// Pin a known-good checkpoint without checking it.
    /// Returns whether the set of valid txids changed.
    pub fn pin(&mut self, txid: Txid) -> bool {
        let fresh = !self.contains(&txid);
        self.proven.remove(&txid);
        self.checkpoints.insert(txid);
        fresh
    }

    /// Drop a proven entry. Pinned checkpoints stay.
    pub fn evict(&mut self, txid: &Txid) -> bool {
        self.proven.remove(txid)
    }

    pub fn extend(&mut self, txids: impl IntoIterator<Item = Txid>) {
        for txid in txids {
            self.insert(txid);
        }
    }

    pub fn len(&self) -> usize {
        self.proven.len() + self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proven.is_empty() && self.checkpoints.is_empty()
    }
}
