use super::conservation::ValidationPass;
use super::walker;
use crate::config::{CachePolicy, ValidatorConfig};
use crate::state::{TransactionStore, ValidityCache};
use crate::{Transaction, Txid, ValidationError};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Counters describing the work the validator has done
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidatorStats {
    /// Lookups answered by the validity cache
    pub cache_hits: u64,
    /// Store lookups performed while resolving inputs
    pub store_lookups: u64,
    /// Transactions whose rules were evaluated
    pub transactions_checked: u64,
    pub validations_passed: u64,
    pub validations_failed: u64,
}

impl ValidatorStats {
    fn absorb(&mut self, pass: &ValidatorStats) {
        self.cache_hits += pass.cache_hits;
        self.store_lookups += pass.store_lookups;
        self.transactions_checked += pass.transactions_checked;
    }
}

/// SLP token validator
///
/// Owns the transaction store and the validity cache. Successful
/// validations are memoized; failures never are, since a missing ancestor
/// may still be ingested later.
pub struct SlpValidator {
    store: TransactionStore,
    cache: ValidityCache,
    config: ValidatorConfig,
    stats: ValidatorStats,
}

impl Default for SlpValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl SlpValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            store: TransactionStore::new(),
            cache: ValidityCache::new(),
            config,
            stats: ValidatorStats::default(),
        }
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn cache(&self) -> &ValidityCache {
        &self.cache
    }

    pub fn stats(&self) -> &ValidatorStats {
        &self.stats
    }

    /// Insert or replace a transaction record. No validation is performed.
    /// Returns whether the store changed.
    pub fn add_tx(&mut self, tx: Transaction) -> bool {
        self.store.insert(tx)
    }

    /// Remove a transaction record. Returns whether anything was removed.
    ///
    /// Under `CachePolicy::Cascade` the removed transaction and every cached
    /// transaction spending from it, directly or transitively, lose their
    /// cached validity. Pinned checkpoints are kept.
    pub fn remove_tx(&mut self, txid: &Txid) -> bool {
        if self.store.remove(txid).is_none() {
            return false;
        }
        if self.config.cache_policy == CachePolicy::Cascade {
            let evicted = self.evict_descendants(txid);
            if evicted > 0 {
                info!("Removing {} evicted {} cached validations", txid, evicted);
            }
        }
        true
    }

    /// Seed a known-valid checkpoint without checking it.
    /// Returns whether the set of valid txids changed.
    pub fn add_valid_txid(&mut self, txid: Txid) -> bool {
        self.cache.pin(txid)
    }

    /// Validate a stored transaction by id
    pub fn validate(&mut self, txid: &Txid) -> bool {
        self.try_validate(txid).is_ok()
    }

    /// Validate a transaction record, which need not be in the store itself.
    ///
    /// Under `CachePolicy::Cascade` an unstored record's own validity is not
    /// cached; its stored ancestors are.
    pub fn validate_tx(&mut self, tx: &Transaction) -> bool {
        self.try_validate_tx(tx).is_ok()
    }

    /// Like `validate`, but reports why a transaction is not provably valid
    pub fn try_validate(&mut self, txid: &Txid) -> Result<(), ValidationError> {
        self.stats.store_lookups += 1;
        let Some(tx) = self.store.get(txid) else {
            self.stats.validations_failed += 1;
            debug!("Validation of unknown transaction {}", txid);
            return Err(ValidationError::UnknownTransaction(*txid));
        };
        if self.cache.contains(txid) {
            self.stats.cache_hits += 1;
            return Ok(());
        }
        // the pass borrows the store immutably; work on a detached copy of the root
        let tx = tx.clone();
        self.try_validate_tx(&tx)
    }

    pub fn try_validate_tx(&mut self, tx: &Transaction) -> Result<(), ValidationError> {
        if self.cache.contains(&tx.id) {
            self.stats.cache_hits += 1;
            return Ok(());
        }
        if tx.slp.is_none() {
            self.stats.validations_failed += 1;
            return Err(ValidationError::NotAToken(tx.id));
        }

        debug!("Validating transaction {}", tx.id);
        let (result, proven, pass_stats) = {
            let mut pass = ValidationPass::new(&self.store, &self.cache, self.config.max_ancestors);
            let result = pass.run(tx);
            let (proven, pass_stats) = pass.finish();
            (result, proven, pass_stats)
        };
        self.stats.absorb(&pass_stats);

        match result {
            Ok(()) => {
                let mut proven = proven;
                // cascade eviction cannot reach an unstored root
                if self.config.cache_policy == CachePolicy::Cascade && !self.store.contains(&tx.id) {
                    proven.remove(&tx.id);
                }
                debug!(
                    "Transaction {} valid, {} newly proven, {} checked",
                    tx.id,
                    proven.len(),
                    pass_stats.transactions_checked
                );
                self.cache.extend(proven);
                self.stats.validations_passed += 1;
                Ok(())
            }
            Err(e) => {
                if e.is_retryable() {
                    debug!("Transaction {} not yet provable: {}", tx.id, e);
                } else {
                    warn!("Transaction {} invalid: {}", tx.id, e);
                }
                self.stats.validations_failed += 1;
                Err(e)
            }
        }
    }

    /// Reconstruct the mint chain ending at `mints[0]`.
    ///
    /// On success `mints` is replaced by the chain ordered GENESIS first and
    /// `seen` holds every txid visited. On failure both keep whatever the
    /// walk reached before giving up.
    pub fn walk_mints_home(&self, seen: &mut HashSet<Txid>, mints: &mut Vec<Transaction>) -> bool {
        let Some(start) = mints.first().cloned() else {
            return false;
        };
        let mut chain = Vec::new();
        let result = walker::walk_chain(&self.store, &start, seen, &mut chain, None, |_| false);

        mints.clear();
        mints.extend(chain.into_iter().cloned());
        if let Err(e) = result {
            debug!("Mint chain of {} broken: {}", start.id, e);
            return false;
        }
        true
    }

    fn evict_descendants(&mut self, root: &Txid) -> usize {
        let mut evicted = 0;
        let mut visited = HashSet::from([*root]);
        let mut queue = VecDeque::from([*root]);

        while let Some(txid) = queue.pop_front() {
            if self.cache.evict(&txid) {
                evicted += 1;
            }
            let spenders: Vec<Txid> = self.store.spenders_of(&txid).copied().collect();
            for spender in spenders {
                if visited.insert(spender) {
                    queue.push_back(spender);
                }
            }
        }
        evicted
    }
}
