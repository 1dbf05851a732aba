//! Conservation checking and the validation pass driver.
//!
//! A SEND (or an NFT child genesis) is only as good as the token inputs
//! backing it, and those inputs must themselves be proven first. Instead of
//! recursing once per ancestor, a pass keeps an explicit stack of frames:
//! a frame is expanded once (its unproven token ancestors are pushed on top
//! of it) and checked when it surfaces again with every ancestor proven.

use super::rules;
use super::walker;
use super::ValidatorStats;
use crate::state::{TransactionStore, ValidityCache};
use crate::{Outpoint, SlpMetadata, TokenType, Transaction, TransactionKind, Txid, ValidationError};
use std::collections::HashSet;
use tracing::trace;

/// An input spending an output of the lineage being checked
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenInput<'a> {
    pub outpoint: Outpoint,
    pub source: &'a Transaction,
}

/// Inputs of `tx` that spend outputs of `lineage`, each outpoint once.
///
/// Every input's source must be in the store. Sources carrying no token
/// metadata, or metadata of another lineage, contribute nothing.
pub(crate) fn lineage_inputs<'a>(
    store: &'a TransactionStore,
    tx: &Transaction,
    lineage: (TokenType, Txid),
) -> Result<Vec<TokenInput<'a>>, ValidationError> {
    let mut counted = HashSet::new();
    let mut inputs = Vec::new();

    for outpoint in &tx.inputs {
        let source = store.get(&outpoint.txid).ok_or(ValidationError::MissingAncestor {
            txid: tx.id,
            ancestor: outpoint.txid,
        })?;
        if !counted.insert(*outpoint) {
            continue;
        }
        if source.slp.as_ref().is_some_and(|meta| meta.lineage() == lineage) {
            inputs.push(TokenInput {
                outpoint: *outpoint,
                source,
            });
        }
    }

    Ok(inputs)
}

/// Token units carried into `txid` by `inputs`
pub(crate) fn input_total(txid: Txid, inputs: &[TokenInput<'_>]) -> Result<u128, ValidationError> {
    inputs
        .iter()
        .try_fold(0u128, |acc, input| {
            acc.checked_add(input.source.token_quantity(input.outpoint.vout))
        })
        .ok_or(ValidationError::structural(txid, "input quantity overflow"))
}

struct Frame<'a> {
    tx: &'a Transaction,
    expanded: bool,
}

impl<'a> Frame<'a> {
    fn new(tx: &'a Transaction) -> Self {
        Self { tx, expanded: false }
    }
}

/// State of one top-level validation.
///
/// Nothing here is shared between calls: `seen` holds frames that are
/// expanded but not yet checked, `proven` holds what this pass has proven.
/// The owner commits `proven` to the cache only when the whole pass succeeds.
pub(crate) struct ValidationPass<'a> {
    store: &'a TransactionStore,
    cache: &'a ValidityCache,
    limit: Option<usize>,
    seen: HashSet<Txid>,
    proven: HashSet<Txid>,
    stats: ValidatorStats,
}

impl<'a> ValidationPass<'a> {
    pub fn new(store: &'a TransactionStore, cache: &'a ValidityCache, limit: Option<usize>) -> Self {
        Self {
            store,
            cache,
            limit,
            seen: HashSet::new(),
            proven: HashSet::new(),
            stats: ValidatorStats::default(),
        }
    }

    pub fn finish(self) -> (HashSet<Txid>, ValidatorStats) {
        (self.proven, self.stats)
    }

    pub fn is_valid(&mut self, txid: &Txid) -> bool {
        if self.proven.contains(txid) {
            return true;
        }
        let hit = self.cache.contains(txid);
        if hit {
            self.stats.cache_hits += 1;
        }
        hit
    }

    pub fn record_lookups(&mut self, count: usize) {
        self.stats.store_lookups += count as u64;
    }

    pub fn record_checked(&mut self) {
        self.stats.transactions_checked += 1;
    }

    /// Prove `root` and every token ancestor it depends on.
    pub fn run(&mut self, root: &'a Transaction) -> Result<(), ValidationError> {
        let mut stack = vec![Frame::new(root)];
        let mut expanded = 0usize;

        while let Some(frame) = stack.last_mut() {
            let tx = frame.tx;
            if self.is_valid(&tx.id) {
                stack.pop();
                continue;
            }

            if !std::mem::replace(&mut frame.expanded, true) {
                expanded += 1;
                if let Some(limit) = self.limit {
                    if expanded > limit {
                        return Err(ValidationError::AncestorLimitExceeded { txid: root.id, limit });
                    }
                }
                self.seen.insert(tx.id);
                self.record_checked();

                for source in self.prerequisites(tx)? {
                    if self.seen.contains(&source.id) {
                        return Err(ValidationError::CycleDetected(source.id));
                    }
                    trace!("{} waits on ancestor {}", tx.id, source.id);
                    stack.push(Frame::new(source));
                }
                continue;
            }

            self.dispatch(tx)?;
            self.seen.remove(&tx.id);
            self.proven.insert(tx.id);
            stack.pop();
        }

        Ok(())
    }

    /// Token ancestors of `tx` that must be proven before its own rules run.
    fn prerequisites(&mut self, tx: &Transaction) -> Result<Vec<&'a Transaction>, ValidationError> {
        let meta = tx.slp.as_ref().ok_or(ValidationError::NotAToken(tx.id))?;
        rules::check_structure(tx, meta)?;

        let lineage = match (meta.token_type, meta.transaction_kind) {
            (_, TransactionKind::Send) => meta.lineage(),
            (TokenType::Nft1Child, TransactionKind::Genesis) => match meta.nft_parent_group_id {
                Some(group) => (TokenType::Nft1Parent, group),
                None => return Ok(Vec::new()),
            },
            // genesis roots and mint chains need no proven inputs
            _ => return Ok(Vec::new()),
        };

        let mut pending = Vec::new();
        let mut queued = HashSet::new();
        for input in self.lineage_inputs(tx, lineage)? {
            if queued.insert(input.source.id) && !self.is_valid(&input.source.id) {
                pending.push(input.source);
            }
        }
        Ok(pending)
    }

    pub fn lineage_inputs(
        &mut self,
        tx: &Transaction,
        lineage: (TokenType, Txid),
    ) -> Result<Vec<TokenInput<'a>>, ValidationError> {
        self.record_lookups(tx.inputs.len());
        lineage_inputs(self.store, tx, lineage)
    }

    /// Prove that the outputs declared by `tx` are backed by proven inputs
    /// of its own lineage: the output total may not exceed the input total.
    /// Whatever is left over is burned.
    pub fn check_outputs_valid(&mut self, tx: &Transaction, meta: &SlpMetadata) -> Result<(), ValidationError> {
        let inputs = self.lineage_inputs(tx, meta.lineage())?;

        let inputs_total = input_total(tx.id, &inputs)?;
        let outputs_total = meta
            .total_output()
            .ok_or(ValidationError::structural(tx.id, "output quantity overflow"))?;

        if outputs_total > inputs_total {
            return Err(ValidationError::ConservationViolation {
                txid: tx.id,
                inputs: inputs_total,
                outputs: outputs_total,
            });
        }
        Ok(())
    }

    /// Walk the mint chain of `tx` back to its GENESIS or to the nearest
    /// proven link, and stage every link walked as proven.
    pub fn check_mint_chain(&mut self, tx: &'a Transaction) -> Result<(), ValidationError> {
        let store = self.store;
        let limit = self.limit;
        let mut seen = HashSet::new();
        let mut mints = Vec::new();
        let result = walker::walk_chain(store, tx, &mut seen, &mut mints, limit, |txid| {
            self.is_valid(txid)
        });

        let lookups: usize = mints.iter().map(|link| link.inputs.len()).sum();
        self.record_lookups(lookups);
        // the starting mint was already counted when its frame expanded
        self.stats.transactions_checked += mints.len().saturating_sub(1) as u64;
        result?;

        for link in mints {
            self.proven.insert(link.id);
        }
        Ok(())
    }
}
