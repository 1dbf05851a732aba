//! Token graph search: the set of transactions backing a valid token transaction.

use super::conservation::lineage_inputs;
use super::walker::baton_predecessor;
use super::SlpValidator;
use crate::state::TransactionStore;
use crate::{TokenType, Transaction, TransactionKind, Txid, ValidationError};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Token ancestors a transaction's validity rests on
fn token_parents<'a>(
    store: &'a TransactionStore,
    tx: &Transaction,
) -> Result<Vec<&'a Transaction>, ValidationError> {
    let Some(meta) = tx.slp.as_ref() else {
        return Ok(Vec::new());
    };
    let parents = match (meta.token_type, meta.transaction_kind) {
        (_, TransactionKind::Send) => lineage_inputs(store, tx, meta.lineage())?
            .into_iter()
            .map(|input| input.source)
            .collect(),
        (_, TransactionKind::Mint) => vec![baton_predecessor(store, tx, meta)?],
        (TokenType::Nft1Child, TransactionKind::Genesis) => match meta.nft_parent_group_id {
            Some(group) => lineage_inputs(store, tx, (TokenType::Nft1Parent, group))?
                .into_iter()
                .map(|input| input.source)
                .collect(),
            None => Vec::new(),
        },
        (_, TransactionKind::Genesis) => Vec::new(),
    };
    Ok(parents)
}

impl SlpValidator {
    /// Txids of the token DAG behind `txid`, breadth first from `txid` itself.
    ///
    /// Returns `None` unless `txid` validates. Pinned checkpoints are
    /// included but not expanded, as their history may have been pruned.
    pub fn graph_search(&mut self, txid: &Txid) -> Option<Vec<Txid>> {
        if !self.validate(txid) {
            return None;
        }

        let store = self.store();
        let cache = self.cache();
        let mut visited = HashSet::from([*txid]);
        let mut queue = VecDeque::from([store.get(txid)?]);
        let mut found = Vec::new();

        while let Some(tx) = queue.pop_front() {
            found.push(tx.id);
            if cache.is_pinned(&tx.id) {
                continue;
            }
            // a proven transaction may still lean on pruned parents
            let parents = match token_parents(store, tx) {
                Ok(parents) => parents,
                Err(e) => {
                    debug!("Graph search for {} stops at {}: {}", txid, tx.id, e);
                    continue;
                }
            };
            for parent in parents {
                if visited.insert(parent.id) {
                    queue.push_back(parent);
                }
            }
        }

        Some(found)
    }
}
