//! Mint chain reconstruction.
//!
//! A MINT is authorized by spending the mint baton of the previous GENESIS
//! or MINT of its token. Following only that one input per step gives a
//! single chain back to the GENESIS, walked in a loop rather than by
//! recursion so adversarially long chains cannot exhaust the call stack.

use super::rules;
use crate::state::TransactionStore;
use crate::{SlpMetadata, Transaction, TransactionKind, Txid, ValidationError};
use std::collections::HashSet;

/// The transaction whose mint baton `tx` spends.
///
/// Exactly one distinct predecessor may qualify. Several candidates are
/// treated as malformed rather than picking one.
pub(crate) fn baton_predecessor<'a>(
    store: &'a TransactionStore,
    tx: &Transaction,
    meta: &SlpMetadata,
) -> Result<&'a Transaction, ValidationError> {
    let mut found: Option<&'a Transaction> = None;
    let mut missing = None;

    for input in &tx.inputs {
        let Some(source) = store.get(&input.txid) else {
            missing.get_or_insert(input.txid);
            continue;
        };
        let Some(source_meta) = source.slp.as_ref() else {
            continue;
        };
        let carries_baton = source_meta.lineage() == meta.lineage()
            && matches!(
                source_meta.transaction_kind,
                TransactionKind::Genesis | TransactionKind::Mint
            )
            && source_meta.mint_baton_vout == Some(input.vout);
        if !carries_baton {
            continue;
        }
        if found.is_some_and(|previous| previous.id != source.id) {
            return Err(ValidationError::structural(tx.id, "more than one mint baton spent"));
        }
        found = Some(source);
    }

    match (found, missing) {
        (Some(source), _) => Ok(source),
        (None, Some(ancestor)) => Err(ValidationError::MissingAncestor {
            txid: tx.id,
            ancestor,
        }),
        (None, None) => Err(ValidationError::structural(tx.id, "no mint baton spent")),
    }
}

/// Follow the baton chain from `start` back to its GENESIS, or to the first
/// predecessor `anchored` accepts as already proven.
///
/// Every visited transaction goes into `seen` and `mints`; on success
/// `mints` is ordered oldest first and excludes the anchor. On failure
/// `mints` holds the partial walk, newest first.
pub(crate) fn walk_chain<'a>(
    store: &'a TransactionStore,
    start: &'a Transaction,
    seen: &mut HashSet<Txid>,
    mints: &mut Vec<&'a Transaction>,
    limit: Option<usize>,
    mut anchored: impl FnMut(&Txid) -> bool,
) -> Result<(), ValidationError> {
    let mut current = start;

    loop {
        if !seen.insert(current.id) {
            return Err(ValidationError::CycleDetected(current.id));
        }
        if let Some(limit) = limit {
            if mints.len() >= limit {
                return Err(ValidationError::AncestorLimitExceeded { txid: start.id, limit });
            }
        }

        let meta = current
            .slp
            .as_ref()
            .ok_or(ValidationError::NotAToken(current.id))?;
        rules::check_structure(current, meta)?;
        mints.push(current);

        match meta.transaction_kind {
            TransactionKind::Genesis => {
                mints.reverse();
                return Ok(());
            }
            TransactionKind::Mint => {
                current = baton_predecessor(store, current, meta)?;
                if anchored(&current.id) {
                    mints.reverse();
                    return Ok(());
                }
            }
            TransactionKind::Send => {
                return Err(ValidationError::structural(current.id, "send inside a mint chain"));
            }
        }
    }
}
