//! Per-token-type rules.
//!
//! `check_structure` enforces what a transaction must look like on its own;
//! the rule families below decide what must hold about its ancestry. The
//! pass driver calls `dispatch` once every prerequisite ancestor is proven.

use super::conservation::{input_total, ValidationPass};
use crate::{SlpMetadata, TokenType, Transaction, TransactionKind, ValidationError};

/// Shape checks that need nothing but the transaction itself.
pub(crate) fn check_structure(tx: &Transaction, meta: &SlpMetadata) -> Result<(), ValidationError> {
    let fail = |reason| Err(ValidationError::structural(tx.id, reason));

    // output 0 carries the metadata, quantities start at output 1
    let credited = meta.output_quantities.len();
    if credited > 0 && credited >= tx.outputs.len() {
        return fail("token quantity credited to a missing output");
    }
    if let Some(baton) = meta.mint_baton_vout {
        let baton = baton as usize;
        if baton == 0 {
            return fail("mint baton on the metadata output");
        }
        if baton <= credited {
            return fail("mint baton on a token output");
        }
        if baton >= tx.outputs.len() {
            return fail("mint baton on a missing output");
        }
    }
    let Some(total) = meta.total_output() else {
        return fail("output quantity overflow");
    };

    match (meta.token_type, meta.transaction_kind) {
        (token_type, TransactionKind::Genesis) => {
            if meta.token_id != tx.id {
                return fail("genesis token id differs from its txid");
            }
            if token_type == TokenType::Nft1Child {
                if meta.nft_parent_group_id.is_none() {
                    return fail("nft child genesis without a parent group");
                }
                if meta.mint_baton_vout.is_some() {
                    return fail("nft child genesis with a mint baton");
                }
                if total != 1 {
                    return fail("nft child genesis must create exactly one unit");
                }
            } else if meta.nft_parent_group_id.is_some() {
                return fail("parent group on a non-child genesis");
            }
        }
        (TokenType::Nft1Child, TransactionKind::Mint) => {
            return fail("nft child tokens cannot be minted");
        }
        (_, TransactionKind::Mint) => {
            if meta.nft_parent_group_id.is_some() {
                return fail("parent group on a mint");
            }
        }
        (_, TransactionKind::Send) => {
            if meta.mint_baton_vout.is_some() {
                return fail("send carries a mint baton");
            }
            if meta.nft_parent_group_id.is_some() {
                return fail("parent group on a send");
            }
        }
    }

    Ok(())
}

impl<'a> ValidationPass<'a> {
    pub(crate) fn dispatch(&mut self, tx: &'a Transaction) -> Result<(), ValidationError> {
        let meta = tx.slp.as_ref().ok_or(ValidationError::NotAToken(tx.id))?;
        match meta.token_type {
            TokenType::Fungible => self.validate_token_type1(tx, meta),
            TokenType::Nft1Child => self.validate_token_nft1_child(tx, meta),
            TokenType::Nft1Parent => self.validate_token_nft1_parent(tx, meta),
        }
    }

    pub(crate) fn validate_token_type1(
        &mut self,
        tx: &'a Transaction,
        meta: &SlpMetadata,
    ) -> Result<(), ValidationError> {
        match meta.transaction_kind {
            // a well-formed genesis is the root of trust for its token
            TransactionKind::Genesis => Ok(()),
            TransactionKind::Mint => self.check_mint_chain(tx),
            TransactionKind::Send => self.check_outputs_valid(tx, meta),
        }
    }

    pub(crate) fn validate_token_nft1_child(
        &mut self,
        tx: &'a Transaction,
        meta: &SlpMetadata,
    ) -> Result<(), ValidationError> {
        match meta.transaction_kind {
            TransactionKind::Genesis => self.nft1_child_genesis_validity_check(tx, meta),
            TransactionKind::Mint => Err(ValidationError::structural(
                tx.id,
                "nft child tokens cannot be minted",
            )),
            TransactionKind::Send => self.check_outputs_valid(tx, meta),
        }
    }

    /// Group tokens follow the fungible rules; their genesis id is what
    /// children name as `nft_parent_group_id`.
    pub(crate) fn validate_token_nft1_parent(
        &mut self,
        tx: &'a Transaction,
        meta: &SlpMetadata,
    ) -> Result<(), ValidationError> {
        self.validate_token_type1(tx, meta)
    }

    /// A child genesis must burn exactly one unit of its parent group token,
    /// taken from proven NFT1 parent outputs.
    pub(crate) fn nft1_child_genesis_validity_check(
        &mut self,
        tx: &Transaction,
        meta: &SlpMetadata,
    ) -> Result<(), ValidationError> {
        let group = meta
            .nft_parent_group_id
            .ok_or(ValidationError::structural(tx.id, "nft child genesis without a parent group"))?;

        let inputs = self.lineage_inputs(tx, (TokenType::Nft1Parent, group))?;
        if inputs.is_empty() {
            return Err(ValidationError::structural(tx.id, "no parent group input spent"));
        }

        let consumed = input_total(tx.id, &inputs)?;
        if consumed != 1 {
            return Err(ValidationError::ParentUnitMismatch { txid: tx.id, consumed });
        }
        Ok(())
    }
}
