use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 32-byte transaction identifier, stored in internal (hash) byte order.
///
/// The text form is the reversed "display" order used by block explorers,
/// so `Txid::from_str(&txid.to_string())` round-trips while the bytes held
/// here stay canonical.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Txid([u8; 32]);

impl Txid {
    pub const LEN: usize = 32;

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a txid written in display order.
    pub fn from_display_hex(s: &str) -> Result<Self, TxidParseError> {
        let decoded = hex::decode(s).map_err(|e| TxidParseError::InvalidHex(e.to_string()))?;
        if decoded.len() != Self::LEN {
            return Err(TxidParseError::InvalidLength(decoded.len()));
        }
        let mut bytes = [0u8; 32];
        for (dst, src) in bytes.iter_mut().zip(decoded.iter().rev()) {
            *dst = *src;
        }
        Ok(Self(bytes))
    }

    pub fn to_display_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl From<[u8; 32]> for Txid {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_hex())
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({})", self)
    }
}

impl FromStr for Txid {
    type Err = TxidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_display_hex(s)
    }
}

impl Serialize for Txid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_display_hex())
    }
}

impl<'de> Deserialize<'de> for Txid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_display_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxidParseError {
    #[error("invalid txid hex: {0}")]
    InvalidHex(String),
    #[error("invalid txid length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Reference to an output of a previous transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outpoint {
    pub txid: Txid,
    pub vout: u32,
}

impl Outpoint {
    pub fn new(txid: Txid, vout: u32) -> Self {
        Self { txid, vout }
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// Transaction output. `slp_quantity` is derived from the token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub value: u64,
    #[serde(with = "quantity_opt", skip_serializing_if = "Option::is_none")]
    pub slp_quantity: Option<u128>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Fungible,
    Nft1Child,
    Nft1Parent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Genesis,
    Mint,
    Send,
}

/// Token metadata carried by an SLP transaction.
///
/// Output 0 carries the metadata itself, so `output_quantities[i]` is
/// credited to output `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlpMetadata {
    pub token_type: TokenType,
    pub transaction_kind: TransactionKind,
    pub token_id: Txid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint_baton_vout: Option<u32>,
    #[serde(with = "quantity_vec")]
    pub output_quantities: Vec<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_parent_group_id: Option<Txid>,
}

impl SlpMetadata {
    /// Token units credited to output `vout`
    pub fn quantity_at(&self, vout: u32) -> u128 {
        match vout.checked_sub(1) {
            Some(i) => self.output_quantities.get(i as usize).copied().unwrap_or(0),
            None => 0,
        }
    }

    /// Sum of declared output quantities, `None` on overflow
    pub fn total_output(&self) -> Option<u128> {
        self.output_quantities
            .iter()
            .try_fold(0u128, |acc, q| acc.checked_add(*q))
    }

    /// Lineage key: two transactions belong to the same token iff both match
    pub fn lineage(&self) -> (TokenType, Txid) {
        (self.token_type, self.token_id)
    }
}

/// Parsed, immutable view of one ledger transaction's token-relevant fields.
///
/// Serializes through `TransactionRecord`, the same shape it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TransactionRecord", into = "TransactionRecord")]
pub struct Transaction {
    pub id: Txid,
    pub inputs: Vec<Outpoint>,
    pub outputs: Vec<Output>,
    pub slp: Option<SlpMetadata>,
}

impl Transaction {
    /// Build a record from output values, crediting token quantities from
    /// the metadata onto the outputs they belong to.
    pub fn new(
        id: Txid,
        inputs: Vec<Outpoint>,
        output_values: Vec<u64>,
        slp: Option<SlpMetadata>,
    ) -> Self {
        let outputs = output_values
            .into_iter()
            .enumerate()
            .map(|(vout, value)| {
                let slp_quantity = slp.as_ref().and_then(|meta| {
                    let vout = vout as u32;
                    (vout >= 1 && (vout as usize) <= meta.output_quantities.len())
                        .then(|| meta.quantity_at(vout))
                });
                Output { value, slp_quantity }
            })
            .collect();

        Self { id, inputs, outputs, slp }
    }

    /// Token units held by output `vout` (zero for non-token transactions)
    pub fn token_quantity(&self, vout: u32) -> u128 {
        self.slp.as_ref().map_or(0, |meta| meta.quantity_at(vout))
    }

    pub fn is_token(&self) -> bool {
        self.slp.is_some()
    }
}

/// Wire form of a transaction as delivered by the ingester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Txid,
    #[serde(default)]
    pub inputs: Vec<Outpoint>,
    #[serde(default)]
    pub output_values: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slp: Option<SlpMetadata>,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        Transaction::new(record.id, record.inputs, record.output_values, record.slp)
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(tx: Transaction) -> Self {
        TransactionRecord {
            id: tx.id,
            inputs: tx.inputs,
            output_values: tx.outputs.iter().map(|output| output.value).collect(),
            slp: tx.slp,
        }
    }
}

/// Reasons a transaction is not currently provably valid.
///
/// All of them collapse to `false` at the public `validate` surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("transaction {0} is not in the store")]
    UnknownTransaction(Txid),
    #[error("transaction {0} carries no token metadata")]
    NotAToken(Txid),
    #[error("ancestor {ancestor} of {txid} is not in the store")]
    MissingAncestor { txid: Txid, ancestor: Txid },
    #[error("cycle detected at {0}")]
    CycleDetected(Txid),
    #[error("structural mismatch in {txid}: {reason}")]
    StructuralMismatch { txid: Txid, reason: &'static str },
    #[error("conservation violated in {txid}: outputs {outputs} exceed inputs {inputs}")]
    ConservationViolation { txid: Txid, inputs: u128, outputs: u128 },
    #[error("nft child genesis {txid} consumed {consumed} parent units, expected exactly 1")]
    ParentUnitMismatch { txid: Txid, consumed: u128 },
    #[error("ancestor limit of {limit} exceeded while validating {txid}")]
    AncestorLimitExceeded { txid: Txid, limit: usize },
}

impl ValidationError {
    pub fn structural(txid: Txid, reason: &'static str) -> Self {
        ValidationError::StructuralMismatch { txid, reason }
    }

    /// Missing ancestors may be ingested later; every other failure is final
    /// for the current store contents.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ValidationError::UnknownTransaction(_)
                | ValidationError::MissingAncestor { .. }
                | ValidationError::AncestorLimitExceeded { .. }
        )
    }
}

/// Token quantities travel as decimal strings so u128 survives JSON.
mod quantity_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[u128], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u128>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| s.parse::<u128>().map_err(serde::de::Error::custom))
            .collect()
    }
}

mod quantity_opt {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }
}
