//! Snapshot Loader Module
//! 
//! Reads a JSON array of transaction records written by the indexer and
//! adds every record to the validator's store. Records are only ingested,
//! never validated here.

use crate::config::{CheckpointConfig, StoreConfig};
use crate::state::SharedValidator;
use crate::Transaction;
use anyhow::Context;
use std::fs;
use tracing::{debug, info};

/// Loads transaction snapshots into the store
pub struct SnapshotLoader {
    /// Snapshot location
    config: StoreConfig,
}

impl SnapshotLoader {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Read and parse the configured snapshot
    ///
    /// # Returns
    /// The records in file order, or an empty list when no snapshot is configured
    pub fn load(&self) -> anyhow::Result<Vec<Transaction>> {
        let Some(path) = &self.config.snapshot_path else {
            return Ok(Vec::new());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        parse_snapshot(&content).with_context(|| format!("parsing snapshot {}", path.display()))
    }

    /// Add every snapshot record to the validator's store
    ///
    /// # Returns
    /// The number of records that changed the store
    pub async fn ingest(&self, validator: &SharedValidator) -> anyhow::Result<usize> {
        let transactions = self.load()?;
        let total = transactions.len();
        let mut added = 0;

        for tx in transactions {
            let txid = tx.id;
            if validator.add_tx(tx).await {
                added += 1;
            } else {
                debug!("Snapshot record {} already present", txid);
            }
        }

        info!("Ingested {} of {} snapshot transactions", added, total);
        Ok(added)
    }
}

pub(crate) fn parse_snapshot(content: &str) -> anyhow::Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = serde_json::from_str(content)?;
    Ok(transactions)
}

/// Pin every configured checkpoint as valid
///
/// # Returns
/// The number of checkpoints that were not already known valid
pub async fn seed_checkpoints(config: &CheckpointConfig, validator: &SharedValidator) -> usize {
    let mut seeded = 0;
    for txid in &config.valid_txids {
        if validator.add_valid_txid(*txid).await {
            seeded += 1;
        }
    }
    if seeded > 0 {
        info!("Seeded {} checkpoints", seeded);
    }
    seeded
}
