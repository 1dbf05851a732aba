//! Ingestion Module
//! 
//! This module feeds the validator from its external sources:
//! - Transaction snapshots produced by the ledger indexer
//! - Checkpoints: txids trusted as valid without re-walking their history

mod loader;

#[cfg(test)]
mod tests;

pub use loader::{seed_checkpoints, SnapshotLoader};
