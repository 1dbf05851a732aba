//! This crate validates transactions of the SLP overlay token protocol.
//! It includes modules for data types, the transaction store and validity cache,
//! the recursive validator, transaction ingestion, the JSON-RPC front end,
//! and configuration.

pub mod types; // Transaction records, token metadata and the failure taxonomy.
pub mod state; // Transaction store, validity cache and the shared validator handle.
pub mod validation; // Recursive SLP validation with memoization.
pub mod ingest; // Loads transaction snapshots and checkpoints into the validator.
pub mod api; // JSON-RPC interface over the validator.
pub mod config; // Defines and loads service configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use state::SharedValidator;
pub use validation::SlpValidator;
