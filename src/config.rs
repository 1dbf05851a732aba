//! Configuration Module
//!
//! This module defines all configuration structures for the validator service.
//! Configuration is loaded from TOML files and parsed using serde.

use crate::Txid;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from a TOML file (e.g., config/default.toml). Only `[api]` is
/// required; the other sections fall back to their defaults.
///
/// # Example TOML
/// ```toml
/// [api]
/// host = "127.0.0.1"
/// port = 50051
///
/// [validator]
/// max_ancestors = 100000
/// cache_policy = "retain"
///
/// [store]
/// snapshot_path = "data/transactions.json"
///
/// [checkpoints]
/// valid_txids = []
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub checkpoints: CheckpointConfig,
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Validator tuning
///
/// # Fields
/// - `max_ancestors`: upper bound on transactions examined by one validation
///   pass; unset means unbounded
/// - `cache_policy`: what `remove_tx` does to cached validity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub max_ancestors: Option<usize>,
    #[serde(default)]
    pub cache_policy: CachePolicy,
}

/// Behaviour of the validity cache when a transaction leaves the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    /// Cached validity is append-only; removals never touch it.
    #[default]
    Retain,
    /// Removing a transaction evicts it and every cached descendant,
    /// except pinned checkpoints. Records validated without being stored
    /// are not cached.
    Cascade,
}

/// Transaction source
///
/// `snapshot_path` points at a JSON array of transaction records loaded
/// into the store at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

/// Known-valid roots seeded into the cache without re-walking history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckpointConfig {
    #[serde(default)]
    pub valid_txids: Vec<Txid>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [api]
            host = "127.0.0.1"
            port = 50051
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 50051);
        assert_eq!(config.validator.max_ancestors, None);
        assert_eq!(config.validator.cache_policy, CachePolicy::Retain);
        assert!(config.store.snapshot_path.is_none());
        assert!(config.checkpoints.valid_txids.is_empty());
    }

    #[test]
    fn test_full_config() {
        let txid = "00000000000000000000000000000000000000000000000000000000000000ff";
        let config = Config::parse(&format!(
            r#"
            [api]
            host = "0.0.0.0"
            port = 8080

            [validator]
            max_ancestors = 500
            cache_policy = "cascade"

            [store]
            snapshot_path = "data/txs.json"

            [checkpoints]
            valid_txids = ["{txid}"]
            "#
        ))
        .unwrap();

        assert_eq!(config.validator.max_ancestors, Some(500));
        assert_eq!(config.validator.cache_policy, CachePolicy::Cascade);
        assert_eq!(config.store.snapshot_path, Some(PathBuf::from("data/txs.json")));
        assert_eq!(config.checkpoints.valid_txids.len(), 1);
        assert_eq!(config.checkpoints.valid_txids[0].as_bytes()[0], 0xff);
    }

    #[test]
    fn test_unknown_cache_policy_is_rejected() {
        let result = Config::parse(
            r#"
            [api]
            host = "127.0.0.1"
            port = 1
            [validator]
            cache_policy = "sometimes"
            "#,
        );
        assert!(result.is_err());
    }
}
