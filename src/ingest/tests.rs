//! Tests for snapshot and checkpoint ingestion

#[cfg(test)]
mod tests {
    use crate::{
        config::{CheckpointConfig, StoreConfig},
        ingest::{loader::parse_snapshot, seed_checkpoints, SnapshotLoader},
        SharedValidator, SlpValidator, TokenType, TransactionKind, Txid,
    };

    const GENESIS: &str = "1111111111111111111111111111111111111111111111111111111111111111";
    const SEND: &str = "2222222222222222222222222222222222222222222222222222222222222222";

    fn snapshot() -> String {
        format!(
            r#"[
                {{
                    "id": "{GENESIS}",
                    "output_values": [0, 546, 546],
                    "slp": {{
                        "token_type": "FUNGIBLE",
                        "transaction_kind": "GENESIS",
                        "token_id": "{GENESIS}",
                        "mint_baton_vout": 2,
                        "output_quantities": ["340282366920938463463374607431768211455"]
                    }}
                }},
                {{
                    "id": "{SEND}",
                    "inputs": [{{ "txid": "{GENESIS}", "vout": 1 }}],
                    "output_values": [0, 546],
                    "slp": {{
                        "token_type": "FUNGIBLE",
                        "transaction_kind": "SEND",
                        "token_id": "{GENESIS}",
                        "output_quantities": ["340282366920938463463374607431768211455"]
                    }}
                }}
            ]"#
        )
    }

    #[test]
    fn test_parse_snapshot_records() {
        let txs = parse_snapshot(&snapshot()).unwrap();

        assert_eq!(txs.len(), 2);
        let genesis = &txs[0];
        let meta = genesis.slp.as_ref().unwrap();
        assert_eq!(meta.token_type, TokenType::Fungible);
        assert_eq!(meta.transaction_kind, TransactionKind::Genesis);
        assert_eq!(meta.mint_baton_vout, Some(2));
        // u128::MAX survives the string encoding
        assert_eq!(genesis.outputs[1].slp_quantity, Some(u128::MAX));
        assert_eq!(genesis.outputs[2].slp_quantity, None);
        assert_eq!(txs[1].inputs[0].txid, GENESIS.parse::<Txid>().unwrap());
    }

    #[test]
    fn test_parse_snapshot_rejects_bad_quantity() {
        let bad = snapshot().replace("340282366920938463463374607431768211455", "-1");
        assert!(parse_snapshot(&bad).is_err());
    }

    #[test]
    fn test_serialized_records_parse_back() {
        let txs = parse_snapshot(&snapshot()).unwrap();

        // written in the snapshot shape, so a dump can be reloaded as is
        let dumped = serde_json::to_string(&txs).unwrap();
        assert!(dumped.contains("output_values"));
        let reloaded = parse_snapshot(&dumped).unwrap();
        assert_eq!(reloaded, txs);
        assert_eq!(reloaded[0].outputs.len(), 3);

        let mut validator = SlpValidator::default();
        for tx in reloaded {
            validator.add_tx(tx);
        }
        assert!(validator.validate(&SEND.parse::<Txid>().unwrap()));
    }

    #[tokio::test]
    async fn test_ingest_and_validate_snapshot() {
        let path = std::env::temp_dir().join(format!("slp-snapshot-{}.json", std::process::id()));
        std::fs::write(&path, snapshot()).unwrap();

        let validator = SharedValidator::new(SlpValidator::default());
        let loader = SnapshotLoader::new(StoreConfig {
            snapshot_path: Some(path.clone()),
        });

        assert_eq!(loader.ingest(&validator).await.unwrap(), 2);
        // a second ingest changes nothing
        assert_eq!(loader.ingest(&validator).await.unwrap(), 0);
        assert!(validator.validate(&SEND.parse().unwrap()).await);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let loader = SnapshotLoader::new(StoreConfig {
            snapshot_path: Some("/nonexistent/slp-snapshot.json".into()),
        });
        assert!(loader.load().is_err());

        let unconfigured = SnapshotLoader::new(StoreConfig::default());
        assert!(unconfigured.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_checkpoints() {
        let validator = SharedValidator::new(SlpValidator::default());
        let config = CheckpointConfig {
            valid_txids: vec![GENESIS.parse().unwrap(), GENESIS.parse().unwrap()],
        };

        assert_eq!(seed_checkpoints(&config, &validator).await, 1);
    }
}
