use crate::validation::{SlpValidator, ValidatorStats};
use crate::{Transaction, Txid, ValidationError};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Validator handle shared across request handlers.
///
/// A single lock guards the store and the cache together. Validation takes
/// the write lock for the whole pass, so concurrent requests over overlapping
/// ancestries are serialized and each pass keeps its own `seen` tracking.
#[derive(Clone)]
pub struct SharedValidator {
    inner: Arc<RwLock<SlpValidator>>,
}

impl SharedValidator {
    pub fn new(validator: SlpValidator) -> Self {
        Self {
            inner: Arc::new(RwLock::new(validator)),
        }
    }

    pub async fn validate(&self, txid: &Txid) -> bool {
        self.inner.write().await.validate(txid)
    }

    pub async fn try_validate(&self, txid: &Txid) -> Result<(), ValidationError> {
        self.inner.write().await.try_validate(txid)
    }

    pub async fn graph_search(&self, txid: &Txid) -> Option<Vec<Txid>> {
        self.inner.write().await.graph_search(txid)
    }

    pub async fn add_tx(&self, tx: Transaction) -> bool {
        self.inner.write().await.add_tx(tx)
    }

    pub async fn remove_tx(&self, txid: &Txid) -> bool {
        self.inner.write().await.remove_tx(txid)
    }

    pub async fn add_valid_txid(&self, txid: Txid) -> bool {
        self.inner.write().await.add_valid_txid(txid)
    }

    pub async fn stats(&self) -> ValidatorStats {
        self.inner.read().await.stats().clone()
    }
}
