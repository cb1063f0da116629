//! In-memory record store for local mode and testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, Result, StoreError};
use crate::product::Product;

/// In-memory record store backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, Product>>,
    fail: RwLock<bool>,
    put_quota: RwLock<Option<u32>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail, to exercise fallback and
    /// error-propagation paths in tests.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Allow `allowed` more successful puts, then fail further puts.
    /// Reads and deletes are unaffected.
    pub async fn set_fail_after_puts(&self, allowed: u32) {
        *self.put_quota.write().await = Some(allowed);
    }

    async fn check_fail(&self) -> Result<()> {
        if *self.fail.read().await {
            return Err(StoreError::Backend("simulated backend failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, id: &str) -> Result<Option<Product>> {
        self.check_fail().await?;
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn put(&self, product: &Product) -> Result<()> {
        self.check_fail().await?;
        {
            let mut quota = self.put_quota.write().await;
            if let Some(remaining) = quota.as_mut() {
                if *remaining == 0 {
                    return Err(StoreError::Backend(
                        "simulated backend failure".to_string(),
                    ));
                }
                *remaining -= 1;
            }
        }
        self.records
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Product>> {
        self.check_fail().await?;
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_fail().await?;
        self.records.write().await.remove(id);
        Ok(())
    }
}
