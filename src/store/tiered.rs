//! Two-tier record store: remote primary with a local fallback cache.
//!
//! Reads hit the primary first and fall back to the cache only when the
//! primary reports a backend failure; successful reads refresh the
//! cache. Writes go to the primary and are mirrored to the cache on
//! success, so the cache never holds a write the primary rejected.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{RecordStore, Result, StoreError};
use crate::product::Product;

/// Remote-first record store with fallback-on-failure reads.
pub struct TieredRecordStore {
    primary: Arc<dyn RecordStore>,
    cache: Arc<dyn RecordStore>,
}

impl TieredRecordStore {
    pub fn new(primary: Arc<dyn RecordStore>, cache: Arc<dyn RecordStore>) -> Self {
        Self { primary, cache }
    }
}

#[async_trait]
impl RecordStore for TieredRecordStore {
    async fn get(&self, id: &str) -> Result<Option<Product>> {
        match self.primary.get(id).await {
            Ok(found) => {
                if let Some(ref product) = found {
                    // Cache refresh is best-effort.
                    let _ = self.cache.put(product).await;
                }
                Ok(found)
            }
            Err(StoreError::Backend(msg)) => {
                warn!(id = %id, error = %msg, "Primary store read failed, serving from cache");
                self.cache.get(id).await
            }
            Err(e) => Err(e),
        }
    }

    async fn put(&self, product: &Product) -> Result<()> {
        self.primary.put(product).await?;
        let _ = self.cache.put(product).await;
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Product>> {
        match self.primary.scan().await {
            Ok(products) => {
                for product in &products {
                    let _ = self.cache.put(product).await;
                }
                Ok(products)
            }
            Err(StoreError::Backend(msg)) => {
                warn!(error = %msg, "Primary store scan failed, serving from cache");
                self.cache.scan().await
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.primary.delete(id).await?;
        let _ = self.cache.delete(id).await;
        Ok(())
    }
}
