//! Record store implementations.
//!
//! This module contains:
//! - `RecordStore` trait: keyed get/put/scan/delete over product records
//! - Implementations: DynamoDB, in-memory, and a two-tier cached store

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{StorageConfig, StorageType};
use crate::product::Product;

pub mod dynamo;
pub mod memory;
pub mod tiered;

pub use dynamo::DynamoRecordStore;
pub use memory::MemoryRecordStore;
pub use tiered::TieredRecordStore;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Record serialization error: {0}")]
    Serde(String),
}

/// Keyed persistence for product records.
///
/// `put` is a full-record overwrite with no optimistic concurrency
/// token; concurrent writers to the same record are last-write-wins at
/// record granularity. Callers doing read-modify-write inherit that
/// race.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record by id. `Ok(None)` when absent.
    async fn get(&self, id: &str) -> Result<Option<Product>>;

    /// Write a record, overwriting any existing record with the same id.
    async fn put(&self, product: &Product) -> Result<()>;

    /// Read every record in the table. Order is store-dependent.
    async fn scan(&self) -> Result<Vec<Product>>;

    /// Remove a record. Succeeds even when the id is absent.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Initialize a record store based on configuration.
///
/// With `cache` enabled, the remote store is wrapped in a two-tier
/// store that falls back to an in-memory cache on backend failure.
pub async fn init_store(config: &StorageConfig) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.storage_type {
        StorageType::Memory => {
            info!("Storage: in-memory");
            Arc::new(MemoryRecordStore::new())
        }
        StorageType::Dynamo => {
            info!(table = %config.dynamo.table, "Storage: DynamoDB");
            Arc::new(DynamoRecordStore::new(&config.dynamo).await)
        }
    };

    if config.cache {
        info!("Storage cache enabled (remote-first, fallback on failure)");
        Ok(Arc::new(TieredRecordStore::new(
            store,
            Arc::new(MemoryRecordStore::new()),
        )))
    } else {
        Ok(store)
    }
}
