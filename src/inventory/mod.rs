//! Inventory service: product CRUD, quantity adjustment, and the
//! low-stock alert policy.
//!
//! This is the only layer that enforces product invariants; the store
//! and notifier are untrusted adapters. Quantity adjustment and partial
//! update are read-modify-write with a full-record overwrite: there is
//! no version token, and concurrent writers to the same record are
//! last-write-wins. That matches the upstream system this service
//! replaces and is deliberately preserved rather than upgraded to a
//! conditional write.

use std::sync::Arc;

use tracing::{info, warn};

use crate::notify::{Destination, Notifier, NotifyError};
use crate::product::{HistoryKind, Product, ProductDraft, ProductPatch};
use crate::store::{RecordStore, StoreError};

/// Result type for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Errors surfaced by inventory operations.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Product not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Product inventory service.
pub struct InventoryService {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// All products. Order is store-dependent; callers must not rely on it.
    pub async fn list_all(&self) -> Result<Vec<Product>> {
        Ok(self.store.scan().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Product> {
        self.store.get(id).await?.ok_or(InventoryError::NotFound)
    }

    /// Case-insensitive substring search over `name` and `sku`.
    ///
    /// A blank query returns no products, not all of them. This is a
    /// filter over a full scan, not an index.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let products = self.store.scan().await?;
        Ok(products
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.sku.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Products at or below their threshold, boundary inclusive.
    pub async fn list_low_stock(&self) -> Result<Vec<Product>> {
        let products = self.store.scan().await?;
        Ok(products.into_iter().filter(Product::is_low).collect())
    }

    pub async fn create(&self, draft: ProductDraft) -> Result<Product> {
        let product = Product::from_draft(draft);
        self.store.put(&product).await?;
        info!(id = %product.id, name = %product.name, "Created product");
        Ok(product)
    }

    /// Merge partial fields onto an existing record.
    ///
    /// Read-modify-write with no version check; the id is immutable.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        let mut product = self.get(id).await?;
        product.apply_patch(patch);
        self.store.put(&product).await?;
        Ok(product)
    }

    /// Apply a quantity delta, record history, and fire the low-stock
    /// alert when the result lands at or below the threshold.
    ///
    /// The trigger looks only at the post-adjustment quantity: repeated
    /// adjustments that stay below the threshold re-fire the alert
    /// every time. A delivery failure is logged but never fails the
    /// adjustment itself.
    pub async fn adjust_quantity(&self, id: &str, delta: i64) -> Result<Product> {
        let mut product = self.get(id).await?;

        product.qty = product.qty.saturating_add(delta).max(0);
        let kind = if delta > 0 {
            HistoryKind::Restock
        } else {
            HistoryKind::Sale
        };
        product.record_history(kind, delta);
        product.updated_at = crate::product::now_millis();
        self.store.put(&product).await?;

        if product.is_low() && product.auto_alert && product.contact.is_some() {
            match self.deliver_alert(&product).await {
                Ok(updated) => {
                    info!(id = %updated.id, qty = updated.qty, "Auto-alert sent");
                    product = updated;
                }
                Err(e) => {
                    warn!(id = %product.id, error = %e, "Failed to auto-send alert");
                }
            }
        }

        Ok(product)
    }

    /// Idempotent: succeeds whether or not the id exists.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        info!(id = %id, "Deleted product");
        Ok(())
    }

    /// Manually send a low-stock alert, regardless of threshold state.
    ///
    /// Unlike the automatic path, a delivery failure here propagates to
    /// the caller.
    pub async fn send_alert_for(&self, id: &str) -> Result<Product> {
        let product = self.get(id).await?;
        if product.contact.is_none() {
            return Err(InventoryError::Validation(
                "Product has no contact information".to_string(),
            ));
        }

        let updated = self.deliver_alert(&product).await?;
        info!(id = %updated.id, "Manual alert sent");
        Ok(updated)
    }

    /// Send the alert message and persist an `alert` history entry.
    ///
    /// Returns the persisted record. The caller's record is left
    /// untouched, so a failed delivery or persist never leaks an alert
    /// entry the store does not hold.
    async fn deliver_alert(&self, product: &Product) -> Result<Product> {
        let contact = product
            .contact
            .as_deref()
            .ok_or_else(|| InventoryError::Validation("Product has no contact".to_string()))?;
        let destination = Destination::from_contact(contact);

        let subject = format!("Low Stock: {}", product.name);
        let body = alert_body(product);
        self.notifier.send(&destination, &subject, &body).await?;

        let mut updated = product.clone();
        updated.record_history(HistoryKind::Alert, 0);
        updated.updated_at = crate::product::now_millis();
        self.store.put(&updated).await?;
        Ok(updated)
    }
}

/// Deterministic alert body: name, sku, current quantity, threshold.
fn alert_body(product: &Product) -> String {
    format!(
        "Low Stock Alert\n\nProduct: {}\nID: {}\nCurrent Qty: {}\nThreshold: {}\n\nPlease restock this item.",
        product.name, product.sku, product.qty, product.threshold
    )
}
