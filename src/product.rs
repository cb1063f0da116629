//! Product record and embedded adjustment history.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of history entries retained per product.
///
/// History is embedded in the product record, so unbounded growth would
/// eventually exceed the store's item size limit. Oldest entries are
/// dropped past this cap.
pub const HISTORY_CAP: usize = 200;

/// Kind of event recorded in a product's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// Quantity increased (positive delta).
    Restock,
    /// Quantity decreased (zero or negative delta).
    Sale,
    /// A low-stock notification was sent.
    Alert,
}

/// One entry in a product's adjustment history, newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    /// Signed quantity delta; 0 for alert entries.
    pub qty_change: i64,
    /// Event timestamp, epoch milliseconds.
    pub ts: i64,
}

/// An inventory product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier, assigned at creation, immutable.
    pub id: String,
    pub name: String,
    /// Stock-keeping unit; not guaranteed unique.
    pub sku: String,
    /// On-hand quantity, floor-clamped at 0 on adjustment.
    pub qty: i64,
    /// Inclusive low-stock boundary: the product is low iff `qty <= threshold`.
    pub threshold: i64,
    /// Phone number or email address; email iff it contains `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Whether quantity adjustments trigger automatic low-stock alerts.
    #[serde(default)]
    pub auto_alert: bool,
    /// Adjustment history, newest entry first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Creation timestamp, epoch milliseconds.
    pub created_at: i64,
    /// Refreshed on every mutation, epoch milliseconds.
    pub updated_at: i64,
}

/// Fields accepted when creating a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDraft {
    pub name: String,
    pub sku: String,
    pub qty: i64,
    pub threshold: i64,
    pub contact: Option<String>,
    pub auto_alert: bool,
}

/// Partial update of product fields. Absent fields are left untouched;
/// the id is never updatable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub qty: Option<i64>,
    pub threshold: Option<i64>,
    pub contact: Option<String>,
    pub auto_alert: Option<bool>,
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a new product id.
pub fn new_product_id() -> String {
    format!("p{}", Uuid::new_v4().simple())
}

impl Product {
    /// Build a fresh product from creation fields.
    pub fn from_draft(draft: ProductDraft) -> Self {
        let now = now_millis();
        Self {
            id: new_product_id(),
            name: draft.name,
            sku: draft.sku,
            qty: draft.qty.max(0),
            threshold: draft.threshold,
            contact: draft.contact.filter(|c| !c.is_empty()),
            auto_alert: draft.auto_alert,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A product is low iff `qty <= threshold`, boundary inclusive.
    pub fn is_low(&self) -> bool {
        self.qty <= self.threshold
    }

    /// Merge a partial update onto this record and refresh `updated_at`.
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(sku) = patch.sku {
            self.sku = sku;
        }
        if let Some(qty) = patch.qty {
            self.qty = qty.max(0);
        }
        if let Some(threshold) = patch.threshold {
            self.threshold = threshold;
        }
        if let Some(contact) = patch.contact {
            self.contact = if contact.is_empty() {
                None
            } else {
                Some(contact)
            };
        }
        if let Some(auto_alert) = patch.auto_alert {
            self.auto_alert = auto_alert;
        }
        self.updated_at = now_millis();
    }

    /// Prepend a history entry, dropping the oldest past [`HISTORY_CAP`].
    pub fn record_history(&mut self, kind: HistoryKind, qty_change: i64) {
        self.history.insert(
            0,
            HistoryEntry {
                kind,
                qty_change,
                ts: now_millis(),
            },
        );
        self.history.truncate(HISTORY_CAP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        Product::from_draft(ProductDraft {
            name: "Mug".to_string(),
            sku: "MUG-RD-1".to_string(),
            qty: 12,
            threshold: 10,
            contact: Some("owner@example.com".to_string()),
            auto_alert: true,
        })
    }

    #[test]
    fn test_is_low_boundary_inclusive() {
        let mut p = sample();
        p.qty = 11;
        assert!(!p.is_low());
        p.qty = 10;
        assert!(p.is_low());
        p.qty = 0;
        assert!(p.is_low());
    }

    #[test]
    fn test_draft_clamps_negative_qty() {
        let p = Product::from_draft(ProductDraft {
            qty: -5,
            ..ProductDraft::default()
        });
        assert_eq!(p.qty, 0);
    }

    #[test]
    fn test_patch_preserves_unset_fields() {
        let mut p = sample();
        let created_at = p.created_at;
        p.apply_patch(ProductPatch {
            threshold: Some(3),
            ..ProductPatch::default()
        });
        assert_eq!(p.threshold, 3);
        assert_eq!(p.name, "Mug");
        assert_eq!(p.qty, 12);
        assert_eq!(p.created_at, created_at);
    }

    #[test]
    fn test_patch_empty_contact_clears() {
        let mut p = sample();
        p.apply_patch(ProductPatch {
            contact: Some(String::new()),
            ..ProductPatch::default()
        });
        assert!(p.contact.is_none());
    }

    #[test]
    fn test_history_prepended_and_capped() {
        let mut p = sample();
        for i in 0..(HISTORY_CAP as i64 + 5) {
            p.record_history(HistoryKind::Sale, -i);
        }
        assert_eq!(p.history.len(), HISTORY_CAP);
        // Newest entry first.
        assert_eq!(p.history[0].qty_change, -(HISTORY_CAP as i64 + 4));
    }

    #[test]
    fn test_json_field_names() {
        let p = sample();
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("autoAlert").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("auto_alert").is_none());
    }

    #[test]
    fn test_history_entry_wire_format() {
        let entry = HistoryEntry {
            kind: HistoryKind::Restock,
            qty_change: 5,
            ts: 1700000000000,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "restock");
        assert_eq!(json["qtyChange"], 5);
    }

    #[test]
    fn test_product_ids_unique_and_prefixed() {
        let a = new_product_id();
        let b = new_product_id();
        assert!(a.starts_with('p'));
        assert_ne!(a, b);
    }
}
