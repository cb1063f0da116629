//! Inventory service behavior tests against the in-memory store and
//! mock notifier.

use std::sync::Arc;

use stockroom::inventory::{InventoryError, InventoryService};
use stockroom::notify::{Destination, MockNotifier};
use stockroom::product::{HistoryKind, ProductDraft, ProductPatch};
use stockroom::store::{MemoryRecordStore, RecordStore};

struct Harness {
    store: Arc<MemoryRecordStore>,
    notifier: Arc<MockNotifier>,
    service: InventoryService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryRecordStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = InventoryService::new(store.clone(), notifier.clone());
    Harness {
        store,
        notifier,
        service,
    }
}

fn mug_draft() -> ProductDraft {
    ProductDraft {
        name: "Red Mug".to_string(),
        sku: "MUG-RD-1".to_string(),
        qty: 12,
        threshold: 10,
        contact: Some("owner@example.com".to_string()),
        auto_alert: true,
    }
}

#[tokio::test]
async fn test_create_assigns_id_and_empty_history() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    assert!(product.id.starts_with('p'));
    assert!(product.history.is_empty());
    assert_eq!(product.created_at, product.updated_at);

    let stored = h.service.get(&product.id).await.unwrap();
    assert_eq!(stored, product);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let h = harness();
    assert!(matches!(
        h.service.get("missing").await,
        Err(InventoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_adjust_applies_delta() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    let adjusted = h.service.adjust_quantity(&product.id, 3).await.unwrap();
    assert_eq!(adjusted.qty, 15);
}

#[tokio::test]
async fn test_adjust_clamps_at_zero() {
    let h = harness();
    // Alerting off so the history holds only the sale entry.
    let product = h
        .service
        .create(ProductDraft {
            auto_alert: false,
            ..mug_draft()
        })
        .await
        .unwrap();

    let adjusted = h.service.adjust_quantity(&product.id, -50).await.unwrap();
    assert_eq!(adjusted.qty, 0);
    // The raw delta is recorded even when the quantity clamps.
    assert_eq!(adjusted.history[0].qty_change, -50);
}

#[tokio::test]
async fn test_adjust_saturates_on_extreme_deltas() {
    let h = harness();
    let product = h
        .service
        .create(ProductDraft {
            auto_alert: false,
            ..mug_draft()
        })
        .await
        .unwrap();

    // An extreme positive delta saturates instead of overflowing.
    let adjusted = h
        .service
        .adjust_quantity(&product.id, i64::MAX)
        .await
        .unwrap();
    assert_eq!(adjusted.qty, i64::MAX);

    // An extreme negative delta still clamps at zero.
    let adjusted = h
        .service
        .adjust_quantity(&product.id, i64::MIN)
        .await
        .unwrap();
    assert_eq!(adjusted.qty, 0);
}

#[tokio::test]
async fn test_adjust_missing_is_not_found() {
    let h = harness();
    assert!(matches!(
        h.service.adjust_quantity("missing", 1).await,
        Err(InventoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_history_newest_first() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    h.service.adjust_quantity(&product.id, 5).await.unwrap();
    h.service.adjust_quantity(&product.id, 4).await.unwrap();
    let latest = h.service.adjust_quantity(&product.id, 3).await.unwrap();

    assert_eq!(latest.history.len(), 3);
    assert_eq!(latest.history[0].qty_change, 3);
    assert_eq!(latest.history[2].qty_change, 5);
    assert!(latest
        .history
        .iter()
        .all(|entry| entry.kind == HistoryKind::Restock));
}

#[tokio::test]
async fn test_negative_delta_recorded_as_sale() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    let adjusted = h.service.adjust_quantity(&product.id, -1).await.unwrap();
    assert_eq!(adjusted.history[0].kind, HistoryKind::Sale);
}

#[tokio::test]
async fn test_crossing_fires_alert_once() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    // qty 12 -> 7, at or below threshold 10.
    let adjusted = h.service.adjust_quantity(&product.id, -5).await.unwrap();
    assert_eq!(adjusted.qty, 7);

    let sent = h.notifier.take_sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Low Stock: Red Mug");
    assert_eq!(
        sent[0].destination,
        Destination::Email("owner@example.com".to_string())
    );
    assert!(sent[0].body.contains("Current Qty: 7"));

    // An alert entry is appended in front of the sale entry.
    assert_eq!(adjusted.history[0].kind, HistoryKind::Alert);
    assert_eq!(adjusted.history[0].qty_change, 0);
    assert_eq!(adjusted.history[1].kind, HistoryKind::Sale);
}

#[tokio::test]
async fn test_alert_refires_while_below_threshold() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    h.service.adjust_quantity(&product.id, -5).await.unwrap(); // 12 -> 7
    h.service.adjust_quantity(&product.id, -1).await.unwrap(); // 7 -> 6, still low

    // No crossing-from-above requirement: both adjustments fire.
    assert_eq!(h.notifier.sent_count().await, 2);
}

#[tokio::test]
async fn test_no_alert_above_threshold() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    h.service.adjust_quantity(&product.id, -1).await.unwrap(); // 12 -> 11
    assert_eq!(h.notifier.sent_count().await, 0);
}

#[tokio::test]
async fn test_no_alert_when_auto_alert_disabled() {
    let h = harness();
    let product = h
        .service
        .create(ProductDraft {
            auto_alert: false,
            ..mug_draft()
        })
        .await
        .unwrap();

    h.service.adjust_quantity(&product.id, -5).await.unwrap();
    assert_eq!(h.notifier.sent_count().await, 0);
}

#[tokio::test]
async fn test_no_alert_without_contact() {
    let h = harness();
    let product = h
        .service
        .create(ProductDraft {
            contact: None,
            ..mug_draft()
        })
        .await
        .unwrap();

    let adjusted = h.service.adjust_quantity(&product.id, -5).await.unwrap();
    assert_eq!(h.notifier.sent_count().await, 0);
    assert_eq!(adjusted.history[0].kind, HistoryKind::Sale);
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_adjustment() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();
    h.notifier.set_fail_on_send(true).await;

    let adjusted = h.service.adjust_quantity(&product.id, -5).await.unwrap();
    assert_eq!(adjusted.qty, 7);
    // The failed alert leaves no alert history entry.
    assert_eq!(adjusted.history[0].kind, HistoryKind::Sale);
}

#[tokio::test]
async fn test_failed_alert_persist_not_reflected_in_response() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();
    // Allow the adjustment write, fail the follow-up alert write.
    h.store.set_fail_after_puts(1).await;

    let adjusted = h.service.adjust_quantity(&product.id, -5).await.unwrap();
    assert_eq!(adjusted.qty, 7);
    // The alert entry never reached the store, so the returned record
    // must not carry it either.
    assert_eq!(adjusted.history[0].kind, HistoryKind::Sale);
    let stored = h.store.get(&product.id).await.unwrap().unwrap();
    assert_eq!(stored, adjusted);
}

#[tokio::test]
async fn test_sms_destination_for_phone_contact() {
    let h = harness();
    let product = h
        .service
        .create(ProductDraft {
            contact: Some("+15550001234".to_string()),
            ..mug_draft()
        })
        .await
        .unwrap();

    h.service.adjust_quantity(&product.id, -5).await.unwrap();
    let sent = h.notifier.take_sent().await;
    assert_eq!(
        sent[0].destination,
        Destination::Sms("+15550001234".to_string())
    );
}

#[tokio::test]
async fn test_search_blank_query_returns_nothing() {
    let h = harness();
    h.service.create(mug_draft()).await.unwrap();

    assert!(h.service.search("").await.unwrap().is_empty());
    assert!(h.service.search("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_matches_sku_case_insensitively() {
    let h = harness();
    h.service.create(mug_draft()).await.unwrap();
    h.service
        .create(ProductDraft {
            name: "Pen".to_string(),
            sku: "PEN-BK-1".to_string(),
            ..mug_draft()
        })
        .await
        .unwrap();

    let results = h.service.search("MUG").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].sku, "MUG-RD-1");

    let results = h.service.search("mug").await.unwrap();
    assert_eq!(results.len(), 1);

    let results = h.service.search("red").await.unwrap();
    assert_eq!(results.len(), 1, "name matches too");
}

#[tokio::test]
async fn test_low_stock_boundary_inclusive() {
    let h = harness();
    let at = h
        .service
        .create(ProductDraft {
            name: "At".to_string(),
            qty: 10,
            threshold: 10,
            ..mug_draft()
        })
        .await
        .unwrap();
    h.service
        .create(ProductDraft {
            name: "Above".to_string(),
            qty: 11,
            threshold: 10,
            ..mug_draft()
        })
        .await
        .unwrap();

    let low = h.service.list_low_stock().await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, at.id);
}

#[tokio::test]
async fn test_update_merges_and_preserves_id() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    let updated = h
        .service
        .update(
            &product.id,
            ProductPatch {
                name: Some("Blue Mug".to_string()),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, product.id);
    assert_eq!(updated.name, "Blue Mug");
    assert_eq!(updated.sku, "MUG-RD-1");
    assert!(updated.updated_at >= product.updated_at);
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let h = harness();
    assert!(matches!(
        h.service.update("missing", ProductPatch::default()).await,
        Err(InventoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();

    h.service.delete(&product.id).await.unwrap();
    // Deleting an absent id must succeed, not report NotFound.
    h.service.delete(&product.id).await.unwrap();
    assert!(matches!(
        h.service.get(&product.id).await,
        Err(InventoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_manual_alert_ignores_threshold() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap(); // qty 12 > threshold 10

    let updated = h.service.send_alert_for(&product.id).await.unwrap();
    assert_eq!(h.notifier.sent_count().await, 1);
    assert_eq!(updated.history[0].kind, HistoryKind::Alert);
}

#[tokio::test]
async fn test_manual_alert_without_contact_is_validation_error() {
    let h = harness();
    let product = h
        .service
        .create(ProductDraft {
            contact: None,
            ..mug_draft()
        })
        .await
        .unwrap();

    assert!(matches!(
        h.service.send_alert_for(&product.id).await,
        Err(InventoryError::Validation(_))
    ));
    assert_eq!(h.notifier.sent_count().await, 0);
}

#[tokio::test]
async fn test_manual_alert_failure_propagates() {
    let h = harness();
    let product = h.service.create(mug_draft()).await.unwrap();
    h.notifier.set_fail_on_send(true).await;

    assert!(matches!(
        h.service.send_alert_for(&product.id).await,
        Err(InventoryError::Notify(_))
    ));
}

#[tokio::test]
async fn test_store_failure_surfaces_as_adapter_error() {
    let h = harness();
    h.store.set_fail(true).await;

    assert!(matches!(
        h.service.list_all().await,
        Err(InventoryError::Store(_))
    ));
}

#[tokio::test]
async fn test_concurrent_adjustments_lose_one_delta() {
    // Both writers start from the same persisted record; the service
    // does read-modify-write with no version check, so the later
    // overwrite wins and exactly one of the two deltas is lost.
    let h = harness();
    let product = h
        .service
        .create(ProductDraft {
            qty: 10,
            threshold: 0,
            ..mug_draft()
        })
        .await
        .unwrap();

    let stale = h.service.get(&product.id).await.unwrap();

    let mut first = stale.clone();
    first.qty -= 3;
    h.store.put(&first).await.unwrap();

    let mut second = stale;
    second.qty -= 2;
    h.store.put(&second).await.unwrap();

    let final_qty = h.service.get(&product.id).await.unwrap().qty;
    assert_eq!(final_qty, 8, "only the second writer's delta survives");
}
