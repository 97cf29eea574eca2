use super::*;
use crate::config::EngineConfig;
use crate::stock::allocator::Allocator;
use crate::stock::error::StockError;
use crate::stock::reversal::ReversalEngine;
use crate::db::models::{SaleDoc, SaleItem};
use shared::{AllocationEntry, StockDemand};

fn sale_id(key: &str) -> RecordId {
    RecordId::from_table_key("sale", key)
}

fn empty_sale(key: &str) -> SaleDoc {
    SaleDoc {
        id: Some(sale_id(key)),
        items: None,
        allocations: None,
        product: None,
        quantity: None,
        created_at: Some(Utc.timestamp_opt(1_700_000_100, 0).unwrap()),
    }
}

fn entry(batch_key: &str, quantity: &str, unit_cost: &str) -> AllocationEntry {
    AllocationEntry {
        batch_id: format!("batch:{batch_key}"),
        quantity: dec(quantity),
        unit_cost: dec(unit_cost),
        line_cost: dec(quantity) * dec(unit_cost),
    }
}

// ========================================================================
// Exact path: allocate then reverse restores every batch
// ========================================================================

#[tokio::test]
async fn test_allocate_then_reverse_round_trips_exactly() {
    let store = MemStore::new(vec![
        make_batch("b1", "rice", (2024, 1, 1), 0, "10", "10", "2.00"),
        make_batch("b2", "rice", (2024, 1, 5), 1, "10", "10", "2.50"),
    ]);
    let config = EngineConfig {
        work_dir: String::new(),
        namespace: "test".into(),
        database: "test".into(),
        default_units_per_package: 1,
    };

    let result = Allocator::new(&store, &config)
        .allocate("rice", StockDemand::Units(dec("15")), false)
        .await
        .unwrap();
    assert_eq!(store.batch("b1").remaining, dec("0"));

    // Order entry embeds the allocations into its sale record
    let sale = SaleDoc {
        items: Some(vec![SaleItem {
            product: "rice".into(),
            quantity: dec("15"),
            allocations: Some(result.allocations.clone()),
        }]),
        ..empty_sale("s1")
    };
    let store = store.with_sale(sale);

    let outcome = ReversalEngine::new(&store).reverse("sale:s1").await.unwrap();

    assert!(outcome.exact);
    assert_eq!(outcome.restored_quantity, dec("15"));
    assert_eq!(store.batch("b1").remaining, dec("10"));
    assert_eq!(store.batch("b2").remaining, dec("10"));
    // Sale retired in the same transaction
    assert_eq!(store.sale_count(), 0);
}

#[tokio::test]
async fn test_multi_line_sale_groups_restores_per_batch() {
    // Two lines both drew on b1; the restore must be one summed write
    let store = MemStore::new(vec![make_batch(
        "b1",
        "rice",
        (2024, 1, 1),
        0,
        "10",
        "4",
        "2.00",
    )])
    .with_sale(SaleDoc {
        items: Some(vec![
            SaleItem {
                product: "rice".into(),
                quantity: dec("4"),
                allocations: Some(vec![entry("b1", "4", "2.00")]),
            },
            SaleItem {
                product: "rice".into(),
                quantity: dec("2"),
                allocations: Some(vec![entry("b1", "2", "2.00")]),
            },
        ]),
        ..empty_sale("s1")
    });

    let outcome = ReversalEngine::new(&store).reverse("sale:s1").await.unwrap();

    assert!(outcome.exact);
    assert_eq!(outcome.restored_quantity, dec("6"));
    assert_eq!(outcome.lines.len(), 1);
    assert_eq!(store.batch("b1").remaining, dec("10"));
    // One grouped write, one revision bump
    assert_eq!(store.batch("b1").revision, 1);
}

// ========================================================================
// Legacy flat path
// ========================================================================

#[tokio::test]
async fn test_flat_legacy_allocation_list_is_honoured() {
    let store = MemStore::new(vec![
        make_batch("b1", "rice", (2024, 1, 1), 0, "10", "6", "2.00"),
        make_batch("b2", "rice", (2024, 1, 5), 1, "10", "9", "2.50"),
    ])
    .with_sale(SaleDoc {
        allocations: Some(vec![entry("b1", "4", "2.00"), entry("b2", "1", "2.50")]),
        product: Some("rice".into()),
        ..empty_sale("s1")
    });

    let outcome = ReversalEngine::new(&store).reverse("sale:s1").await.unwrap();

    assert!(outcome.exact);
    assert_eq!(outcome.restored_quantity, dec("5"));
    assert_eq!(store.batch("b1").remaining, dec("10"));
    assert_eq!(store.batch("b2").remaining, dec("10"));
    assert_eq!(store.sale_count(), 0);
}

// ========================================================================
// No-allocation heuristic path
// ========================================================================

#[tokio::test]
async fn test_heuristic_restores_onto_consumed_batches_fifo() {
    // b1 consumed 3, b2 consumed 4, b3 untouched
    let store = MemStore::new(vec![
        make_batch("b1", "rice", (2024, 1, 1), 0, "10", "7", "2.00"),
        make_batch("b2", "rice", (2024, 1, 5), 1, "10", "6", "2.50"),
        make_batch("b3", "rice", (2024, 1, 9), 2, "10", "10", "2.60"),
    ])
    .with_sale(SaleDoc {
        items: Some(vec![SaleItem {
            product: "rice".into(),
            quantity: dec("5"),
            allocations: None,
        }]),
        ..empty_sale("s1")
    });

    let outcome = ReversalEngine::new(&store).reverse("sale:s1").await.unwrap();

    // Approximation, and flagged as one
    assert!(!outcome.exact);
    assert_eq!(outcome.restored_quantity, dec("5"));
    // Oldest consumed batch fills first, overflow goes to the next
    assert_eq!(store.batch("b1").remaining, dec("10"));
    assert_eq!(store.batch("b2").remaining, dec("8"));
    assert_eq!(store.batch("b3").remaining, dec("10"));
    assert_eq!(store.sale_count(), 0);
}

#[tokio::test]
async fn test_heuristic_never_exceeds_original_quantity() {
    // Only 2 units of prior consumption exist; restoring 9 must stop at
    // the bound and drop the remainder.
    let store = MemStore::new(vec![make_batch(
        "b1",
        "rice",
        (2024, 1, 1),
        0,
        "10",
        "8",
        "2.00",
    )])
    .with_sale(SaleDoc {
        items: Some(vec![SaleItem {
            product: "rice".into(),
            quantity: dec("9"),
            allocations: None,
        }]),
        ..empty_sale("s1")
    });

    let outcome = ReversalEngine::new(&store).reverse("sale:s1").await.unwrap();

    assert!(!outcome.exact);
    assert_eq!(outcome.restored_quantity, dec("2"));
    assert_eq!(store.batch("b1").remaining, dec("10"));
    assert_eq!(store.sale_count(), 0);
}

// ========================================================================
// Degenerate shapes and failures
// ========================================================================

#[tokio::test]
async fn test_empty_sale_is_deleted_with_zero_restoration() {
    let store = MemStore::new(vec![]).with_sale(empty_sale("s1"));

    let outcome = ReversalEngine::new(&store).reverse("sale:s1").await.unwrap();

    assert!(outcome.exact);
    assert_eq!(outcome.restored_quantity, Decimal::ZERO);
    assert!(outcome.lines.is_empty());
    assert_eq!(store.sale_count(), 0);
}

#[tokio::test]
async fn test_missing_sale_fails() {
    let store = MemStore::new(vec![]);
    let engine = ReversalEngine::new(&store);

    let err = engine.reverse("sale:nope").await.unwrap_err();
    assert!(matches!(err, StockError::SaleNotFound(_)));

    let err = engine.reverse("").await.unwrap_err();
    assert!(matches!(err, StockError::SaleNotFound(_)));
}

#[tokio::test]
async fn test_bare_key_resolves_to_sale_record() {
    let store = MemStore::new(vec![]).with_sale(empty_sale("s9"));
    ReversalEngine::new(&store).reverse("s9").await.unwrap();
    assert_eq!(store.sale_count(), 0);
}

#[tokio::test]
async fn test_vanished_batch_is_skipped_not_fatal() {
    let store = MemStore::new(vec![make_batch(
        "kept",
        "rice",
        (2024, 1, 1),
        0,
        "10",
        "5",
        "2.00",
    )])
    .with_sale(SaleDoc {
        items: Some(vec![SaleItem {
            product: "rice".into(),
            quantity: dec("8"),
            allocations: Some(vec![entry("kept", "5", "2.00"), entry("gone", "3", "2.00")]),
        }]),
        ..empty_sale("s1")
    });

    let outcome = ReversalEngine::new(&store).reverse("sale:s1").await.unwrap();

    // The surviving batch is restored, the vanished one skipped, and the
    // outcome downgraded to approximate.
    assert!(!outcome.exact);
    assert_eq!(outcome.restored_quantity, dec("5"));
    assert_eq!(store.batch("kept").remaining, dec("10"));
    assert_eq!(store.sale_count(), 0);
}

#[tokio::test]
async fn test_restore_is_clamped_at_original_quantity() {
    // Batch already full; the sale's claim cannot push remaining past
    // the original quantity.
    let store = MemStore::new(vec![make_batch(
        "b1",
        "rice",
        (2024, 1, 1),
        0,
        "10",
        "10",
        "2.00",
    )])
    .with_sale(SaleDoc {
        items: Some(vec![SaleItem {
            product: "rice".into(),
            quantity: dec("3"),
            allocations: Some(vec![entry("b1", "3", "2.00")]),
        }]),
        ..empty_sale("s1")
    });

    let outcome = ReversalEngine::new(&store).reverse("sale:s1").await.unwrap();

    assert!(!outcome.exact);
    assert_eq!(outcome.restored_quantity, Decimal::ZERO);
    assert_eq!(store.batch("b1").remaining, dec("10"));
    assert_eq!(store.sale_count(), 0);
}
