//! Reversal / Compensation Engine
//!
//! Restores a cancelled sale's consumption to its source batches and
//! retires the sale record, in one transaction. The sale's historical
//! shape decides the path: allocation facts give a lossless restore; the
//! oldest data has none and gets a FIFO approximation that is surfaced
//! as such.

use crate::db::models::{NormalizedSale, SaleShape};
use crate::stock::error::{StockError, StockResult};
use crate::stock::ordering::sort_fifo;
use crate::stock::packaging::derive_remaining_packages;
use crate::stock::store::{StockStore, StockWrite};
use rust_decimal::Decimal;
use shared::quantity::{is_depleted, round_quantity};
use shared::{RestoredLine, ReversalOutcome};
use std::collections::BTreeMap;
use surrealdb::RecordId;

pub struct ReversalEngine<'a> {
    store: &'a dyn StockStore,
}

impl<'a> ReversalEngine<'a> {
    pub fn new(store: &'a dyn StockStore) -> Self {
        Self { store }
    }

    /// Reverse one sale. Accepts either a `sale:key` reference or a raw
    /// key. Restoration writes and the sale deletion commit together; a
    /// crash can never leave one observable without the other.
    pub async fn reverse(&self, sale_id: &str) -> StockResult<ReversalOutcome> {
        let record_id = parse_sale_id(sale_id)
            .ok_or_else(|| StockError::SaleNotFound(sale_id.to_string()))?;
        let sale = self
            .store
            .read_sale(&record_id)
            .await?
            .ok_or_else(|| StockError::SaleNotFound(sale_id.to_string()))?;

        let normalized = sale.normalize();

        let mut writes: Vec<StockWrite> = Vec::new();
        let mut lines: Vec<RestoredLine> = Vec::new();
        let mut exact = true;
        match normalized.shape {
            SaleShape::Empty => {}
            SaleShape::PerLineAllocations | SaleShape::FlatAllocations => {
                self.plan_exact_restore(&normalized, &mut writes, &mut lines, &mut exact)
                    .await?;
            }
            SaleShape::NoAllocations => {
                // Data-quality compromise, not error recovery: the restore
                // below is an approximation and the outcome says so.
                exact = false;
                tracing::warn!(
                    sale = %record_id,
                    "sale carries no allocation facts; restoring by FIFO approximation"
                );
                self.plan_heuristic_restore(&normalized, &mut writes, &mut lines)
                    .await?;
            }
        }

        writes.push(StockWrite::DeleteSale {
            id: record_id.clone(),
        });
        self.store
            .commit(writes)
            .await
            .map_err(StockError::from_commit)?;

        let restored_quantity =
            round_quantity(lines.iter().map(|l| l.quantity).sum::<Decimal>());
        tracing::info!(
            sale = %record_id,
            restored = %restored_quantity,
            exact,
            "sale reversed"
        );
        Ok(ReversalOutcome {
            restored_quantity,
            exact,
            lines,
        })
    }

    /// Exact path: group the sale's allocation facts by source batch, sum
    /// per batch, and put each sum back. A batch that vanished since the
    /// sale is skipped with a warning; a sum that would push `remaining`
    /// past the original quantity is clamped. Either case downgrades the
    /// outcome to approximate.
    async fn plan_exact_restore(
        &self,
        normalized: &NormalizedSale,
        writes: &mut Vec<StockWrite>,
        lines: &mut Vec<RestoredLine>,
        exact: &mut bool,
    ) -> StockResult<()> {
        let mut per_batch: BTreeMap<String, Decimal> = BTreeMap::new();
        for item in &normalized.items {
            for allocation in &item.allocations {
                let entry = per_batch
                    .entry(allocation.batch_id.clone())
                    .or_insert(Decimal::ZERO);
                *entry = round_quantity(*entry + allocation.quantity);
            }
        }

        let ids: Vec<RecordId> = per_batch
            .keys()
            .filter_map(|key| key.parse::<RecordId>().ok())
            .collect();
        let batches = self.store.read_batches(&ids).await?;

        for (batch_id, quantity) in per_batch {
            let Some(batch) = batches
                .iter()
                .find(|b| b.id.as_ref().map(|id| id.to_string()) == Some(batch_id.clone()))
            else {
                tracing::warn!(batch = %batch_id, "batch vanished; skipping its restore");
                *exact = false;
                continue;
            };
            let Some(id) = batch.id.clone() else {
                continue;
            };

            let mut new_remaining = round_quantity(batch.remaining + quantity);
            if new_remaining > batch.quantity {
                tracing::warn!(
                    batch = %batch_id,
                    remaining = %batch.remaining,
                    restore = %quantity,
                    quantity = %batch.quantity,
                    "restore exceeds original quantity; clamping"
                );
                *exact = false;
                new_remaining = batch.quantity;
            }
            let applied = round_quantity(new_remaining - batch.remaining);
            if applied <= Decimal::ZERO {
                continue;
            }

            writes.push(StockWrite::BatchRemaining {
                id,
                revision: batch.revision,
                remaining: new_remaining,
                remaining_packages: derive_remaining_packages(
                    new_remaining,
                    batch.units_per_package,
                ),
            });
            lines.push(RestoredLine {
                batch_id,
                product: batch.product.clone(),
                quantity: applied,
            });
        }
        Ok(())
    }

    /// No-allocation path: re-query the sold products' batches and put the
    /// quantity back onto batches showing prior consumption, oldest
    /// first, each capped at what it actually gave out. A remainder no
    /// batch can absorb is dropped with a warning rather than pushed past
    /// a batch's original quantity.
    async fn plan_heuristic_restore(
        &self,
        normalized: &NormalizedSale,
        writes: &mut Vec<StockWrite>,
        lines: &mut Vec<RestoredLine>,
    ) -> StockResult<()> {
        // 同一商品可能出现在多行；先按商品合并，避免一个批次被写两次
        let mut per_product: BTreeMap<String, Decimal> = BTreeMap::new();
        for item in &normalized.items {
            let entry = per_product
                .entry(item.product.clone())
                .or_insert(Decimal::ZERO);
            *entry = round_quantity(*entry + item.quantity);
        }

        for (product, quantity) in per_product {
            let mut batches = self.store.read_product_batches(&product).await?;
            sort_fifo(&mut batches);

            let mut outstanding = quantity;
            for batch in &batches {
                if is_depleted(outstanding) {
                    break;
                }
                let capacity = round_quantity(batch.consumed());
                if capacity <= Decimal::ZERO {
                    continue;
                }
                let Some(id) = batch.id.clone() else {
                    continue;
                };

                let back = if capacity < outstanding {
                    capacity
                } else {
                    outstanding
                };
                let new_remaining = round_quantity(batch.remaining + back);
                writes.push(StockWrite::BatchRemaining {
                    id: id.clone(),
                    revision: batch.revision,
                    remaining: new_remaining,
                    remaining_packages: derive_remaining_packages(
                        new_remaining,
                        batch.units_per_package,
                    ),
                });
                lines.push(RestoredLine {
                    batch_id: id.to_string(),
                    product: product.clone(),
                    quantity: back,
                });
                outstanding = round_quantity(outstanding - back);
            }

            if !is_depleted(outstanding) {
                tracing::warn!(
                    product = %product,
                    unplaced = %outstanding,
                    "no batch shows enough prior consumption; dropping remainder"
                );
            }
        }
        Ok(())
    }
}

/// Accept `sale:key` or a bare key.
fn parse_sale_id(sale_id: &str) -> Option<RecordId> {
    if sale_id.is_empty() {
        return None;
    }
    if sale_id.contains(':') {
        sale_id.parse::<RecordId>().ok()
    } else {
        Some(RecordId::from_table_key("sale", sale_id))
    }
}
