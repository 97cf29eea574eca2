//! FIFO Allocator
//!
//! Given a product and a demand, consumes the oldest unexhausted batches
//! first and commits every touched batch in one transaction. Strict mode
//! is all-or-nothing; partial mode commits whatever could be allocated
//! and reports the shortfall implicitly through the allocated total.

use crate::config::EngineConfig;
use crate::db::repository::RepoError;
use crate::stock::error::{StockError, StockResult};
use crate::stock::ordering::sort_fifo;
use crate::stock::packaging::{self, derive_remaining_packages};
use crate::stock::store::{StockStore, StockWrite};
use rust_decimal::Decimal;
use shared::quantity::{is_depleted, is_sufficient, round_avg_cost, round_currency, round_quantity};
use shared::{AllocationEntry, AllocationResult, StockDemand};
use surrealdb::RecordId;

pub struct Allocator<'a> {
    store: &'a dyn StockStore,
    default_units_per_package: i64,
}

impl<'a> Allocator<'a> {
    pub fn new(store: &'a dyn StockStore, config: &EngineConfig) -> Self {
        Self {
            store,
            default_units_per_package: config.default_units_per_package,
        }
    }

    /// Allocate stock for one sale line.
    ///
    /// Snapshot phase first: every candidate batch is read before any
    /// write is issued. The commit is guarded per batch, so a concurrent
    /// allocation against the same product fails here rather than
    /// double-spending stock.
    pub async fn allocate(
        &self,
        product: &str,
        demand: StockDemand,
        allow_partial: bool,
    ) -> StockResult<AllocationResult> {
        let mut batches = self.store.read_product_batches(product).await?;
        sort_fifo(&mut batches);

        // 池级换算比每次现算（见 packaging 模块），绝不跨调用缓存
        let ratio = packaging::infer_units_per_package(&batches, self.default_units_per_package);
        let needed = match demand {
            StockDemand::Units(units) => round_quantity(units),
            StockDemand::Packages(packages) => packaging::packages_to_units(packages, ratio),
        };
        if needed <= Decimal::ZERO {
            return Err(StockError::InvalidQuantity(needed));
        }

        let available = round_quantity(batches.iter().map(|b| b.remaining).sum::<Decimal>());

        let mut outstanding = needed;
        let mut allocations: Vec<AllocationEntry> = Vec::new();
        let mut writes: Vec<StockWrite> = Vec::new();
        let mut touched: Vec<RecordId> = Vec::new();

        for batch in &batches {
            if is_depleted(batch.remaining) {
                continue;
            }
            let Some(id) = batch.id.clone() else {
                continue;
            };

            let take = if is_sufficient(batch.remaining, outstanding) {
                outstanding
            } else {
                batch.remaining
            };
            let take = round_quantity(take);
            let line_cost = round_currency(take * batch.unit_cost);
            allocations.push(AllocationEntry {
                batch_id: id.to_string(),
                quantity: take,
                unit_cost: batch.unit_cost,
                line_cost,
            });

            let mut new_remaining = round_quantity(batch.remaining - take);
            if new_remaining < Decimal::ZERO {
                // Tolerance allowed taking a hair more than remained
                new_remaining = Decimal::ZERO;
            }
            writes.push(StockWrite::BatchRemaining {
                id: id.clone(),
                revision: batch.revision,
                remaining: new_remaining,
                remaining_packages: derive_remaining_packages(
                    new_remaining,
                    batch.units_per_package,
                ),
            });
            touched.push(id);

            outstanding = round_quantity(outstanding - take);
            if is_depleted(outstanding) {
                outstanding = Decimal::ZERO;
                break;
            }
        }

        if !is_depleted(outstanding) && !allow_partial {
            return Err(StockError::InsufficientStock {
                requested: needed,
                available,
                missing_packages: packaging::missing_packages(needed - available, ratio),
            });
        }

        if allocations.is_empty() {
            // Partial mode against an empty pool: trivial success
            return Ok(AllocationResult::empty());
        }

        if let Err(err) = self.store.commit(writes).await {
            return Err(self.classify_commit_failure(err, &touched).await);
        }

        let allocated: Decimal = allocations.iter().map(|a| a.quantity).sum();
        let total_cost = round_currency(allocations.iter().map(|a| a.line_cost).sum::<Decimal>());
        let avg_unit_cost = if allocated > Decimal::ZERO {
            round_avg_cost(total_cost / allocated)
        } else {
            Decimal::ZERO
        };

        Ok(AllocationResult {
            allocations,
            avg_unit_cost,
            total_cost,
        })
    }

    /// A failed commit means a concurrent writer won the race. When one
    /// of the snapshotted batches is gone entirely, report that
    /// specifically: it is a hard abort, not a retryable revision race.
    async fn classify_commit_failure(&self, err: RepoError, touched: &[RecordId]) -> StockError {
        let RepoError::Conflict(msg) = err else {
            return StockError::Store(err);
        };
        match self.store.read_batches(touched).await {
            Ok(found) => {
                for id in touched {
                    if !found.iter().any(|b| b.id.as_ref() == Some(id)) {
                        return StockError::BatchNotFound(id.to_string());
                    }
                }
                StockError::Conflict(msg)
            }
            Err(_) => StockError::Conflict(msg),
        }
    }
}
