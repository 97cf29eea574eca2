//! Stock Module - 库存引擎核心
//!
//! 排序策略、包装换算、FIFO 分配器、冲销引擎，以及两阶段存储协议。
//! 对外只有两个操作：`allocate` 和 `reverse`。

pub mod allocator;
pub mod error;
pub mod ordering;
pub mod packaging;
pub mod reversal;
pub mod store;

#[cfg(test)]
mod tests;

// Re-exports
pub use allocator::Allocator;
pub use error::{StockError, StockResult};
pub use reversal::ReversalEngine;
pub use store::{StockStore, StockWrite, SurrealStockStore};

use crate::config::EngineConfig;
use crate::db::models::{MovementKind, StockMovement};
use crate::db::repository::MovementRepository;
use chrono::Utc;
use shared::{AllocationResult, ReversalOutcome, StockDemand};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Facade bundling the transactional store, the informational movement
/// log and configuration. One invocation of either operation is a single
/// bounded unit of work; there are no background workers here.
#[derive(Clone)]
pub struct StockService {
    store: SurrealStockStore,
    movements: MovementRepository,
    config: EngineConfig,
}

impl StockService {
    pub fn new(db: Surreal<Db>, config: EngineConfig) -> Self {
        Self {
            store: SurrealStockStore::new(db.clone()),
            movements: MovementRepository::new(db),
            config,
        }
    }

    /// Allocate stock for a sale line. See [`Allocator`].
    pub async fn allocate(
        &self,
        product: &str,
        demand: StockDemand,
        allow_partial: bool,
    ) -> StockResult<AllocationResult> {
        let result = Allocator::new(&self.store, &self.config)
            .allocate(product, demand, allow_partial)
            .await?;

        tracing::info!(
            product,
            allocated = %result.allocated_quantity(),
            batches = result.allocations.len(),
            total_cost = %result.total_cost,
            "stock allocated"
        );

        // 流水在批次事务之外追加；写入失败不回滚分配
        for line in &result.allocations {
            let movement = StockMovement {
                id: None,
                batch: line.batch_id.clone(),
                product: product.to_string(),
                kind: MovementKind::Consume,
                quantity: line.quantity,
                unit_cost: Some(line.unit_cost),
                sale: None,
                created_at: Utc::now(),
            };
            if let Err(err) = self.movements.append(movement).await {
                tracing::warn!(batch = %line.batch_id, %err, "movement log write failed");
            }
        }

        Ok(result)
    }

    /// Reverse a cancelled sale. See [`ReversalEngine`].
    pub async fn reverse(&self, sale_id: &str) -> StockResult<ReversalOutcome> {
        let outcome = ReversalEngine::new(&self.store).reverse(sale_id).await?;

        for line in &outcome.lines {
            let movement = StockMovement {
                id: None,
                batch: line.batch_id.clone(),
                product: line.product.clone(),
                kind: MovementKind::Restore,
                quantity: line.quantity,
                unit_cost: None,
                sale: Some(sale_id.to_string()),
                created_at: Utc::now(),
            };
            if let Err(err) = self.movements.append(movement).await {
                tracing::warn!(batch = %line.batch_id, %err, "movement log write failed");
            }
        }

        Ok(outcome)
    }
}
