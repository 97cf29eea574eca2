//! Batch Model
//!
//! 一条进货批次记录：原始数量 + 递减的剩余数量。
//! `remaining` 只由分配器（递减）和冲销引擎（回增）写入。

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Stock receipt batch.
///
/// Invariants: `0 <= remaining <= quantity` at all times; for packaged
/// goods `remaining_packages == floor(remaining / units_per_package)`
/// after every write. Any writer of `remaining` other than the allocator
/// and the reversal engine is out of contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Product key the batch belongs to.
    pub product: String,
    /// Business date: when the goods were logically received. Distinct
    /// from `created_at` and the primary FIFO sort key.
    pub business_date: NaiveDate,
    /// System write time; FIFO tie-breaker within one business date.
    pub created_at: DateTime<Utc>,
    /// Original received quantity, in units.
    pub quantity: Decimal,
    /// Remaining quantity, in units.
    pub remaining: Decimal,
    /// Acquisition cost per unit.
    pub unit_cost: Decimal,
    /// Reference sale price recorded at receipt time.
    pub sale_price: Decimal,
    /// Packaged goods: units per package, a per-batch ratio.
    #[serde(default)]
    pub units_per_package: Option<i64>,
    /// Packaged goods: package count at receipt, kept only so the pool
    /// ratio can be inferred from quantity/packages on legacy batches.
    #[serde(default)]
    pub packages: Option<i64>,
    /// Derived counter: `floor(remaining / units_per_package)`.
    #[serde(default)]
    pub remaining_packages: Option<i64>,
    /// Optimistic-concurrency counter, bumped by every engine write.
    #[serde(default)]
    pub revision: u64,
}

impl Batch {
    /// Units consumed from this batch so far.
    pub fn consumed(&self) -> Decimal {
        self.quantity - self.remaining
    }
}

/// Payload for receiving a new batch (stock-receipt surface, written by
/// the purchasing collaborator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCreate {
    pub product: String,
    pub business_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub sale_price: Decimal,
    #[serde(default)]
    pub units_per_package: Option<i64>,
    #[serde(default)]
    pub packages: Option<i64>,
}
