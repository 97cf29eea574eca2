//! Stock Movement Model
//!
//! 追加式流水，仅供报表使用；不参与正确性保证。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Allocator took units from a batch.
    Consume,
    /// Reversal engine put units back onto a batch.
    Restore,
}

/// One informational what-consumed-what record. Written best-effort after
/// the batch transaction commits; a failed write is logged and dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Source/target batch, `batch:key` reference.
    pub batch: String,
    pub product: String,
    pub kind: MovementKind,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    /// Sale the movement belongs to, when known.
    #[serde(default)]
    pub sale: Option<String>,
    pub created_at: DateTime<Utc>,
}
