//! Allocation fact records and engine result types
//!
//! An [`AllocationEntry`] is an immutable what-consumed-what fact. Order
//! entry embeds the entries of an [`AllocationResult`] into its own sale
//! record; the reversal engine later reads them back as the authoritative
//! undo source.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One slice taken from one batch. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// Source batch, `batch:key` record reference.
    pub batch_id: String,
    /// Units taken from the batch (3-dp quantity).
    pub quantity: Decimal,
    /// Unit cost at the time of taking.
    pub unit_cost: Decimal,
    /// `quantity * unit_cost`, currency-rounded per line.
    pub line_cost: Decimal,
}

/// Result of one allocate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Oldest-first, one entry per touched batch.
    pub allocations: Vec<AllocationEntry>,
    /// `total_cost / allocated quantity` at 4 dp; zero when nothing was
    /// allocated.
    pub avg_unit_cost: Decimal,
    /// Sum of the per-line costs, each rounded before summation.
    pub total_cost: Decimal,
}

impl AllocationResult {
    pub fn empty() -> Self {
        Self {
            allocations: Vec::new(),
            avg_unit_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
        }
    }

    /// Total units allocated. In partial mode this may be less than the
    /// requested quantity; the difference is the shortfall.
    pub fn allocated_quantity(&self) -> Decimal {
        self.allocations.iter().map(|a| a.quantity).sum()
    }
}

/// Quantity put back onto one batch during a reversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoredLine {
    pub batch_id: String,
    pub product: String,
    pub quantity: Decimal,
}

/// Result of reversing one sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReversalOutcome {
    /// Total units restored across all batches.
    pub restored_quantity: Decimal,
    /// False when any part of the restore was approximated: the sale
    /// carried no allocation facts, a source batch had vanished, or a
    /// restore had to be clamped at a batch's original quantity.
    pub exact: bool,
    /// Per-batch restore detail, for the administrative audit trail.
    pub lines: Vec<RestoredLine>,
}
