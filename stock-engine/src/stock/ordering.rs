//! Batch Ordering Policy
//!
//! The FIFO contract: ascending business date, ties broken by ascending
//! creation timestamp. Historical allocations were produced under exactly
//! this order; changing the tie-break would make replays of old data
//! diverge from what actually happened.

use crate::db::models::Batch;
use std::cmp::Ordering;

/// Two-level FIFO comparator.
pub fn fifo_cmp(a: &Batch, b: &Batch) -> Ordering {
    a.business_date
        .cmp(&b.business_date)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Sort batches oldest-first. The sort is stable, so fully equal keys
/// keep their store order.
pub fn sort_fifo(batches: &mut [Batch]) {
    batches.sort_by(fifo_cmp);
}
