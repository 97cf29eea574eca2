//! Shared types for the stock engine boundary
//!
//! Types that cross between the batch allocation engine and its external
//! collaborators (order entry, back-office reporting). No I/O lives here.

pub mod models;
pub mod quantity;

// Re-exports
pub use models::{
    AllocationEntry, AllocationResult, RestoredLine, ReversalOutcome, StockDemand,
};
