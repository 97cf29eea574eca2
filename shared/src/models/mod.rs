//! Boundary DTOs
//!
//! Allocation facts and engine results as embedded/consumed by order entry.

pub mod allocation;
pub mod demand;

// Re-exports
pub use allocation::{AllocationEntry, AllocationResult, RestoredLine, ReversalOutcome};
pub use demand::StockDemand;
