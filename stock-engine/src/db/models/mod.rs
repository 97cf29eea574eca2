//! Database Models

pub mod batch;
pub mod movement;
pub mod sale;

// Re-exports
pub use batch::{Batch, BatchCreate};
pub use movement::{MovementKind, StockMovement};
pub use sale::{NormalizedSale, NormalizedSaleItem, SaleDoc, SaleItem, SaleShape};
