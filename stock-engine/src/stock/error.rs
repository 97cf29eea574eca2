//! Stock engine error taxonomy

use crate::db::repository::RepoError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Engine errors. Transaction failures are aggregate: no partial batch
/// write ever persists on any of these.
#[derive(Debug, Error)]
pub enum StockError {
    /// Non-positive requested quantity. The engine applies the strict
    /// policy uniformly; a zero request is a caller bug, not a no-op.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(Decimal),

    /// Strict-mode demand exceeded the product's total remaining stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
        /// Shortfall in whole packages, using the pool-inferred ratio.
        missing_packages: i64,
    },

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// A snapshotted batch vanished before the commit. During allocation
    /// this aborts the whole call; during reversal a batch missing at
    /// snapshot time is skipped instead.
    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    /// A concurrent writer moved a batch revision between snapshot and
    /// commit. Nothing was written; the caller owns the retry decision.
    #[error("Concurrent stock mutation: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Store(#[from] RepoError),
}

impl StockError {
    /// Classify a failed commit: revision-guard failures become
    /// `Conflict`, everything else stays a storage error.
    pub(crate) fn from_commit(err: RepoError) -> Self {
        match err {
            RepoError::Conflict(msg) => StockError::Conflict(msg),
            other => StockError::Store(other),
        }
    }
}

pub type StockResult<T> = Result<T, StockError>;
