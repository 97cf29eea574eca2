//! Two-phase store protocol: snapshot reads, then one atomic commit
//!
//! The underlying transactional store forbids interleaving reads and
//! writes inside one transaction, so the engine reads everything it needs
//! first (the snapshot, including each batch's `revision`) and then
//! submits every write as a single guarded transaction. If any guarded
//! revision moved in the meantime the whole commit fails and nothing is
//! written.

use crate::db::models::{Batch, SaleDoc};
use crate::db::repository::{BatchRepository, RepoResult, SaleRepository};
use async_trait::async_trait;
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

/// One write queued against the snapshot.
#[derive(Debug, Clone)]
pub enum StockWrite {
    /// Set a batch's remaining count (and derived package counter) iff
    /// its revision still matches the snapshot.
    BatchRemaining {
        id: RecordId,
        /// Revision observed at snapshot time.
        revision: u64,
        remaining: Decimal,
        remaining_packages: Option<i64>,
    },
    /// Retire a sale record in the same transaction as its restores.
    DeleteSale { id: RecordId },
}

/// Read-snapshot-then-commit port over the batch/sale store.
///
/// Reads form the snapshot phase; [`StockStore::commit`] is
/// all-or-nothing. Any backend with equality queries and a CAS-style
/// conditional write can implement this protocol; the SurrealDB
/// implementation uses a revision-guarded transaction.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Snapshot every batch of one product.
    async fn read_product_batches(&self, product: &str) -> RepoResult<Vec<Batch>>;

    /// Snapshot specific batches. Ids that no longer exist are simply
    /// absent from the result.
    async fn read_batches(&self, ids: &[RecordId]) -> RepoResult<Vec<Batch>>;

    /// Snapshot one sale document.
    async fn read_sale(&self, id: &RecordId) -> RepoResult<Option<SaleDoc>>;

    /// Apply every queued write atomically, or none of them.
    async fn commit(&self, writes: Vec<StockWrite>) -> RepoResult<()>;
}

/// SurrealDB-backed implementation of the two-phase protocol.
#[derive(Clone)]
pub struct SurrealStockStore {
    db: Surreal<Db>,
    batches: BatchRepository,
    sales: SaleRepository,
}

impl SurrealStockStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            batches: BatchRepository::new(db.clone()),
            sales: SaleRepository::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl StockStore for SurrealStockStore {
    async fn read_product_batches(&self, product: &str) -> RepoResult<Vec<Batch>> {
        self.batches.find_by_product(product).await
    }

    async fn read_batches(&self, ids: &[RecordId]) -> RepoResult<Vec<Batch>> {
        self.batches.find_by_ids(ids).await
    }

    async fn read_sale(&self, id: &RecordId) -> RepoResult<Option<SaleDoc>> {
        self.sales.find_by_id(id).await
    }

    async fn commit(&self, writes: Vec<StockWrite>) -> RepoResult<()> {
        if writes.is_empty() {
            return Ok(());
        }

        // Build one BEGIN..COMMIT query. Each batch update is guarded by
        // the snapshotted revision; an empty update result means a
        // concurrent writer got there first, and THROW cancels the whole
        // transaction.
        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for (i, write) in writes.iter().enumerate() {
            match write {
                StockWrite::BatchRemaining { .. } => {
                    sql.push_str(&format!(
                        "LET $u{i} = (UPDATE $id{i} SET remaining = $rem{i}, \
                         remaining_packages = $pkg{i}, revision = revision + 1 \
                         WHERE revision = $rev{i} RETURN AFTER);\n\
                         IF array::len($u{i}) == 0 {{ THROW 'conflict: batch revision moved' }};\n"
                    ));
                }
                StockWrite::DeleteSale { .. } => {
                    sql.push_str(&format!("DELETE $id{i};\n"));
                }
            }
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.db.query(sql);
        for (i, write) in writes.into_iter().enumerate() {
            match write {
                StockWrite::BatchRemaining {
                    id,
                    revision,
                    remaining,
                    remaining_packages,
                } => {
                    query = query
                        .bind((format!("id{i}"), id))
                        .bind((format!("rem{i}"), remaining))
                        .bind((format!("pkg{i}"), remaining_packages))
                        .bind((format!("rev{i}"), revision));
                }
                StockWrite::DeleteSale { id } => {
                    query = query.bind((format!("id{i}"), id));
                }
            }
        }

        // check() surfaces per-statement errors, including the THROW.
        query.await?.check()?;
        Ok(())
    }
}
