//! Batch Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Batch, BatchCreate};
use crate::stock::packaging::derive_remaining_packages;
use chrono::Utc;
use rust_decimal::Decimal;
use shared::quantity::round_quantity;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const BATCH_TABLE: &str = "batch";

#[derive(Clone)]
pub struct BatchRepository {
    base: BaseRepository,
}

impl BatchRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Receive a new batch of stock. This is the purchasing collaborator's
    /// surface; the engine itself never creates batches.
    pub async fn create(&self, data: BatchCreate) -> RepoResult<Batch> {
        if data.quantity <= Decimal::ZERO {
            return Err(RepoError::Validation(
                "batch quantity must be positive".into(),
            ));
        }
        if data.unit_cost < Decimal::ZERO {
            return Err(RepoError::Validation(
                "unit cost cannot be negative".into(),
            ));
        }

        let quantity = round_quantity(data.quantity);
        let doc = Batch {
            id: None,
            product: data.product,
            business_date: data.business_date,
            created_at: Utc::now(),
            quantity,
            remaining: quantity,
            unit_cost: data.unit_cost,
            sale_price: data.sale_price,
            units_per_package: data.units_per_package,
            packages: data.packages,
            remaining_packages: derive_remaining_packages(quantity, data.units_per_package),
            revision: 0,
        };
        let created: Option<Batch> = self.base.db().create(BATCH_TABLE).content(doc).await?;
        created.ok_or_else(|| RepoError::Database("batch insert returned nothing".into()))
    }

    /// All batches of one product, unsorted. The FIFO policy is applied in
    /// Rust (`stock::ordering`), never in the query.
    pub async fn find_by_product(&self, product: &str) -> RepoResult<Vec<Batch>> {
        let batches: Vec<Batch> = self
            .base
            .db()
            .query("SELECT * FROM batch WHERE product = $product")
            .bind(("product", product.to_string()))
            .await?
            .take(0)?;
        Ok(batches)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Batch>> {
        let batch: Option<Batch> = self.base.db().select(id.clone()).await?;
        Ok(batch)
    }

    /// Bulk lookup by record id. Ids that no longer exist are simply
    /// absent from the result.
    pub async fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<Batch>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let batches: Vec<Batch> = self
            .base
            .db()
            .query("SELECT * FROM batch WHERE id INSIDE $ids")
            .bind(("ids", ids.to_vec()))
            .await?
            .take(0)?;
        Ok(batches)
    }
}
