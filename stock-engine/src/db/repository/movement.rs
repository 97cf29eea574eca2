//! Stock Movement Repository (append-only)

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::StockMovement;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const MOVEMENT_TABLE: &str = "stock_movement";

#[derive(Clone)]
pub struct MovementRepository {
    base: BaseRepository,
}

impl MovementRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append one movement record. Callers treat a failure here as
    /// informational only; it never affects batch state.
    pub async fn append(&self, movement: StockMovement) -> RepoResult<StockMovement> {
        let created: Option<StockMovement> = self
            .base
            .db()
            .create(MOVEMENT_TABLE)
            .content(movement)
            .await?;
        created.ok_or_else(|| RepoError::Database("movement insert returned nothing".into()))
    }

    /// Reporting read: every movement logged against one sale.
    pub async fn find_by_sale(&self, sale_id: &str) -> RepoResult<Vec<StockMovement>> {
        let movements: Vec<StockMovement> = self
            .base
            .db()
            .query("SELECT * FROM stock_movement WHERE sale = $sale ORDER BY created_at")
            .bind(("sale", sale_id.to_string()))
            .await?
            .take(0)?;
        Ok(movements)
    }

    /// Reporting read: every movement that touched one batch.
    pub async fn find_by_batch(&self, batch_id: &str) -> RepoResult<Vec<StockMovement>> {
        let movements: Vec<StockMovement> = self
            .base
            .db()
            .query("SELECT * FROM stock_movement WHERE batch = $batch ORDER BY created_at")
            .bind(("batch", batch_id.to_string()))
            .await?
            .take(0)?;
        Ok(movements)
    }
}
