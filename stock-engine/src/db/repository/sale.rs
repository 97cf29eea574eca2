//! Sale Repository
//!
//! Sales are owned by order entry. The engine reads them during reversal
//! and deletes them inside the reversal transaction (`stock::store`);
//! `create` exists for the order-entry surface and for tests.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::SaleDoc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const SALE_TABLE: &str = "sale";

#[derive(Clone)]
pub struct SaleRepository {
    base: BaseRepository,
}

impl SaleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, doc: SaleDoc) -> RepoResult<SaleDoc> {
        let created: Option<SaleDoc> = self.base.db().create(SALE_TABLE).content(doc).await?;
        created.ok_or_else(|| RepoError::Database("sale insert returned nothing".into()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<SaleDoc>> {
        let sale: Option<SaleDoc> = self.base.db().select(id.clone()).await?;
        Ok(sale)
    }
}
