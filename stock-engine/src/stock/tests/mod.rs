use super::store::{StockStore, StockWrite};
use crate::db::models::{Batch, SaleDoc};
use crate::db::repository::{RepoError, RepoResult};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Mutex;
use surrealdb::RecordId;

mod test_reversal;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn batch_id(key: &str) -> RecordId {
    RecordId::from_table_key("batch", key)
}

/// Build a test batch. `seq` feeds both the creation timestamp and the
/// FIFO tie-break checks.
pub fn make_batch(
    key: &str,
    product: &str,
    date: (i32, u32, u32),
    seq: i64,
    quantity: &str,
    remaining: &str,
    unit_cost: &str,
) -> Batch {
    Batch {
        id: Some(batch_id(key)),
        product: product.to_string(),
        business_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        created_at: Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap(),
        quantity: dec(quantity),
        remaining: dec(remaining),
        unit_cost: dec(unit_cost),
        sale_price: dec(unit_cost) * dec("1.5"),
        units_per_package: None,
        packages: None,
        remaining_packages: None,
        revision: 0,
    }
}

/// In-memory [`StockStore`] double with the same revision-guard commit
/// semantics as the SurrealDB implementation: every guard is validated
/// before anything is applied, so a conflict writes nothing.
pub struct MemStore {
    pub batches: Mutex<Vec<Batch>>,
    pub sales: Mutex<Vec<SaleDoc>>,
}

impl MemStore {
    pub fn new(batches: Vec<Batch>) -> Self {
        Self {
            batches: Mutex::new(batches),
            sales: Mutex::new(Vec::new()),
        }
    }

    pub fn with_sale(self, sale: SaleDoc) -> Self {
        self.sales.lock().unwrap().push(sale);
        self
    }

    pub fn batch(&self, key: &str) -> Batch {
        let id = batch_id(key);
        self.batches
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id.as_ref() == Some(&id))
            .cloned()
            .unwrap()
    }

    pub fn sale_count(&self) -> usize {
        self.sales.lock().unwrap().len()
    }
}

#[async_trait]
impl StockStore for MemStore {
    async fn read_product_batches(&self, product: &str) -> RepoResult<Vec<Batch>> {
        Ok(self
            .batches
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.product == product)
            .cloned()
            .collect())
    }

    async fn read_batches(&self, ids: &[RecordId]) -> RepoResult<Vec<Batch>> {
        Ok(self
            .batches
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.id.as_ref().is_some_and(|id| ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn read_sale(&self, id: &RecordId) -> RepoResult<Option<SaleDoc>> {
        Ok(self
            .sales
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id.as_ref() == Some(id))
            .cloned())
    }

    async fn commit(&self, writes: Vec<StockWrite>) -> RepoResult<()> {
        let mut batches = self.batches.lock().unwrap();
        let mut sales = self.sales.lock().unwrap();

        // Validate every guard before applying anything
        for write in &writes {
            if let StockWrite::BatchRemaining { id, revision, .. } = write {
                let matched = batches
                    .iter()
                    .any(|b| b.id.as_ref() == Some(id) && b.revision == *revision);
                if !matched {
                    return Err(RepoError::Conflict(
                        "conflict: batch revision moved".into(),
                    ));
                }
            }
        }

        for write in writes {
            match write {
                StockWrite::BatchRemaining {
                    id,
                    remaining,
                    remaining_packages,
                    ..
                } => {
                    let batch = batches
                        .iter_mut()
                        .find(|b| b.id.as_ref() == Some(&id))
                        .expect("guard validated above");
                    batch.remaining = remaining;
                    batch.remaining_packages = remaining_packages;
                    batch.revision += 1;
                }
                StockWrite::DeleteSale { id } => {
                    sales.retain(|s| s.id.as_ref() != Some(&id));
                }
            }
        }
        Ok(())
    }
}
