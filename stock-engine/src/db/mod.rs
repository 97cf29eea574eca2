//! Database Module
//!
//! 嵌入式 SurrealDB (RocksDB 引擎) 存储层

pub mod models;
pub mod repository;

use crate::config::EngineConfig;
use repository::{RepoError, RepoResult};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Open the embedded database, select namespace/database and apply the
/// schema. The handle is cheap to clone and shared by all repositories.
pub async fn open(config: &EngineConfig) -> RepoResult<Surreal<Db>> {
    let db: Surreal<Db> = Surreal::new::<RocksDb>(config.work_dir.as_str())
        .await
        .map_err(|e| RepoError::Database(format!("Failed to open database: {e}")))?;

    db.use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await
        .map_err(|e| RepoError::Database(format!("Failed to select ns/db: {e}")))?;

    define_schema(&db).await?;

    tracing::info!(work_dir = %config.work_dir, "Stock database opened");
    Ok(db)
}

/// Idempotent schema definition. Tables are schemaless documents; the
/// batch table gets a product index for the allocator's candidate query.
async fn define_schema(db: &Surreal<Db>) -> RepoResult<()> {
    db.query(
        "DEFINE TABLE IF NOT EXISTS batch SCHEMALESS;
         DEFINE INDEX IF NOT EXISTS batch_product ON TABLE batch FIELDS product;
         DEFINE TABLE IF NOT EXISTS sale SCHEMALESS;
         DEFINE TABLE IF NOT EXISTS stock_movement SCHEMALESS;",
    )
    .await
    .map_err(|e| RepoError::Database(format!("Failed to define schema: {e}")))?;
    Ok(())
}
