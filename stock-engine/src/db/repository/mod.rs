//! Repository Module
//!
//! CRUD surfaces over the SurrealDB tables. The engine's transactional
//! commit lives in `stock::store`, not here; repositories cover the
//! non-transactional reads and the external collaborators' write surfaces.

pub mod batch;
pub mod movement;
pub mod sale;

// Re-exports
pub use batch::BatchRepository;
pub use movement::MovementRepository;
pub use sale::SaleRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // A THROW inside a guarded transaction surfaces as a plain query
        // error; classify by message.
        if msg.contains("conflict") {
            RepoError::Conflict(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
