//! Store contracts and SQLite persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for each record type.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Each store exclusively owns its persisted records.
//! - A single insert/update/delete is atomic with respect to other mutations
//!   on the same key.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;

pub mod catalog_repo;
pub mod rating_repo;
pub mod recommendation_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer failure shared by every store.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn count_to_u32(table: &str, value: i64) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid row count `{value}` in {table}")))
}
