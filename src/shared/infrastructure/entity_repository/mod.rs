// Entity repository port.
//
// Purpose
// - Describe the transactional store the concurrency layer runs against, without implementing it.
//
// Responsibilities
// - Plain reads, inserts and deletes outside of a transaction.
// - Transactions with filtered reads and a conditional (compare-and-swap) update.
//
// Boundaries
// - No concrete input or output here. A database adapter implements these traits; the in memory
//   adapter backs tests and local development.

pub mod in_memory;

use crate::shared::core::record::VersionedRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record {id} already exists")]
    Duplicate { id: String },

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait EntityRepository<R: VersionedRecord>: Send + Sync {
    type Transaction: RepositoryTransaction<R>;

    /// Starts a transaction. Dropping it without `commit` discards its writes.
    async fn begin(&self) -> Result<Self::Transaction, RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<R>, RepositoryError>;
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<R>, RepositoryError>;
    async fn insert(&self, record: R) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait RepositoryTransaction<R: VersionedRecord>: Send {
    async fn find_by_id(&mut self, id: &str) -> Result<Option<R>, RepositoryError>;

    async fn find_by_id_and_version(
        &mut self,
        id: &str,
        version: u64,
    ) -> Result<Option<R>, RepositoryError>;

    /// Writes `record` only if the stored version still equals `expected_version`.
    /// Returns `false` when the record is missing or was moved past that version.
    async fn update_if_version(
        &mut self,
        record: &R,
        expected_version: u64,
    ) -> Result<bool, RepositoryError>;

    async fn commit(self) -> Result<(), RepositoryError>;
}
