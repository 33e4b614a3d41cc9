// In memory implementation of the EntityRepository port.
//
// Purpose
// - Support service and handler tests and local development without a database.
//
// Responsibilities
// - Store records per identifier in memory.
// - Run transactions with serializable isolation by holding the table write lock until the
//   transaction is committed or dropped.
// - Simulate an unavailable backend and slow input or output for tests.

use crate::shared::core::record::VersionedRecord;
use crate::shared::infrastructure::entity_repository::{
    EntityRepository, RepositoryError, RepositoryTransaction,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

pub struct InMemoryEntityRepository<R: VersionedRecord> {
    rows: Arc<RwLock<HashMap<String, R>>>,
    is_offline: bool,
    delay_ms: AtomicU64,
}

impl<R: VersionedRecord> Default for InMemoryEntityRepository<R> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            is_offline: false,
            delay_ms: AtomicU64::new(0),
        }
    }
}

impl<R: VersionedRecord> InMemoryEntityRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    /// Delays every transactional read, as a remote store would.
    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::Relaxed);
    }

    fn ensure_online(&self) -> Result<(), RepositoryError> {
        if self.is_offline {
            return Err(RepositoryError::Backend("Repository offline".into()));
        }
        Ok(())
    }
}

pub struct InMemoryTransaction<R: VersionedRecord> {
    rows: OwnedRwLockWriteGuard<HashMap<String, R>>,
    staged: HashMap<String, R>,
    delay: Duration,
}

impl<R: VersionedRecord> InMemoryTransaction<R> {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn current(&self, id: &str) -> Option<&R> {
        self.staged.get(id).or_else(|| self.rows.get(id))
    }
}

#[async_trait::async_trait]
impl<R: VersionedRecord> EntityRepository<R> for InMemoryEntityRepository<R> {
    type Transaction = InMemoryTransaction<R>;

    async fn begin(&self) -> Result<Self::Transaction, RepositoryError> {
        self.ensure_online()?;
        let rows = self.rows.clone().write_owned().await;
        Ok(InMemoryTransaction {
            rows,
            staged: HashMap::new(),
            delay: Duration::from_millis(self.delay_ms.load(Ordering::Relaxed)),
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<R>, RepositoryError> {
        self.ensure_online()?;
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<R>, RepositoryError> {
        self.ensure_online()?;
        let guard = self.rows.read().await;
        let mut items: Vec<R> = guard.values().cloned().collect();
        items.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn insert(&self, record: R) -> Result<(), RepositoryError> {
        self.ensure_online()?;
        let mut guard = self.rows.write().await;
        if guard.contains_key(record.id()) {
            return Err(RepositoryError::Duplicate {
                id: record.id().to_string(),
            });
        }
        guard.insert(record.id().to_string(), record);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        self.ensure_online()?;
        Ok(self.rows.write().await.remove(id).is_some())
    }
}

#[async_trait::async_trait]
impl<R: VersionedRecord> RepositoryTransaction<R> for InMemoryTransaction<R> {
    async fn find_by_id(&mut self, id: &str) -> Result<Option<R>, RepositoryError> {
        self.pause().await;
        Ok(self.current(id).cloned())
    }

    async fn find_by_id_and_version(
        &mut self,
        id: &str,
        version: u64,
    ) -> Result<Option<R>, RepositoryError> {
        self.pause().await;
        Ok(self
            .current(id)
            .filter(|record| record.version() == version)
            .cloned())
    }

    async fn update_if_version(
        &mut self,
        record: &R,
        expected_version: u64,
    ) -> Result<bool, RepositoryError> {
        let matches = self
            .current(record.id())
            .is_some_and(|stored| stored.version() == expected_version);
        if matches {
            self.staged.insert(record.id().to_string(), record.clone());
        }
        Ok(matches)
    }

    async fn commit(mut self) -> Result<(), RepositoryError> {
        for (id, record) in self.staged.drain() {
            self.rows.insert(id, record);
        }
        Ok(())
    }
}
