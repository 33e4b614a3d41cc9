// Resource service orchestrating the write flow of one versioned resource.
//
// Responsibilities
// - Build and insert new records from validated drafts.
// - Route every update and delete through the keyed serializer, keyed by resource and id.
// - Apply the resource's conflict policy inside the serialized slot.

use crate::shared::application::errors::ApplicationError;
use crate::shared::concurrency::conflict_policy::ConflictPolicy;
use crate::shared::core::record::{RecordPatch, VersionedRecord};
use crate::shared::infrastructure::entity_repository::EntityRepository;
use crate::shared::infrastructure::keyed_serializer::KeyedSerializer;
use chrono::Utc;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

pub struct RecordService<R, TRepository>
where
    R: VersionedRecord,
    TRepository: EntityRepository<R> + 'static,
{
    repository: Arc<TRepository>,
    serializer: Arc<KeyedSerializer<String>>,
    policy: ConflictPolicy,
    _record: PhantomData<fn() -> R>,
}

impl<R, TRepository> RecordService<R, TRepository>
where
    R: VersionedRecord,
    TRepository: EntityRepository<R> + 'static,
{
    pub fn new(
        repository: Arc<TRepository>,
        serializer: Arc<KeyedSerializer<String>>,
        policy: ConflictPolicy,
    ) -> Self {
        Self {
            repository,
            serializer,
            policy,
            _record: PhantomData,
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Serializer key for a record; namespaced so equal ids of different resources never contend.
    pub fn lock_key(id: &str) -> String {
        format!("{}:{id}", R::KIND)
    }

    pub async fn create(&self, draft: R::Draft) -> Result<R, ApplicationError> {
        let record = R::from_draft(
            Uuid::now_v7().to_string(),
            draft,
            Utc::now().timestamp_millis(),
        )
        .map_err(ApplicationError::Invalid)?;
        self.repository.insert(record.clone()).await?;
        tracing::info!(kind = R::KIND, id = record.id(), "record created");
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Result<R, ApplicationError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(R::KIND, id))
    }

    pub async fn list(&self, offset: u64, limit: u64) -> Result<Vec<R>, ApplicationError> {
        Ok(self
            .repository
            .list(offset, limit.min(MAX_PAGE_SIZE))
            .await?)
    }

    pub async fn update(
        &self,
        id: &str,
        claimed_version: Option<u64>,
        patch: R::Patch,
    ) -> Result<R, ApplicationError> {
        if claimed_version.is_none() {
            return Err(ApplicationError::VersionRequired);
        }
        patch.validate().map_err(ApplicationError::Invalid)?;
        let policy = self.policy;
        let repository = &*self.repository;
        self.serializer
            .run(Self::lock_key(id), || {
                policy.apply::<R, TRepository>(repository, id, claimed_version, &patch)
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApplicationError> {
        let repository = &*self.repository;
        self.serializer
            .run(Self::lock_key(id), || async move {
                if repository.delete(id).await? {
                    tracing::info!(kind = R::KIND, id, "record deleted");
                    Ok(())
                } else {
                    Err(ApplicationError::not_found(R::KIND, id))
                }
            })
            .await
    }
}
