// Merge policy for high traffic resources.
//
// Purpose
// - Never reject a client because it edited from a stale version.
//
// Responsibilities
// - Re-read the latest record inside the caller's serializer slot.
// - Apply only the fields the client sent, recheck the merged record, bump the version, persist.
// - Log the divergence when the claimed version is behind.
//
// Boundaries
// - Callers run this inside `KeyedSerializer::run` for the record's key. Without that, two merges
//   on the same record may still commit in either order, but neither is lost.

use crate::shared::application::errors::ApplicationError;
use crate::shared::core::record::{RecordPatch, VersionedRecord};
use crate::shared::infrastructure::entity_repository::{
    EntityRepository, RepositoryError, RepositoryTransaction,
};
use chrono::Utc;
use std::cmp::Ordering;

pub struct AutoMergeResolver<'a, TRepository> {
    repository: &'a TRepository,
}

impl<'a, TRepository> AutoMergeResolver<'a, TRepository> {
    pub fn new(repository: &'a TRepository) -> Self {
        Self { repository }
    }

    pub async fn merge_update<R>(
        &self,
        id: &str,
        claimed_version: Option<u64>,
        patch: &R::Patch,
    ) -> Result<R, ApplicationError>
    where
        R: VersionedRecord,
        TRepository: EntityRepository<R>,
    {
        let claimed = claimed_version.ok_or(ApplicationError::VersionRequired)?;
        let mut tx = self.repository.begin().await?;

        let mut record = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(R::KIND, id))?;
        let current = record.version();

        match current.cmp(&claimed) {
            Ordering::Greater => tracing::info!(
                kind = R::KIND,
                id,
                claimed_version = claimed,
                current_version = current,
                fields = ?patch.changed_fields(),
                "merging stale update onto latest state"
            ),
            Ordering::Less => tracing::warn!(
                kind = R::KIND,
                id,
                claimed_version = claimed,
                current_version = current,
                "claimed version is ahead of the stored version"
            ),
            Ordering::Equal => {}
        }

        patch.apply_to(&mut record);
        record.validate().map_err(ApplicationError::Invalid)?;
        record.advance(Utc::now().timestamp_millis());

        if !tx.update_if_version(&record, current).await? {
            return Err(RepositoryError::Backend(format!(
                "{} {id} changed outside of its serializer slot",
                R::KIND
            ))
            .into());
        }
        tx.commit().await?;
        Ok(record)
    }
}
