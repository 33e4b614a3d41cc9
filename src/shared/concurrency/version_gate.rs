// Strict optimistic concurrency for low traffic resources.
//
// Responsibilities
// - Apply a patch only when the caller's claimed version is the stored version.
// - Tell a missing record apart from a stale claim.
// - Bump the version by exactly one inside the same transaction as the check.

use crate::shared::application::errors::ApplicationError;
use crate::shared::core::record::{RecordPatch, VersionedRecord};
use crate::shared::infrastructure::entity_repository::{EntityRepository, RepositoryTransaction};
use chrono::Utc;

pub struct VersionGate<'a, TRepository> {
    repository: &'a TRepository,
}

impl<'a, TRepository> VersionGate<'a, TRepository> {
    pub fn new(repository: &'a TRepository) -> Self {
        Self { repository }
    }

    pub async fn apply_if_version_matches<R>(
        &self,
        id: &str,
        expected_version: Option<u64>,
        patch: &R::Patch,
    ) -> Result<R, ApplicationError>
    where
        R: VersionedRecord,
        TRepository: EntityRepository<R>,
    {
        let expected = expected_version.ok_or(ApplicationError::VersionRequired)?;
        let mut tx = self.repository.begin().await?;

        let Some(mut record) = tx.find_by_id_and_version(id, expected).await? else {
            return Err(mismatch::<R, _>(&mut tx, id, expected).await);
        };

        patch.apply_to(&mut record);
        record.validate().map_err(ApplicationError::Invalid)?;
        record.advance(Utc::now().timestamp_millis());

        if !tx.update_if_version(&record, expected).await? {
            return Err(mismatch::<R, _>(&mut tx, id, expected).await);
        }
        tx.commit().await?;

        tracing::debug!(
            kind = R::KIND,
            id,
            version = record.version(),
            "strict update committed"
        );
        Ok(record)
    }
}

async fn mismatch<R, TTransaction>(
    tx: &mut TTransaction,
    id: &str,
    expected: u64,
) -> ApplicationError
where
    R: VersionedRecord,
    TTransaction: RepositoryTransaction<R>,
{
    match tx.find_by_id(id).await {
        Ok(None) => ApplicationError::not_found(R::KIND, id),
        Ok(Some(current)) => ApplicationError::VersionConflict {
            kind: R::KIND,
            id: id.to_string(),
            expected,
            actual: current.version(),
        },
        Err(error) => error.into(),
    }
}
