use crate::shared::application::errors::ApplicationError;
use crate::shared::concurrency::auto_merge::AutoMergeResolver;
use crate::shared::concurrency::version_gate::VersionGate;
use crate::shared::core::record::VersionedRecord;
use crate::shared::infrastructure::entity_repository::EntityRepository;

/// What an update does when its claimed version is not the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Fail with `VersionConflict`.
    RejectOnConflict,
    /// Apply the patch on top of the latest state.
    MergeOnConflict,
}

impl ConflictPolicy {
    pub async fn apply<R, TRepository>(
        self,
        repository: &TRepository,
        id: &str,
        claimed_version: Option<u64>,
        patch: &R::Patch,
    ) -> Result<R, ApplicationError>
    where
        R: VersionedRecord,
        TRepository: EntityRepository<R>,
    {
        match self {
            Self::RejectOnConflict => {
                VersionGate::new(repository)
                    .apply_if_version_matches(id, claimed_version, patch)
                    .await
            }
            Self::MergeOnConflict => {
                AutoMergeResolver::new(repository)
                    .merge_update(id, claimed_version, patch)
                    .await
            }
        }
    }
}
