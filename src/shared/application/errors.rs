use crate::shared::infrastructure::entity_repository::RepositoryError;
use crate::shared::infrastructure::keyed_serializer::OperationTimedOut;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("version is required")]
    VersionRequired,

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("version conflict on {kind} {id}: expected {expected}, actual {actual}")]
    VersionConflict {
        kind: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    TimedOut(#[from] OperationTimedOut),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApplicationError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
