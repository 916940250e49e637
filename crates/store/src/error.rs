use framenote_core::error::CoreError;
use framenote_core::types::EntityId;

/// Errors returned by [`ReviewStore`](crate::ReviewStore).
///
/// Wraps [`CoreError`] for domain rule violations and adds lookup and
/// coordination failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Revision {version} of asset {asset_id} not found")]
    RevisionNotFound { asset_id: EntityId, version: u32 },

    /// Concurrent writers kept changing the approver set until the retry
    /// budget ran out.
    #[error("Approval on session {session_id} conflicted {attempts} times; try again")]
    Conflict { session_id: EntityId, attempts: u32 },

    #[error("Review store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Stable machine-readable code, delegating to [`CoreError::code`].
    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(core) => core.code(),
            Self::NotFound { .. } | Self::RevisionNotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::LockPoisoned => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: EntityId) -> Self {
        Self::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_code() {
        let err = StoreError::from(CoreError::UploadInProgress);
        assert_eq!(err.code(), "UPLOAD_IN_PROGRESS");
        assert_eq!(err.to_string(), CoreError::UploadInProgress.to_string());
    }

    #[test]
    fn not_found_names_entity() {
        let id = uuid::Uuid::nil();
        let err = StoreError::not_found("Comment", id);
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().starts_with("Comment with id"));
    }
}
