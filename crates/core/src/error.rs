/// Broad class of a [`CoreError`].
///
/// Validation errors mean the caller supplied data that breaks an entity
/// invariant. State errors mean the operation is not valid for the entity's
/// current state. Neither is ever retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    State,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    // -- Validation ---------------------------------------------------------
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    #[error("Invalid timestamp: {0} ms must not be negative")]
    InvalidTimestamp(i64),

    #[error("Invalid timecode '{timecode}': {reason}")]
    InvalidTimecode { timecode: String, reason: String },

    #[error("Timestamp {timestamp_ms} ms is outside the media range 0..={duration_ms} ms")]
    OutOfBounds { timestamp_ms: i64, duration_ms: i64 },

    #[error("{field} must not be empty")]
    EmptyContent { field: &'static str },

    #[error("{field} exceeds maximum length of {max} characters")]
    ContentTooLong { field: &'static str, max: usize },

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Required approvers must be at least 1, got {0}")]
    InvalidApproverCount(i64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // -- State --------------------------------------------------------------
    #[error("Comments are disabled for this media asset")]
    CommentsDisabled,

    #[error("Cannot reply to a reply; threads are limited to one level")]
    NestedReplyNotAllowed,

    #[error("Review session is closed ({status})")]
    SessionClosed { status: &'static str },

    #[error("Cannot {action} a review session in state '{from}'")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("User '{0}' has already approved this review session")]
    DuplicateApproval(String),

    #[error("An upload is already in progress for this media asset")]
    UploadInProgress,

    #[error("Upload ticket is not the in-flight upload for this media asset")]
    StaleUpload,
}

impl CoreError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFrameRate(_) => "INVALID_FRAME_RATE",
            Self::InvalidTimestamp(_) => "INVALID_TIMESTAMP",
            Self::InvalidTimecode { .. } => "INVALID_TIMECODE",
            Self::OutOfBounds { .. } => "OUT_OF_BOUNDS",
            Self::EmptyContent { .. } => "EMPTY_CONTENT",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidAnnotation(_) => "INVALID_ANNOTATION",
            Self::InvalidApproverCount(_) => "INVALID_APPROVER_COUNT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CommentsDisabled => "COMMENTS_DISABLED",
            Self::NestedReplyNotAllowed => "NESTED_REPLY_NOT_ALLOWED",
            Self::SessionClosed { .. } => "SESSION_CLOSED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::DuplicateApproval(_) => "DUPLICATE_APPROVAL",
            Self::UploadInProgress => "UPLOAD_IN_PROGRESS",
            Self::StaleUpload => "STALE_UPLOAD",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidFrameRate(_)
            | Self::InvalidTimestamp(_)
            | Self::InvalidTimecode { .. }
            | Self::OutOfBounds { .. }
            | Self::EmptyContent { .. }
            | Self::ContentTooLong { .. }
            | Self::InvalidAnnotation(_)
            | Self::InvalidApproverCount(_)
            | Self::InvalidConfig(_) => ErrorCategory::Validation,
            Self::CommentsDisabled
            | Self::NestedReplyNotAllowed
            | Self::SessionClosed { .. }
            | Self::InvalidTransition { .. }
            | Self::DuplicateApproval(_)
            | Self::UploadInProgress
            | Self::StaleUpload => ErrorCategory::State,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_categorized() {
        assert_eq!(
            CoreError::InvalidTimestamp(-1).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            CoreError::EmptyContent { field: "content" }.category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn state_errors_are_categorized() {
        assert_eq!(CoreError::UploadInProgress.category(), ErrorCategory::State);
        assert_eq!(
            CoreError::DuplicateApproval("u1".into()).category(),
            ErrorCategory::State
        );
    }

    #[test]
    fn messages_carry_context() {
        let err = CoreError::OutOfBounds {
            timestamp_ms: 700_000,
            duration_ms: 596_000,
        };
        assert!(err.to_string().contains("700000"));
        assert!(err.to_string().contains("596000"));
        assert_eq!(err.code(), "OUT_OF_BOUNDS");
    }

    #[test]
    fn transition_message_names_state_and_action() {
        let err = CoreError::InvalidTransition {
            from: "approved",
            action: "start",
        };
        assert_eq!(
            err.to_string(),
            "Cannot start a review session in state 'approved'"
        );
    }
}
