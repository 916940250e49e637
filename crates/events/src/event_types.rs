//! Dot-separated names of the events published by the review store.

pub const COMMENT_CREATED: &str = "comment.created";
pub const COMMENT_RESOLVED: &str = "comment.resolved";
pub const COMMENT_REOPENED: &str = "comment.reopened";
pub const COMMENT_DELETED: &str = "comment.deleted";

pub const MARKER_CREATED: &str = "marker.created";

pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_STARTED: &str = "session.started";
pub const SESSION_APPROVAL_RECORDED: &str = "session.approval_recorded";
pub const SESSION_APPROVED: &str = "session.approved";
pub const SESSION_REJECTED: &str = "session.rejected";

pub const REVISION_UPLOADED: &str = "revision.uploaded";

pub const ASSET_DELETED: &str = "asset.deleted";

/// Entity kinds used as [`ReviewEvent::source_entity_type`](crate::ReviewEvent).
pub mod entity {
    pub const ASSET: &str = "asset";
    pub const COMMENT: &str = "comment";
    pub const MARKER: &str = "marker";
    pub const SESSION: &str = "review_session";
}
