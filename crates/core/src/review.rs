//! Multi-approver review sessions.
//!
//! Lifecycle: `draft -> in_progress -> {approved, rejected}`. The last two
//! states are terminal. A session approves itself inside the call that records
//! the final required approval; rejection is allowed at any approval count.
//!
//! Transition rules:
//! - `draft`       -> `in_progress` (start)
//! - `in_progress` -> `approved` (automatic on the Nth distinct approval)
//! - `in_progress` -> `rejected` (reject)
//!
//! Every operation returns a new session or an error. The input session is
//! never modified, so a failed call leaves nothing half-applied.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::media::{AssetReviewStatus, MediaAsset};
use crate::types::{new_id, EntityId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Approvals required when the creator does not say otherwise.
pub const DEFAULT_REQUIRED_APPROVERS: u32 = 2;

/// Maximum length for a session title.
pub const MAX_SESSION_TITLE_LENGTH: usize = 200;

/// Maximum length for a rejection reason.
pub const MAX_REJECTION_REASON_LENGTH: usize = 2_000;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    InProgress,
    Approved,
    Rejected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Statuses reachable from this one.
    pub fn valid_transitions(&self) -> &'static [SessionStatus] {
        match self {
            Self::Draft => &[Self::InProgress],
            Self::InProgress => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    pub fn can_transition(&self, to: SessionStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

/// Why and by whom a session was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub rejected_by: UserId,
    pub reason: Option<String>,
    pub rejected_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSession {
    pub id: EntityId,
    pub asset_id: EntityId,
    pub created_by: UserId,
    pub title: String,
    pub description: Option<String>,
    status: SessionStatus,
    pub due_date: Option<Timestamp>,
    required_approvers: u32,
    approval_count: u32,
    approvers: BTreeSet<UserId>,
    pub is_public: bool,
    rejection: Option<Rejection>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for a new review session.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReviewSession {
    pub created_by: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Falls back to [`DEFAULT_REQUIRED_APPROVERS`] (or the configured
    /// default at the store level) when absent.
    #[serde(default)]
    pub required_approvers: Option<u32>,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub is_public: bool,
}

impl NewReviewSession {
    pub fn new(created_by: impl Into<UserId>, title: impl Into<String>, required_approvers: u32) -> Self {
        Self {
            created_by: created_by.into(),
            title: title.into(),
            description: None,
            required_approvers: Some(required_approvers),
            due_date: None,
            is_public: false,
        }
    }

    pub fn with_due_date(mut self, due_date: Timestamp) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Open a new session for `asset` in the `draft` state.
pub fn create_session(
    asset: &MediaAsset,
    input: NewReviewSession,
) -> Result<ReviewSession, CoreError> {
    let required = input
        .required_approvers
        .unwrap_or(DEFAULT_REQUIRED_APPROVERS);
    if required < 1 {
        return Err(CoreError::InvalidApproverCount(i64::from(required)));
    }

    let title = input.title.trim();
    if title.is_empty() {
        return Err(CoreError::EmptyContent { field: "title" });
    }
    if title.chars().count() > MAX_SESSION_TITLE_LENGTH {
        return Err(CoreError::ContentTooLong {
            field: "title",
            max: MAX_SESSION_TITLE_LENGTH,
        });
    }

    let now = chrono::Utc::now();
    Ok(ReviewSession {
        id: new_id(),
        asset_id: asset.id,
        created_by: input.created_by,
        title: title.to_string(),
        description: input.description.filter(|d| !d.trim().is_empty()),
        status: SessionStatus::Draft,
        due_date: input.due_date,
        required_approvers: required,
        approval_count: 0,
        approvers: BTreeSet::new(),
        is_public: input.is_public,
        rejection: None,
        created_at: now,
        updated_at: now,
    })
}

impl ReviewSession {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn required_approvers(&self) -> u32 {
        self.required_approvers
    }

    pub fn approval_count(&self) -> u32 {
        self.approval_count
    }

    pub fn approvers(&self) -> &BTreeSet<UserId> {
        &self.approvers
    }

    pub fn has_approved(&self, user_id: &str) -> bool {
        self.approvers.contains(user_id)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        self.rejection.as_ref()
    }

    fn closed_error(&self) -> CoreError {
        CoreError::SessionClosed {
            status: self.status.as_str(),
        }
    }

    /// `draft -> in_progress`.
    pub fn start_review(&self) -> Result<Self, CoreError> {
        if !self.status.can_transition(SessionStatus::InProgress) {
            return Err(CoreError::InvalidTransition {
                from: self.status.as_str(),
                action: "start",
            });
        }
        Ok(Self {
            status: SessionStatus::InProgress,
            updated_at: chrono::Utc::now(),
            ..self.clone()
        })
    }

    /// Count one approval from `approver_id`.
    ///
    /// The session becomes `approved` in this same call once the count
    /// reaches `required_approvers`.
    pub fn record_approval(&self, approver_id: &str) -> Result<Self, CoreError> {
        match self.status {
            SessionStatus::Approved | SessionStatus::Rejected => return Err(self.closed_error()),
            SessionStatus::Draft => {
                return Err(CoreError::InvalidTransition {
                    from: self.status.as_str(),
                    action: "approve",
                })
            }
            SessionStatus::InProgress => {}
        }
        if self.approvers.contains(approver_id) {
            return Err(CoreError::DuplicateApproval(approver_id.to_string()));
        }

        let mut approvers = self.approvers.clone();
        approvers.insert(approver_id.to_string());
        let approval_count = approvers.len() as u32;
        let status = if approval_count >= self.required_approvers {
            SessionStatus::Approved
        } else {
            SessionStatus::InProgress
        };

        Ok(Self {
            status,
            approval_count,
            approvers,
            updated_at: chrono::Utc::now(),
            ..self.clone()
        })
    }

    /// Close the session as rejected, whatever the approval count.
    pub fn reject(&self, actor_id: &str, reason: &str) -> Result<Self, CoreError> {
        match self.status {
            SessionStatus::Approved | SessionStatus::Rejected => return Err(self.closed_error()),
            SessionStatus::Draft => {
                return Err(CoreError::InvalidTransition {
                    from: self.status.as_str(),
                    action: "reject",
                })
            }
            SessionStatus::InProgress => {}
        }

        let reason = reason.trim();
        if reason.chars().count() > MAX_REJECTION_REASON_LENGTH {
            return Err(CoreError::ContentTooLong {
                field: "reason",
                max: MAX_REJECTION_REASON_LENGTH,
            });
        }

        let now = chrono::Utc::now();
        Ok(Self {
            status: SessionStatus::Rejected,
            rejection: Some(Rejection {
                rejected_by: actor_id.to_string(),
                reason: (!reason.is_empty()).then(|| reason.to_string()),
                rejected_at: now,
            }),
            updated_at: now,
            ..self.clone()
        })
    }

    /// Past the due date while still in review. Display-only; never changes
    /// the session state.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        self.status == SessionStatus::InProgress && self.due_date.is_some_and(|due| now > due)
    }

    /// Fraction of required approvals collected, in `[0, 1]`.
    pub fn approval_progress(&self) -> f64 {
        f64::from(self.approval_count) / f64::from(self.required_approvers.max(1))
    }

    pub fn remaining_approvals(&self) -> u32 {
        self.required_approvers.saturating_sub(self.approval_count)
    }

    /// The asset review status this session implies.
    pub fn asset_review_status(&self) -> AssetReviewStatus {
        match self.status {
            SessionStatus::Draft => AssetReviewStatus::Pending,
            SessionStatus::InProgress => AssetReviewStatus::InProgress,
            SessionStatus::Approved => AssetReviewStatus::Approved,
            SessionStatus::Rejected => AssetReviewStatus::Rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::fixtures::demo_asset;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn started(required: u32) -> ReviewSession {
        let asset = demo_asset();
        create_session(&asset, NewReviewSession::new("u1", "Round 2", required))
            .unwrap()
            .start_review()
            .unwrap()
    }

    // -- transitions table --------------------------------------------------

    #[test]
    fn transition_table() {
        assert!(SessionStatus::Draft.can_transition(SessionStatus::InProgress));
        assert!(!SessionStatus::Draft.can_transition(SessionStatus::Approved));
        assert!(SessionStatus::InProgress.can_transition(SessionStatus::Rejected));
        assert!(SessionStatus::Approved.valid_transitions().is_empty());
        assert!(SessionStatus::Rejected.is_terminal());
        assert!(!SessionStatus::InProgress.is_terminal());
    }

    // -- create_session -----------------------------------------------------

    #[test]
    fn create_starts_in_draft() {
        let asset = demo_asset();
        let session = create_session(&asset, NewReviewSession::new("u1", "Round 1", 3)).unwrap();
        assert_eq!(session.status(), SessionStatus::Draft);
        assert_eq!(session.approval_count(), 0);
        assert_eq!(session.required_approvers(), 3);
        assert_eq!(session.asset_id, asset.id);
    }

    #[test]
    fn create_with_zero_approvers_rejected() {
        let asset = demo_asset();
        assert_matches!(
            create_session(&asset, NewReviewSession::new("u1", "Round 1", 0)),
            Err(CoreError::InvalidApproverCount(0))
        );
    }

    #[test]
    fn create_defaults_required_approvers() {
        let asset = demo_asset();
        let mut input = NewReviewSession::new("u1", "Round 1", 1);
        input.required_approvers = None;
        let session = create_session(&asset, input).unwrap();
        assert_eq!(session.required_approvers(), DEFAULT_REQUIRED_APPROVERS);
    }

    #[test]
    fn create_with_blank_title_rejected() {
        let asset = demo_asset();
        assert_matches!(
            create_session(&asset, NewReviewSession::new("u1", " ", 1)),
            Err(CoreError::EmptyContent { field: "title" })
        );
    }

    // -- start_review -------------------------------------------------------

    #[test]
    fn start_only_from_draft() {
        let session = started(2);
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_matches!(
            session.start_review(),
            Err(CoreError::InvalidTransition { from: "in_progress", action: "start" })
        );
    }

    // -- record_approval ----------------------------------------------------

    #[test]
    fn approval_in_draft_rejected() {
        let asset = demo_asset();
        let draft = create_session(&asset, NewReviewSession::new("u1", "Round 1", 1)).unwrap();
        assert_matches!(
            draft.record_approval("u2"),
            Err(CoreError::InvalidTransition { from: "draft", .. })
        );
    }

    #[test]
    fn two_approvals_approve_round_two() {
        let session = started(2);
        let one = session.record_approval("u1").unwrap();
        assert_eq!(one.status(), SessionStatus::InProgress);
        let two = one.record_approval("u2").unwrap();
        assert_eq!(two.status(), SessionStatus::Approved);
        assert_eq!(two.approval_count(), 2);
        assert_eq!(two.asset_review_status(), AssetReviewStatus::Approved);
    }

    #[test]
    fn three_required_approves_exactly_on_third() {
        let mut session = started(3);
        for (i, approver) in ["a", "b", "c"].iter().enumerate() {
            assert_eq!(session.status(), SessionStatus::InProgress, "approved early at {i}");
            session = session.record_approval(approver).unwrap();
        }
        assert_eq!(session.status(), SessionStatus::Approved);
        assert_eq!(session.approval_count(), 3);
    }

    #[test]
    fn duplicate_approval_leaves_count_unchanged() {
        let session = started(3).record_approval("u1").unwrap();
        assert_matches!(
            session.record_approval("u1"),
            Err(CoreError::DuplicateApproval(ref id)) if id == "u1"
        );
        assert_eq!(session.approval_count(), 1);
        assert!(session.has_approved("u1"));
    }

    #[test]
    fn approval_after_close_rejected() {
        let approved = started(1).record_approval("u1").unwrap();
        assert_matches!(
            approved.record_approval("u2"),
            Err(CoreError::SessionClosed { status: "approved" })
        );
        assert_matches!(
            approved.reject("u2", "late"),
            Err(CoreError::SessionClosed { status: "approved" })
        );
    }

    // -- reject -------------------------------------------------------------

    #[test]
    fn reject_succeeds_at_any_partial_count() {
        for approvals in 0..3 {
            let mut session = started(3);
            for i in 0..approvals {
                session = session.record_approval(&format!("approver-{i}")).unwrap();
            }
            let rejected = session.reject("lead", "Audio is out of sync").unwrap();
            assert_eq!(rejected.status(), SessionStatus::Rejected);
            assert_eq!(rejected.approval_count(), approvals);
            let rejection = rejected.rejection().unwrap();
            assert_eq!(rejection.rejected_by, "lead");
            assert_eq!(rejection.reason.as_deref(), Some("Audio is out of sync"));
        }
    }

    #[test]
    fn rejected_session_is_closed() {
        let rejected = started(2).reject("lead", "").unwrap();
        assert!(rejected.rejection().unwrap().reason.is_none());
        assert_matches!(
            rejected.record_approval("u1"),
            Err(CoreError::SessionClosed { status: "rejected" })
        );
    }

    #[test]
    fn reject_in_draft_rejected() {
        let asset = demo_asset();
        let draft = create_session(&asset, NewReviewSession::new("u1", "Round 1", 1)).unwrap();
        assert_matches!(
            draft.reject("u1", "nope"),
            Err(CoreError::InvalidTransition { from: "draft", action: "reject" })
        );
    }

    // -- derived facts ------------------------------------------------------

    #[test]
    fn overdue_only_while_in_progress() {
        let asset = demo_asset();
        let due = Utc::now() - Duration::days(1);
        let draft = create_session(
            &asset,
            NewReviewSession::new("u1", "Round 1", 1).with_due_date(due),
        )
        .unwrap();
        let now = Utc::now();
        assert!(!draft.is_overdue(now));

        let in_progress = draft.start_review().unwrap();
        assert!(in_progress.is_overdue(now));
        assert_eq!(in_progress.status(), SessionStatus::InProgress);

        let approved = in_progress.record_approval("u2").unwrap();
        assert!(!approved.is_overdue(now));
    }

    #[test]
    fn progress_and_remaining() {
        let session = started(4).record_approval("u1").unwrap();
        assert_eq!(session.remaining_approvals(), 3);
        assert!((session.approval_progress() - 0.25).abs() < f64::EPSILON);
    }
}
