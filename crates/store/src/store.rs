//! The shared review store.
//!
//! Each entity kind lives in its own `RwLock`ed map. Locks are always taken
//! in the order assets, revisions, comments, markers, sessions, and domain
//! rules are evaluated by `framenote_core` on plain values.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use framenote_core::comment::{self, Comment, NewComment};
use framenote_core::config::ReviewConfig;
use framenote_core::error::CoreError;
use framenote_core::marker::{self, Marker, NewMarker};
use framenote_core::media::{MediaAsset, MediaSpec, NewMediaAsset};
use framenote_core::query::{self, CommentQuery, CommentStats};
use framenote_core::review::{self, NewReviewSession, ReviewSession, SessionStatus};
use framenote_core::revision::{self, DiffSummary, Revision, RevisionHistory};
use framenote_core::timecode::FrameRate;
use framenote_core::types::{EntityId, Timestamp, UserId};
use framenote_events::event_types::{self, entity};
use framenote_events::{EventBus, ReviewEvent};
use serde_json::json;

use crate::error::{StoreError, StoreResult};
use crate::snapshot::AssetSnapshot;
use crate::upload::UploadGuard;

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| StoreError::LockPoisoned)
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| StoreError::LockPoisoned)
}

/// Copy a session's outcome onto its asset. Caller holds the assets write lock.
fn mirror_review_status(assets: &mut HashMap<EntityId, MediaAsset>, session: &ReviewSession) {
    if let Some(asset) = assets.get_mut(&session.asset_id) {
        asset.review_status = session.asset_review_status();
        asset.updated_at = session.updated_at;
    }
}

/// In-memory store of review state, safe to share via `Arc<ReviewStore>`.
pub struct ReviewStore {
    config: ReviewConfig,
    events: Arc<EventBus>,
    assets: RwLock<HashMap<EntityId, MediaAsset>>,
    revisions: RwLock<HashMap<EntityId, RevisionHistory>>,
    comments: RwLock<HashMap<EntityId, Comment>>,
    markers: RwLock<HashMap<EntityId, Marker>>,
    sessions: RwLock<HashMap<EntityId, ReviewSession>>,
    /// Assets with an upload in flight.
    uploads: Mutex<HashSet<EntityId>>,
}

impl ReviewStore {
    /// Create a store with its own event bus sized from `config`.
    pub fn new(config: ReviewConfig) -> Self {
        let events = Arc::new(EventBus::new(config.event_bus_capacity));
        Self::with_event_bus(config, events)
    }

    pub fn with_event_bus(config: ReviewConfig, events: Arc<EventBus>) -> Self {
        Self {
            config,
            events,
            assets: RwLock::new(HashMap::new()),
            revisions: RwLock::new(HashMap::new()),
            comments: RwLock::new(HashMap::new()),
            markers: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            uploads: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    fn publish(
        &self,
        event_type: &str,
        asset_id: EntityId,
        source: (&str, EntityId),
        actor: &str,
        payload: serde_json::Value,
    ) {
        self.events.publish(
            ReviewEvent::new(event_type)
                .with_asset(asset_id)
                .with_source(source.0, source.1)
                .with_actor(actor)
                .with_payload(payload),
        );
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// Register a new asset at version 0 with its initial revision.
    pub fn create_asset(&self, input: NewMediaAsset) -> StoreResult<MediaAsset> {
        let asset = MediaAsset::new(input)?;
        {
            let mut assets = write(&self.assets)?;
            let mut revisions = write(&self.revisions)?;
            revisions.insert(asset.id, RevisionHistory::new(&asset));
            assets.insert(asset.id, asset.clone());
        }
        tracing::info!(
            asset_id = %asset.id,
            owner_id = %asset.owner_id,
            frame_rate = %asset.frame_rate,
            "Media asset registered",
        );
        Ok(asset)
    }

    pub fn get_asset(&self, asset_id: EntityId) -> StoreResult<MediaAsset> {
        read(&self.assets)?
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))
    }

    /// All assets, oldest first.
    pub fn list_assets(&self) -> StoreResult<Vec<MediaAsset>> {
        let mut assets: Vec<MediaAsset> = read(&self.assets)?.values().cloned().collect();
        assets.sort_by_key(|a| (a.created_at, a.id));
        Ok(assets)
    }

    pub fn set_permissions(
        &self,
        asset_id: EntityId,
        allow_comments: bool,
        allow_downloads: bool,
    ) -> StoreResult<MediaAsset> {
        let mut assets = write(&self.assets)?;
        let asset = assets
            .get_mut(&asset_id)
            .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))?;
        asset.allow_comments = allow_comments;
        asset.allow_downloads = allow_downloads;
        asset.updated_at = chrono::Utc::now();
        Ok(asset.clone())
    }

    /// Delete an asset and everything anchored to it.
    pub fn delete_asset(&self, asset_id: EntityId, actor_id: &str) -> StoreResult<()> {
        let (comments_removed, markers_removed, sessions_removed) = {
            let mut assets = write(&self.assets)?;
            let mut revisions = write(&self.revisions)?;
            let mut comments = write(&self.comments)?;
            let mut markers = write(&self.markers)?;
            let mut sessions = write(&self.sessions)?;

            if assets.remove(&asset_id).is_none() {
                return Err(StoreError::not_found("MediaAsset", asset_id));
            }
            revisions.remove(&asset_id);

            let before = (comments.len(), markers.len(), sessions.len());
            comments.retain(|_, c| c.asset_id != asset_id);
            markers.retain(|_, m| m.asset_id != asset_id);
            sessions.retain(|_, s| s.asset_id != asset_id);
            (
                before.0 - comments.len(),
                before.1 - markers.len(),
                before.2 - sessions.len(),
            )
        };

        tracing::info!(
            asset_id = %asset_id,
            comments_removed,
            markers_removed,
            sessions_removed,
            "Media asset deleted",
        );
        self.publish(
            event_types::ASSET_DELETED,
            asset_id,
            (entity::ASSET, asset_id),
            actor_id,
            json!({
                "comments_removed": comments_removed,
                "markers_removed": markers_removed,
                "sessions_removed": sessions_removed,
            }),
        );
        Ok(())
    }

    fn ensure_asset(&self, asset_id: EntityId) -> StoreResult<()> {
        if read(&self.assets)?.contains_key(&asset_id) {
            Ok(())
        } else {
            Err(StoreError::not_found("MediaAsset", asset_id))
        }
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    pub fn add_comment(&self, asset_id: EntityId, input: NewComment) -> StoreResult<Comment> {
        // The asset read lock is held until the insert so a concurrent upload
        // cannot change the frame rate under the new comment.
        let assets = read(&self.assets)?;
        let asset = assets
            .get(&asset_id)
            .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))?;
        let comment = comment::create_comment(asset, input)?;
        write(&self.comments)?.insert(comment.id, comment.clone());
        drop(assets);

        tracing::info!(
            comment_id = %comment.id,
            asset_id = %asset_id,
            frame = comment.frame_number(),
            priority = ?comment.priority,
            "Comment created",
        );
        self.publish(
            event_types::COMMENT_CREATED,
            asset_id,
            (entity::COMMENT, comment.id),
            &comment.author_id,
            json!({
                "timestamp_ms": comment.timestamp_ms(),
                "frame_number": comment.frame_number(),
                "mentions": comment.mentions,
            }),
        );
        Ok(comment)
    }

    pub fn get_comment(&self, comment_id: EntityId) -> StoreResult<Comment> {
        read(&self.comments)?
            .get(&comment_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Comment", comment_id))
    }

    pub fn reply_to_comment(
        &self,
        parent_id: EntityId,
        author_id: &str,
        content: &str,
    ) -> StoreResult<Comment> {
        let asset_id = self.get_comment(parent_id)?.asset_id;

        let assets = read(&self.assets)?;
        let asset = assets
            .get(&asset_id)
            .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))?;
        if !asset.allow_comments {
            return Err(CoreError::CommentsDisabled.into());
        }

        let reply = {
            let mut comments = write(&self.comments)?;
            let parent = comments
                .get(&parent_id)
                .ok_or_else(|| StoreError::not_found("Comment", parent_id))?;
            let reply = comment::add_reply(parent, author_id, content)?;
            comments.insert(reply.id, reply.clone());
            reply
        };
        drop(assets);

        tracing::info!(comment_id = %reply.id, parent_id = %parent_id, "Reply created");
        self.publish(
            event_types::COMMENT_CREATED,
            asset_id,
            (entity::COMMENT, reply.id),
            author_id,
            json!({ "parent_id": parent_id }),
        );
        Ok(reply)
    }

    /// Apply `f` to one comment under the write lock and store the result.
    fn update_comment<F>(&self, comment_id: EntityId, f: F) -> StoreResult<Comment>
    where
        F: FnOnce(&Comment) -> Result<Comment, CoreError>,
    {
        let mut comments = write(&self.comments)?;
        let current = comments
            .get_mut(&comment_id)
            .ok_or_else(|| StoreError::not_found("Comment", comment_id))?;
        let updated = f(current)?;
        *current = updated.clone();
        Ok(updated)
    }

    /// Toggle a comment between active and resolved.
    pub fn toggle_resolved(&self, comment_id: EntityId, actor_id: &str) -> StoreResult<Comment> {
        let updated =
            self.update_comment(comment_id, |c| Ok(comment::resolve_comment(c, actor_id)))?;

        let event_type = if updated.is_resolved() {
            event_types::COMMENT_RESOLVED
        } else {
            event_types::COMMENT_REOPENED
        };
        tracing::info!(
            comment_id = %comment_id,
            actor_id,
            status = updated.status().as_str(),
            "Comment resolution toggled",
        );
        self.publish(
            event_type,
            updated.asset_id,
            (entity::COMMENT, comment_id),
            actor_id,
            json!({ "status": updated.status().as_str() }),
        );
        Ok(updated)
    }

    pub fn react(&self, comment_id: EntityId, emoji: &str) -> StoreResult<Comment> {
        self.update_comment(comment_id, |c| Ok(comment::react(c, emoji)))
    }

    pub fn edit_comment(&self, comment_id: EntityId, content: &str) -> StoreResult<Comment> {
        self.update_comment(comment_id, |c| c.edit_content(content))
    }

    /// Delete a comment together with its replies. Returns the removed records.
    pub fn delete_comment(&self, comment_id: EntityId, actor_id: &str) -> StoreResult<Vec<Comment>> {
        let removed = {
            let mut comments = write(&self.comments)?;
            let target = comments
                .remove(&comment_id)
                .ok_or_else(|| StoreError::not_found("Comment", comment_id))?;
            let reply_ids: Vec<EntityId> = comments
                .values()
                .filter(|c| c.parent_id == Some(comment_id))
                .map(|c| c.id)
                .collect();
            let mut removed = vec![target];
            removed.extend(reply_ids.iter().filter_map(|id| comments.remove(id)));
            removed
        };

        let asset_id = removed[0].asset_id;
        tracing::info!(
            comment_id = %comment_id,
            replies_removed = removed.len() - 1,
            "Comment deleted",
        );
        self.publish(
            event_types::COMMENT_DELETED,
            asset_id,
            (entity::COMMENT, comment_id),
            actor_id,
            json!({ "replies_removed": removed.len() - 1 }),
        );
        Ok(removed)
    }

    /// Comments on an asset in creation order.
    pub fn comments_for(&self, asset_id: EntityId) -> StoreResult<Vec<Comment>> {
        self.ensure_asset(asset_id)?;
        let mut comments: Vec<Comment> = read(&self.comments)?
            .values()
            .filter(|c| c.asset_id == asset_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    /// The reviewer's filtered and sorted comment list.
    pub fn query_comments(
        &self,
        asset_id: EntityId,
        comment_query: &CommentQuery,
    ) -> StoreResult<Vec<Comment>> {
        let comments = self.comments_for(asset_id)?;
        let view = comment_query.apply(&comments);
        tracing::debug!(
            asset_id = %asset_id,
            status = ?comment_query.status,
            sort = ?comment_query.sort,
            total = comments.len(),
            shown = view.len(),
            "Comment query",
        );
        Ok(view)
    }

    /// Comments within the configured window of the playhead, in timeline order.
    pub fn comments_near(&self, asset_id: EntityId, current_ms: i64) -> StoreResult<Vec<Comment>> {
        let comments = query::sort(&self.comments_for(asset_id)?, query::SortKey::Timestamp);
        Ok(
            query::near_playhead_sorted(&comments, current_ms, self.config.near_playhead_window_ms)
                .to_vec(),
        )
    }

    pub fn comment_stats(&self, asset_id: EntityId) -> StoreResult<CommentStats> {
        Ok(CommentStats::compute(&self.comments_for(asset_id)?))
    }

    // -----------------------------------------------------------------------
    // Markers
    // -----------------------------------------------------------------------

    pub fn add_marker(&self, asset_id: EntityId, input: NewMarker) -> StoreResult<Marker> {
        let assets = read(&self.assets)?;
        let asset = assets
            .get(&asset_id)
            .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))?;
        let marker = marker::create_marker(asset, input)?;
        write(&self.markers)?.insert(marker.id, marker.clone());
        drop(assets);

        tracing::info!(
            marker_id = %marker.id,
            asset_id = %asset_id,
            marker_type = ?marker.marker_type,
            "Marker created",
        );
        self.publish(
            event_types::MARKER_CREATED,
            asset_id,
            (entity::MARKER, marker.id),
            &marker.author_id,
            json!({ "timestamp_ms": marker.timestamp_ms, "title": marker.title }),
        );
        Ok(marker)
    }

    /// Markers on an asset in timeline order.
    pub fn markers_for(&self, asset_id: EntityId) -> StoreResult<Vec<Marker>> {
        self.ensure_asset(asset_id)?;
        let mut markers: Vec<Marker> = read(&self.markers)?
            .values()
            .filter(|m| m.asset_id == asset_id)
            .cloned()
            .collect();
        markers.sort_by_key(|m| (m.created_at, m.id));
        Ok(marker::sorted_markers(&markers))
    }

    // -----------------------------------------------------------------------
    // Review sessions
    // -----------------------------------------------------------------------

    /// Open a draft session. A missing approver count takes the configured
    /// default.
    pub fn create_session(
        &self,
        asset_id: EntityId,
        mut input: NewReviewSession,
    ) -> StoreResult<ReviewSession> {
        input
            .required_approvers
            .get_or_insert(self.config.default_required_approvers);

        let assets = read(&self.assets)?;
        let asset = assets
            .get(&asset_id)
            .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))?;
        let session = review::create_session(asset, input)?;
        drop(assets);
        write(&self.sessions)?.insert(session.id, session.clone());

        tracing::info!(
            session_id = %session.id,
            asset_id = %asset_id,
            required_approvers = session.required_approvers(),
            "Review session created",
        );
        self.publish(
            event_types::SESSION_CREATED,
            asset_id,
            (entity::SESSION, session.id),
            &session.created_by,
            json!({
                "title": session.title,
                "required_approvers": session.required_approvers(),
                "due_date": session.due_date,
            }),
        );
        Ok(session)
    }

    pub fn get_session(&self, session_id: EntityId) -> StoreResult<ReviewSession> {
        read(&self.sessions)?
            .get(&session_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("ReviewSession", session_id))
    }

    /// Sessions on an asset, oldest first.
    pub fn sessions_for(&self, asset_id: EntityId) -> StoreResult<Vec<ReviewSession>> {
        self.ensure_asset(asset_id)?;
        let mut sessions: Vec<ReviewSession> = read(&self.sessions)?
            .values()
            .filter(|s| s.asset_id == asset_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.created_at, s.id));
        Ok(sessions)
    }

    /// Sessions in review whose due date has passed.
    pub fn overdue_sessions(&self, now: Timestamp) -> StoreResult<Vec<ReviewSession>> {
        Ok(read(&self.sessions)?
            .values()
            .filter(|s| s.is_overdue(now))
            .cloned()
            .collect())
    }

    /// Apply a transition and mirror the result onto the asset.
    ///
    /// The assets lock is held across the transition so the asset always
    /// reflects the most recent session change.
    fn update_session<F>(&self, session_id: EntityId, f: F) -> StoreResult<ReviewSession>
    where
        F: FnOnce(&ReviewSession) -> Result<ReviewSession, CoreError>,
    {
        let mut assets = write(&self.assets)?;
        let mut sessions = write(&self.sessions)?;
        let current = sessions
            .get_mut(&session_id)
            .ok_or_else(|| StoreError::not_found("ReviewSession", session_id))?;
        let updated = f(current)?;
        *current = updated.clone();
        mirror_review_status(&mut assets, &updated);
        Ok(updated)
    }

    pub fn start_review(&self, session_id: EntityId, actor_id: &str) -> StoreResult<ReviewSession> {
        let session = self.update_session(session_id, ReviewSession::start_review)?;

        tracing::info!(session_id = %session_id, actor_id, "Review session started");
        self.publish(
            event_types::SESSION_STARTED,
            session.asset_id,
            (entity::SESSION, session_id),
            actor_id,
            json!({}),
        );
        Ok(session)
    }

    /// Record one approval.
    ///
    /// Compare-and-swap keyed by the approver set: the new session is computed
    /// from a snapshot and only stored if no other writer changed the
    /// approvers or status in between. Lost races are retried from a fresh
    /// snapshot up to `max_approval_retries` times.
    pub fn record_approval(&self, session_id: EntityId, approver_id: &str) -> StoreResult<ReviewSession> {
        let attempts = self.config.max_approval_retries.max(1);
        for attempt in 1..=attempts {
            let snapshot = self.get_session(session_id)?;
            let updated = snapshot.record_approval(approver_id)?;

            let swapped = {
                let mut assets = write(&self.assets)?;
                let mut sessions = write(&self.sessions)?;
                let current = sessions
                    .get_mut(&session_id)
                    .ok_or_else(|| StoreError::not_found("ReviewSession", session_id))?;
                let unchanged = current.status() == snapshot.status()
                    && current.approvers() == snapshot.approvers();
                if unchanged {
                    *current = updated.clone();
                    if updated.status() == SessionStatus::Approved {
                        mirror_review_status(&mut assets, &updated);
                    }
                }
                unchanged
            };

            if swapped {
                self.after_approval(&updated, approver_id)?;
                return Ok(updated);
            }
            tracing::warn!(
                session_id = %session_id,
                approver_id,
                attempt,
                "Approval raced a concurrent update, retrying",
            );
        }

        tracing::warn!(session_id = %session_id, approver_id, attempts, "Approval retries exhausted");
        Err(StoreError::Conflict {
            session_id,
            attempts,
        })
    }

    fn after_approval(&self, session: &ReviewSession, approver_id: &str) -> StoreResult<()> {
        tracing::info!(
            session_id = %session.id,
            approver_id,
            approvals = session.approval_count(),
            required = session.required_approvers(),
            "Approval recorded",
        );
        self.publish(
            event_types::SESSION_APPROVAL_RECORDED,
            session.asset_id,
            (entity::SESSION, session.id),
            approver_id,
            json!({
                "approval_count": session.approval_count(),
                "required_approvers": session.required_approvers(),
            }),
        );

        if session.status() == SessionStatus::Approved {
            tracing::info!(session_id = %session.id, "Review session approved");
            self.publish(
                event_types::SESSION_APPROVED,
                session.asset_id,
                (entity::SESSION, session.id),
                approver_id,
                json!({ "approvers": session.approvers() }),
            );
        }
        Ok(())
    }

    pub fn reject(&self, session_id: EntityId, actor_id: &str, reason: &str) -> StoreResult<ReviewSession> {
        let session = self.update_session(session_id, |s| s.reject(actor_id, reason))?;

        tracing::info!(
            session_id = %session_id,
            actor_id,
            approvals = session.approval_count(),
            "Review session rejected",
        );
        self.publish(
            event_types::SESSION_REJECTED,
            session.asset_id,
            (entity::SESSION, session_id),
            actor_id,
            json!({ "reason": session.rejection().and_then(|r| r.reason.clone()) }),
        );
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Revisions
    // -----------------------------------------------------------------------

    /// Claim the upload slot of an asset.
    ///
    /// Fails with `UploadInProgress` while another guard for the same asset
    /// is alive.
    pub fn begin_upload(&self, asset_id: EntityId, uploaded_by: &str) -> StoreResult<UploadGuard<'_>> {
        self.ensure_asset(asset_id)?;
        let claimed = self
            .uploads
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .insert(asset_id);
        if !claimed {
            tracing::warn!(asset_id = %asset_id, uploaded_by, "Upload rejected, another is in progress");
            return Err(CoreError::UploadInProgress.into());
        }
        tracing::debug!(asset_id = %asset_id, uploaded_by, "Upload started");
        Ok(UploadGuard::new(self, asset_id, UserId::from(uploaded_by)))
    }

    pub(crate) fn release_upload(&self, asset_id: EntityId) {
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&asset_id);
    }

    /// Record a new version that keeps the asset's current media metadata.
    pub fn add_revision(
        &self,
        asset_id: EntityId,
        uploaded_by: &str,
        notes: Option<String>,
    ) -> StoreResult<Revision> {
        let guard = self.begin_upload(asset_id, uploaded_by)?;
        let media = self.get_asset(asset_id)?.media_spec();
        guard.complete(media, notes)
    }

    pub(crate) fn commit_upload(
        &self,
        asset_id: EntityId,
        uploaded_by: &str,
        media: MediaSpec,
        notes: Option<String>,
    ) -> StoreResult<Revision> {
        let (revision, reframed) = {
            let mut assets = write(&self.assets)?;
            let mut revisions = write(&self.revisions)?;
            let asset = assets
                .get_mut(&asset_id)
                .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))?;
            let history = revisions
                .get_mut(&asset_id)
                .ok_or_else(|| StoreError::not_found("RevisionHistory", asset_id))?;

            let previous_rate = asset.frame_rate;
            let ticket = history.begin_upload(uploaded_by)?;
            let revision = history.complete_upload(ticket, asset, media, notes)?;

            let reframed = if asset.frame_rate != previous_rate {
                self.reframe_comments(asset_id, asset.frame_rate)?
            } else {
                0
            };
            (revision, reframed)
        };

        tracing::info!(
            asset_id = %asset_id,
            version = revision.version,
            uploaded_by,
            reframed_comments = reframed,
            "Revision uploaded",
        );
        self.publish(
            event_types::REVISION_UPLOADED,
            asset_id,
            (entity::ASSET, asset_id),
            uploaded_by,
            json!({ "version": revision.version, "notes": revision.notes }),
        );
        Ok(revision)
    }

    /// Recompute frame numbers of an asset's comments. Caller holds the
    /// asset write lock.
    fn reframe_comments(&self, asset_id: EntityId, frame_rate: FrameRate) -> StoreResult<usize> {
        let mut comments = write(&self.comments)?;
        let mut count = 0;
        for c in comments.values_mut().filter(|c| c.asset_id == asset_id) {
            *c = c.reframe(frame_rate)?;
            count += 1;
        }
        Ok(count)
    }

    /// Revisions of an asset ascending by version, starting at revision 0.
    pub fn revisions(&self, asset_id: EntityId) -> StoreResult<Vec<Revision>> {
        read(&self.revisions)?
            .get(&asset_id)
            .map(|h| h.list_revisions().to_vec())
            .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))
    }

    /// Compare two versions of an asset, listing comments resolved between
    /// their uploads.
    pub fn compare_revisions(
        &self,
        asset_id: EntityId,
        from_version: u32,
        to_version: u32,
    ) -> StoreResult<DiffSummary> {
        let (from, to) = {
            let revisions = read(&self.revisions)?;
            let history = revisions
                .get(&asset_id)
                .ok_or_else(|| StoreError::not_found("MediaAsset", asset_id))?;
            let lookup = |version| {
                history
                    .get(version)
                    .cloned()
                    .ok_or(StoreError::RevisionNotFound { asset_id, version })
            };
            (lookup(from_version)?, lookup(to_version)?)
        };
        let comments = self.comments_for(asset_id)?;
        let resolved = revision::resolved_between(&comments, &from, &to);
        Ok(revision::compare(&from, &to, resolved))
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    pub fn snapshot(&self, asset_id: EntityId) -> StoreResult<AssetSnapshot> {
        Ok(AssetSnapshot {
            asset: self.get_asset(asset_id)?,
            comments: self.comments_for(asset_id)?,
            markers: self.markers_for(asset_id)?,
            sessions: self.sessions_for(asset_id)?,
            revisions: self.revisions(asset_id)?,
        })
    }
}

impl Default for ReviewStore {
    fn default() -> Self {
        Self::new(ReviewConfig::default())
    }
}
