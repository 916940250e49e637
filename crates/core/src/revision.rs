//! Append-only revision history of a media asset.
//!
//! Every accepted upload appends exactly one [`Revision`] and bumps the
//! asset's `version` by one. At most one upload may be in flight per
//! history; a second [`RevisionHistory::begin_upload`] fails with
//! [`CoreError::UploadInProgress`] instead of racing for the next version.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::error::CoreError;
use crate::media::{MediaAsset, MediaSpec};
use crate::timecode::FrameRate;
use crate::types::{new_id, EntityId, Timestamp, UserId};

/// Maximum length for revision change notes.
pub const MAX_REVISION_NOTES_LENGTH: usize = 2_000;

// ---------------------------------------------------------------------------
// Revision
// ---------------------------------------------------------------------------

/// One entry in an asset's version history. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub asset_id: EntityId,
    pub version: u32,
    pub uploaded_at: Timestamp,
    pub uploaded_by: UserId,
    pub notes: Option<String>,
    /// Media metadata of this version, kept for comparisons.
    pub media: MediaSpec,
}

/// Proof that the holder owns the upload slot of one asset.
///
/// Only [`RevisionHistory::begin_upload`] creates tickets, and completing or
/// aborting consumes them.
#[derive(Debug, PartialEq, Eq)]
pub struct UploadTicket {
    id: EntityId,
    asset_id: EntityId,
    uploaded_by: UserId,
    started_at: Timestamp,
}

impl UploadTicket {
    pub fn asset_id(&self) -> EntityId {
        self.asset_id
    }

    pub fn uploaded_by(&self) -> &str {
        &self.uploaded_by
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionHistory {
    asset_id: EntityId,
    revisions: Vec<Revision>,
    #[serde(skip)]
    in_flight: Option<EntityId>,
}

impl RevisionHistory {
    /// Start a history whose first entry is the asset's initial upload.
    pub fn new(asset: &MediaAsset) -> Self {
        Self {
            asset_id: asset.id,
            revisions: vec![Revision {
                asset_id: asset.id,
                version: asset.version,
                uploaded_at: asset.created_at,
                uploaded_by: asset.owner_id.clone(),
                notes: None,
                media: asset.media_spec(),
            }],
            in_flight: None,
        }
    }

    pub fn asset_id(&self) -> EntityId {
        self.asset_id
    }

    /// All revisions, ascending by version. Never empty.
    pub fn list_revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn get(&self, version: u32) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.version == version)
    }

    pub fn latest(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    pub fn upload_in_progress(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Claim the upload slot for this asset.
    pub fn begin_upload(&mut self, uploaded_by: impl Into<UserId>) -> Result<UploadTicket, CoreError> {
        if self.in_flight.is_some() {
            return Err(CoreError::UploadInProgress);
        }
        let ticket = UploadTicket {
            id: new_id(),
            asset_id: self.asset_id,
            uploaded_by: uploaded_by.into(),
            started_at: chrono::Utc::now(),
        };
        self.in_flight = Some(ticket.id);
        Ok(ticket)
    }

    /// Give the upload slot back without recording anything.
    pub fn abort_upload(&mut self, ticket: UploadTicket) -> Result<(), CoreError> {
        self.check_ticket(&ticket)?;
        self.in_flight = None;
        Ok(())
    }

    /// Record the upload held by `ticket` as the next version of `asset`.
    ///
    /// The slot is released whether or not the upload is accepted.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        asset: &mut MediaAsset,
        media: MediaSpec,
        notes: Option<String>,
    ) -> Result<Revision, CoreError> {
        self.check_ticket(&ticket)?;
        self.in_flight = None;
        if asset.id != self.asset_id {
            return Err(CoreError::StaleUpload);
        }

        media.validate()?;
        let notes = normalize_notes(notes)?;

        let version = asset.version + 1;
        let now = chrono::Utc::now();
        let revision = Revision {
            asset_id: asset.id,
            version,
            uploaded_at: now,
            uploaded_by: ticket.uploaded_by,
            notes,
            media: media.clone(),
        };
        asset.apply_media(media, version, now);
        self.revisions.push(revision.clone());
        Ok(revision)
    }

    /// Record a new version of `asset` that keeps its current media metadata.
    pub fn add_revision(
        &mut self,
        asset: &mut MediaAsset,
        uploaded_by: impl Into<UserId>,
        notes: Option<String>,
    ) -> Result<Revision, CoreError> {
        let ticket = self.begin_upload(uploaded_by)?;
        let media = asset.media_spec();
        self.complete_upload(ticket, asset, media, notes)
    }

    /// Compare `version` against the latest revision.
    pub fn compare_with_current(
        &self,
        version: u32,
        resolved_comment_ids: Vec<EntityId>,
    ) -> Option<DiffSummary> {
        let selected = self.get(version)?;
        let current = self.latest()?;
        Some(compare(selected, current, resolved_comment_ids))
    }

    fn check_ticket(&self, ticket: &UploadTicket) -> Result<(), CoreError> {
        if ticket.asset_id != self.asset_id || self.in_flight != Some(ticket.id) {
            return Err(CoreError::StaleUpload);
        }
        Ok(())
    }
}

fn normalize_notes(notes: Option<String>) -> Result<Option<String>, CoreError> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let notes = notes.trim();
    if notes.chars().count() > MAX_REVISION_NOTES_LENGTH {
        return Err(CoreError::ContentTooLong {
            field: "notes",
            max: MAX_REVISION_NOTES_LENGTH,
        });
    }
    Ok((!notes.is_empty()).then(|| notes.to_string()))
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// A value that differs between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<T> {
    pub from: T,
    pub to: T,
}

impl<T: PartialEq> Change<T> {
    fn between(from: T, to: T) -> Option<Self> {
        (from != to).then_some(Self { from, to })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Structural differences between two revisions.
///
/// Only metadata is compared. Which comments were addressed in between is
/// supplied by the caller (see [`resolved_between`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub from_version: u32,
    pub to_version: u32,
    pub duration_ms: Option<Change<i64>>,
    pub resolution: Option<Change<Dimensions>>,
    pub frame_rate: Option<Change<FrameRate>>,
    pub source_changed: bool,
    pub resolved_comment_ids: Vec<EntityId>,
}

impl DiffSummary {
    pub fn has_metadata_changes(&self) -> bool {
        self.duration_ms.is_some() || self.resolution.is_some() || self.frame_rate.is_some()
    }

    /// Duration difference in ms (`to - from`), zero when unchanged.
    pub fn duration_delta_ms(&self) -> i64 {
        self.duration_ms.map_or(0, |c| c.to - c.from)
    }
}

pub fn compare(a: &Revision, b: &Revision, resolved_comment_ids: Vec<EntityId>) -> DiffSummary {
    let dims = |m: &MediaSpec| Dimensions {
        width: m.width,
        height: m.height,
    };
    DiffSummary {
        from_version: a.version,
        to_version: b.version,
        duration_ms: Change::between(a.media.duration_ms, b.media.duration_ms),
        resolution: Change::between(dims(&a.media), dims(&b.media)),
        frame_rate: Change::between(a.media.frame_rate, b.media.frame_rate),
        source_changed: a.media.source != b.media.source,
        resolved_comment_ids,
    }
}

/// Ids of comments resolved between the uploads of `a` and `b`.
///
/// The window is `[earlier.uploaded_at, later.uploaded_at)` whichever order
/// the revisions are given in. Comments reopened since then are not counted.
pub fn resolved_between(comments: &[Comment], a: &Revision, b: &Revision) -> Vec<EntityId> {
    let (start, end) = if a.uploaded_at <= b.uploaded_at {
        (a.uploaded_at, b.uploaded_at)
    } else {
        (b.uploaded_at, a.uploaded_at)
    };
    comments
        .iter()
        .filter(|c| c.resolved_at().is_some_and(|at| at >= start && at < end))
        .map(|c| c.id)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
