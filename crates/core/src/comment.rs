//! Timestamped review comments.
//!
//! A comment is anchored to a millisecond on an asset's timeline; its frame
//! number is always derived from that timestamp and the asset frame rate.
//! Every mutation returns a new value, so callers never observe a half-applied
//! change (a resolved comment without its resolver, for example).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::annotation::{CommentAnnotation, CommentType};
use crate::error::CoreError;
use crate::media::MediaAsset;
use crate::timecode::{self, FrameRate};
use crate::types::{new_id, EntityId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length for a comment's text content.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Maximum number of tags on one comment.
pub const MAX_TAGS_PER_COMMENT: usize = 20;

// ---------------------------------------------------------------------------
// Status, priority, resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Active,
    Resolved,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
        }
    }
}

/// Ordinal priority: `normal < important < critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    Important,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Important => "important",
            Self::Critical => "critical",
        }
    }
}

/// Resolution state. The resolver and the resolution time exist only together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    #[default]
    Active,
    Resolved {
        resolved_at: Timestamp,
        resolved_by: UserId,
    },
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: EntityId,
    pub asset_id: EntityId,
    pub author_id: UserId,
    /// Set on replies. Threads are one level deep.
    pub parent_id: Option<EntityId>,
    timestamp_ms: i64,
    frame_number: i64,
    pub content: String,
    pub annotation: CommentAnnotation,
    pub resolution: Resolution,
    pub priority: Priority,
    pub mentions: BTreeSet<UserId>,
    pub tags: Vec<String>,
    pub reactions: BTreeMap<String, u32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Comment {
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn frame_number(&self) -> i64 {
        self.frame_number
    }

    pub fn comment_type(&self) -> CommentType {
        self.annotation.comment_type()
    }

    pub fn status(&self) -> CommentStatus {
        match self.resolution {
            Resolution::Active => CommentStatus::Active,
            Resolution::Resolved { .. } => CommentStatus::Resolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status() == CommentStatus::Resolved
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn resolved_at(&self) -> Option<Timestamp> {
        match &self.resolution {
            Resolution::Resolved { resolved_at, .. } => Some(*resolved_at),
            Resolution::Active => None,
        }
    }

    pub fn resolved_by(&self) -> Option<&str> {
        match &self.resolution {
            Resolution::Resolved { resolved_by, .. } => Some(resolved_by),
            Resolution::Active => None,
        }
    }

    /// Recompute the frame number for a new frame rate.
    ///
    /// Used when a new media version changes the rate; the timestamp stays put.
    pub fn reframe(&self, frame_rate: FrameRate) -> Result<Self, CoreError> {
        let mut updated = self.clone();
        updated.frame_number = timecode::to_frame_number(self.timestamp_ms, frame_rate)?;
        Ok(updated)
    }

    /// Replace the text content.
    pub fn edit_content(&self, content: &str) -> Result<Self, CoreError> {
        let mut updated = self.clone();
        updated.content = validate_content(content)?;
        updated.updated_at = chrono::Utc::now();
        Ok(updated)
    }

    /// SMPTE timecode of the comment's anchor.
    pub fn timecode(&self, frame_rate: FrameRate) -> Result<String, CoreError> {
        timecode::to_smpte(self.timestamp_ms, frame_rate)
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Input for a new top-level comment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub author_id: UserId,
    pub timestamp_ms: i64,
    pub content: String,
    #[serde(default)]
    pub annotation: CommentAnnotation,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub mentions: BTreeSet<UserId>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewComment {
    /// A normal-priority point comment.
    pub fn new(author_id: impl Into<UserId>, timestamp_ms: i64, content: impl Into<String>) -> Self {
        Self {
            author_id: author_id.into(),
            timestamp_ms,
            content: content.into(),
            annotation: CommentAnnotation::Point,
            priority: Priority::Normal,
            mentions: BTreeSet::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: CommentAnnotation) -> Self {
        self.annotation = annotation;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_mentions<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UserId>,
    {
        self.mentions = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

fn validate_content(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyContent { field: "content" });
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::ContentTooLong {
            field: "content",
            max: MAX_COMMENT_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}

fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, CoreError> {
    let mut seen = BTreeSet::new();
    let mut normalized = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && seen.insert(tag.clone()) {
            normalized.push(tag);
        }
    }
    if normalized.len() > MAX_TAGS_PER_COMMENT {
        return Err(CoreError::ContentTooLong {
            field: "tags",
            max: MAX_TAGS_PER_COMMENT,
        });
    }
    Ok(normalized)
}

/// Create a comment anchored at `input.timestamp_ms` on `asset`.
pub fn create_comment(asset: &MediaAsset, input: NewComment) -> Result<Comment, CoreError> {
    if !asset.allow_comments {
        return Err(CoreError::CommentsDisabled);
    }
    asset.check_bounds(input.timestamp_ms)?;
    let content = validate_content(&input.content)?;
    input.annotation.validate()?;
    let tags = normalize_tags(input.tags)?;
    let frame_number = asset.frame_at(input.timestamp_ms)?;

    let now = chrono::Utc::now();
    Ok(Comment {
        id: new_id(),
        asset_id: asset.id,
        author_id: input.author_id,
        parent_id: None,
        timestamp_ms: input.timestamp_ms,
        frame_number,
        content,
        annotation: input.annotation,
        resolution: Resolution::Active,
        priority: input.priority,
        mentions: input.mentions,
        tags,
        reactions: BTreeMap::new(),
        created_at: now,
        updated_at: now,
    })
}

/// Reply to a top-level comment. The reply sits at the parent's timestamp.
pub fn add_reply(
    parent: &Comment,
    author_id: impl Into<UserId>,
    content: &str,
) -> Result<Comment, CoreError> {
    if parent.is_reply() {
        return Err(CoreError::NestedReplyNotAllowed);
    }
    let content = validate_content(content)?;

    let now = chrono::Utc::now();
    Ok(Comment {
        id: new_id(),
        asset_id: parent.asset_id,
        author_id: author_id.into(),
        parent_id: Some(parent.id),
        timestamp_ms: parent.timestamp_ms,
        frame_number: parent.frame_number,
        content,
        annotation: CommentAnnotation::Text,
        resolution: Resolution::Active,
        priority: Priority::Normal,
        mentions: BTreeSet::new(),
        tags: Vec::new(),
        reactions: BTreeMap::new(),
        created_at: now,
        updated_at: now,
    })
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Toggle a comment between active and resolved.
///
/// Resolving stamps the resolver and time; reopening clears both. Applying
/// the toggle twice yields the original comment.
pub fn resolve_comment(comment: &Comment, actor: impl Into<UserId>) -> Comment {
    resolve_comment_at(comment, actor, chrono::Utc::now())
}

/// [`resolve_comment`] with an explicit clock.
pub fn resolve_comment_at(comment: &Comment, actor: impl Into<UserId>, at: Timestamp) -> Comment {
    let resolution = match comment.resolution {
        Resolution::Active => Resolution::Resolved {
            resolved_at: at,
            resolved_by: actor.into(),
        },
        Resolution::Resolved { .. } => Resolution::Active,
    };
    Comment {
        resolution,
        ..comment.clone()
    }
}

/// Add one reaction. Blank reaction symbols are ignored.
pub fn react(comment: &Comment, emoji: &str) -> Comment {
    let mut updated = comment.clone();
    let emoji = emoji.trim();
    if !emoji.is_empty() {
        *updated.reactions.entry(emoji.to_string()).or_insert(0) += 1;
    }
    updated
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

/// Replies to `parent_id`, oldest first.
pub fn replies_to(comments: &[Comment], parent_id: EntityId) -> Vec<&Comment> {
    let mut replies: Vec<&Comment> = comments
        .iter()
        .filter(|c| c.parent_id == Some(parent_id))
        .collect();
    replies.sort_by_key(|c| c.created_at);
    replies
}

/// Top-level comments only.
pub fn top_level(comments: &[Comment]) -> Vec<&Comment> {
    comments.iter().filter(|c| !c.is_reply()).collect()
}

/// Remove a comment and, when it is a thread root, all of its replies.
///
/// Returns the removed records (the comment first) so the caller can delete
/// them from storage. An unknown id removes nothing.
pub fn remove_with_replies(comments: &mut Vec<Comment>, id: EntityId) -> Vec<Comment> {
    let Some(position) = comments.iter().position(|c| c.id == id) else {
        return Vec::new();
    };
    let target = comments.remove(position);

    let mut removed = vec![target];
    let mut kept = Vec::with_capacity(comments.len());
    for comment in comments.drain(..) {
        if comment.parent_id == Some(id) {
            removed.push(comment);
        } else {
            kept.push(comment);
        }
    }
    *comments = kept;
    removed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
