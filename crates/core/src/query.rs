//! Reviewer views over comment sets.
//!
//! Everything here is read-only and allocation-light so it can run on every
//! playhead tick. Sorting is always stable: two renders of the same input
//! never reorder unrelated comments.

use std::cmp::Reverse;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::comment::{Comment, CommentStatus, Priority};
use crate::error::CoreError;

/// Default half-width of the "near the playhead" window.
pub const DEFAULT_NEAR_PLAYHEAD_WINDOW_MS: i64 = 1000;

// ---------------------------------------------------------------------------
// Filter / sort keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Resolved,
}

impl StatusFilter {
    pub fn matches(&self, status: CommentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == CommentStatus::Active,
            Self::Resolved => status == CommentStatus::Resolved,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "resolved" => Ok(Self::Resolved),
            _ => Err(CoreError::InvalidConfig(format!(
                "Invalid status filter '{s}'. Must be one of: all, active, resolved"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Timeline order, ties by creation time.
    #[default]
    Timestamp,
    /// Newest first.
    Created,
    /// Critical first, ties in timeline order.
    Priority,
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(Self::Timestamp),
            "created" => Ok(Self::Created),
            "priority" => Ok(Self::Priority),
            _ => Err(CoreError::InvalidConfig(format!(
                "Invalid sort key '{s}'. Must be one of: timestamp, created, priority"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter and sort
// ---------------------------------------------------------------------------

/// Comments matching both the status filter and the case-insensitive search
/// text. The search is a plain substring of `content`; an empty search
/// matches everything.
pub fn filter(comments: &[Comment], status: StatusFilter, search: &str) -> Vec<Comment> {
    let needle = search.to_lowercase();
    comments
        .iter()
        .filter(|c| status.matches(c.status()))
        .filter(|c| needle.is_empty() || c.content.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Stable sort by `key`.
pub fn sort(comments: &[Comment], key: SortKey) -> Vec<Comment> {
    let mut sorted = comments.to_vec();
    sort_in_place(&mut sorted, key);
    sorted
}

fn sort_in_place(comments: &mut [Comment], key: SortKey) {
    match key {
        SortKey::Timestamp => comments.sort_by_key(|c| (c.timestamp_ms(), c.created_at)),
        SortKey::Created => comments.sort_by_key(|c| Reverse(c.created_at)),
        SortKey::Priority => comments.sort_by_key(|c| (Reverse(c.priority), c.timestamp_ms())),
    }
}

// ---------------------------------------------------------------------------
// Playhead matching
// ---------------------------------------------------------------------------

fn is_near(comment: &Comment, current_ms: i64, window_ms: i64) -> bool {
    window_ms > 0 && comment.timestamp_ms().abs_diff(current_ms) < window_ms.unsigned_abs()
}

/// Every comment with `|timestamp_ms - current_ms| < window_ms`, in input order.
pub fn near_playhead(comments: &[Comment], current_ms: i64, window_ms: i64) -> Vec<Comment> {
    comments
        .iter()
        .filter(|c| is_near(c, current_ms, window_ms))
        .cloned()
        .collect()
}

/// [`near_playhead`] over a slice already sorted by timestamp.
///
/// The matches are contiguous in a sorted slice, so both window edges are
/// found by binary search and the result borrows from the input.
pub fn near_playhead_sorted(sorted: &[Comment], current_ms: i64, window_ms: i64) -> &[Comment] {
    debug_assert!(
        sorted
            .windows(2)
            .all(|w| w[0].timestamp_ms() <= w[1].timestamp_ms()),
        "near_playhead_sorted requires timestamp order"
    );
    if window_ms <= 0 {
        return &[];
    }
    let lower = current_ms.saturating_sub(window_ms);
    let upper = current_ms.saturating_add(window_ms);
    let start = sorted.partition_point(|c| c.timestamp_ms() <= lower);
    let end = sorted.partition_point(|c| c.timestamp_ms() < upper);
    if start >= end {
        return &[];
    }
    &sorted[start..end]
}

/// The comment closest to the playhead within the window, if any.
///
/// Ties go to the comment that appears first in `comments`.
pub fn active_comment(comments: &[Comment], current_ms: i64, window_ms: i64) -> Option<&Comment> {
    comments
        .iter()
        .filter(|c| is_near(c, current_ms, window_ms))
        .min_by_key(|c| c.timestamp_ms().abs_diff(current_ms))
}

/// Comments near the playhead whose payload is drawn over the frame.
pub fn overlay_annotations(comments: &[Comment], current_ms: i64, window_ms: i64) -> Vec<&Comment> {
    comments
        .iter()
        .filter(|c| c.annotation.is_overlay() && is_near(c, current_ms, window_ms))
        .collect()
}

// ---------------------------------------------------------------------------
// Reviewer view
// ---------------------------------------------------------------------------

/// A reviewer's list settings: filter, search and sort together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentQuery {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: SortKey,
}

impl CommentQuery {
    pub fn apply(&self, comments: &[Comment]) -> Vec<Comment> {
        let mut view = filter(comments, self.status, &self.search);
        sort_in_place(&mut view, self.sort);
        view
    }
}

/// Counts shown in the review header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommentStats {
    pub total: usize,
    pub active: usize,
    pub resolved: usize,
    pub critical: usize,
    pub replies: usize,
}

impl CommentStats {
    pub fn compute(comments: &[Comment]) -> Self {
        comments.iter().fold(Self::default(), |mut stats, c| {
            stats.total += 1;
            match c.status() {
                CommentStatus::Active => stats.active += 1,
                CommentStatus::Resolved => stats.resolved += 1,
            }
            if c.priority == Priority::Critical {
                stats.critical += 1;
            }
            if c.is_reply() {
                stats.replies += 1;
            }
            stats
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
