//! Reviewable media assets.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timecode::{self, FrameRate};
use crate::types::{new_id, EntityId, Timestamp, UserId};

/// Review status of a media asset, mirrored from its latest review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetReviewStatus {
    #[default]
    Pending,
    InProgress,
    Approved,
    Rejected,
}

/// Technical description of one uploaded media file.
///
/// Carried by the asset for its current version and snapshotted into every
/// revision so versions can be compared later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSpec {
    pub source: String,
    pub duration_ms: i64,
    pub frame_rate: FrameRate,
    pub width: u32,
    pub height: u32,
}

impl MediaSpec {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.duration_ms < 0 {
            return Err(CoreError::InvalidTimestamp(self.duration_ms));
        }
        self.frame_rate.validate()
    }
}

/// One reviewable media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: EntityId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    pub duration_ms: i64,
    pub frame_rate: FrameRate,
    pub width: u32,
    pub height: u32,
    /// Starts at 0 and increases by exactly one per accepted upload.
    pub version: u32,
    pub review_status: AssetReviewStatus,
    pub allow_comments: bool,
    pub allow_downloads: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for registering a new media asset.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMediaAsset {
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub media: MediaSpec,
    #[serde(default = "default_true")]
    pub allow_comments: bool,
    #[serde(default)]
    pub allow_downloads: bool,
}

fn default_true() -> bool {
    true
}

impl MediaAsset {
    /// Register a new asset at version 0.
    pub fn new(input: NewMediaAsset) -> Result<Self, CoreError> {
        input.media.validate()?;
        let title = input.title.trim();
        if title.is_empty() {
            return Err(CoreError::EmptyContent { field: "title" });
        }

        let now = chrono::Utc::now();
        Ok(Self {
            id: new_id(),
            owner_id: input.owner_id,
            title: title.to_string(),
            description: input.description,
            source: input.media.source,
            duration_ms: input.media.duration_ms,
            frame_rate: input.media.frame_rate,
            width: input.media.width,
            height: input.media.height,
            version: 0,
            review_status: AssetReviewStatus::Pending,
            allow_comments: input.allow_comments,
            allow_downloads: input.allow_downloads,
            created_at: now,
            updated_at: now,
        })
    }

    /// Technical metadata of the current version.
    pub fn media_spec(&self) -> MediaSpec {
        MediaSpec {
            source: self.source.clone(),
            duration_ms: self.duration_ms,
            frame_rate: self.frame_rate,
            width: self.width,
            height: self.height,
        }
    }

    /// Replace the current media with a newly uploaded version.
    pub(crate) fn apply_media(&mut self, media: MediaSpec, version: u32, at: Timestamp) {
        self.source = media.source;
        self.duration_ms = media.duration_ms;
        self.frame_rate = media.frame_rate;
        self.width = media.width;
        self.height = media.height;
        self.version = version;
        self.updated_at = at;
    }

    /// Check that `timestamp_ms` addresses a point inside this asset.
    pub fn check_bounds(&self, timestamp_ms: i64) -> Result<(), CoreError> {
        if timestamp_ms < 0 || timestamp_ms > self.duration_ms {
            return Err(CoreError::OutOfBounds {
                timestamp_ms,
                duration_ms: self.duration_ms,
            });
        }
        Ok(())
    }

    /// Frame index at `timestamp_ms` using this asset's frame rate.
    pub fn frame_at(&self, timestamp_ms: i64) -> Result<i64, CoreError> {
        timecode::to_frame_number(timestamp_ms, self.frame_rate)
    }

    /// Total number of frames in the current version.
    pub fn total_frames(&self) -> Result<i64, CoreError> {
        timecode::to_frame_number(self.duration_ms, self.frame_rate)
    }

    /// Clamp a transport position to the asset's timeline.
    pub fn clamp_time(&self, timestamp_ms: i64) -> i64 {
        timestamp_ms.clamp(0, self.duration_ms.max(0))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A 596-second 24 fps asset with comments enabled.
    pub fn demo_asset() -> MediaAsset {
        MediaAsset::new(NewMediaAsset {
            owner_id: "owner".to_string(),
            title: "Product Demo".to_string(),
            description: None,
            media: MediaSpec {
                source: "media://demo-v0.mp4".to_string(),
                duration_ms: 596_000,
                frame_rate: FrameRate::FPS_24,
                width: 1920,
                height: 1080,
            },
            allow_comments: true,
            allow_downloads: false,
        })
        .unwrap()
    }
}
