//! Chapter and bookmark markers on the timeline.
//!
//! Markers are lightweight timeline annotations with no resolution state.
//! Chapters split the timeline into named sections; bookmarks flag a moment.

use serde::{Deserialize, Serialize};

use crate::annotation::validate_color_hex;
use crate::error::CoreError;
use crate::media::MediaAsset;
use crate::types::{new_id, EntityId, Timestamp, UserId};

/// Maximum length for a marker title.
pub const MAX_MARKER_TITLE_LENGTH: usize = 200;

/// Color used when the caller does not pick one.
pub const DEFAULT_MARKER_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerType {
    Chapter,
    Bookmark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: EntityId,
    pub asset_id: EntityId,
    pub author_id: UserId,
    pub timestamp_ms: i64,
    pub title: String,
    pub description: Option<String>,
    pub color: String,
    pub marker_type: MarkerType,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for a new marker.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMarker {
    pub author_id: UserId,
    pub timestamp_ms: i64,
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub marker_type: MarkerType,
}

/// Create a marker on `asset`. Markers follow the same comment permission.
pub fn create_marker(asset: &MediaAsset, input: NewMarker) -> Result<Marker, CoreError> {
    if !asset.allow_comments {
        return Err(CoreError::CommentsDisabled);
    }
    asset.check_bounds(input.timestamp_ms)?;

    let title = input.title.trim();
    if title.is_empty() {
        return Err(CoreError::EmptyContent { field: "title" });
    }
    if title.chars().count() > MAX_MARKER_TITLE_LENGTH {
        return Err(CoreError::ContentTooLong {
            field: "title",
            max: MAX_MARKER_TITLE_LENGTH,
        });
    }

    let color = input
        .color
        .unwrap_or_else(|| DEFAULT_MARKER_COLOR.to_string());
    validate_color_hex(&color)?;

    let description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let now = chrono::Utc::now();
    Ok(Marker {
        id: new_id(),
        asset_id: asset.id,
        author_id: input.author_id,
        timestamp_ms: input.timestamp_ms,
        title: title.to_string(),
        description,
        color,
        marker_type: input.marker_type,
        created_at: now,
        updated_at: now,
    })
}

/// Markers in timeline order (stable for equal timestamps).
pub fn sorted_markers(markers: &[Marker]) -> Vec<Marker> {
    let mut sorted = markers.to_vec();
    sorted.sort_by_key(|m| m.timestamp_ms);
    sorted
}

/// The chapter the playhead is in: the last chapter starting at or before
/// `current_ms`.
pub fn chapter_at(markers: &[Marker], current_ms: i64) -> Option<&Marker> {
    markers
        .iter()
        .filter(|m| m.marker_type == MarkerType::Chapter && m.timestamp_ms <= current_ms)
        .max_by_key(|m| m.timestamp_ms)
}

/// First marker strictly after the playhead.
pub fn next_marker(markers: &[Marker], current_ms: i64) -> Option<&Marker> {
    markers
        .iter()
        .filter(|m| m.timestamp_ms > current_ms)
        .min_by_key(|m| m.timestamp_ms)
}

/// Last marker strictly before the playhead.
pub fn previous_marker(markers: &[Marker], current_ms: i64) -> Option<&Marker> {
    markers
        .iter()
        .filter(|m| m.timestamp_ms < current_ms)
        .max_by_key(|m| m.timestamp_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::fixtures::demo_asset;
    use assert_matches::assert_matches;

    fn new_marker(timestamp_ms: i64, title: &str, marker_type: MarkerType) -> NewMarker {
        NewMarker {
            author_id: "u1".to_string(),
            timestamp_ms,
            title: title.to_string(),
            description: None,
            color: None,
            marker_type,
        }
    }

    fn demo_markers() -> Vec<Marker> {
        let asset = demo_asset();
        vec![
            create_marker(&asset, new_marker(95_000, "Review this", MarkerType::Bookmark)).unwrap(),
            create_marker(&asset, new_marker(0, "Intro", MarkerType::Chapter)).unwrap(),
            create_marker(&asset, new_marker(120_000, "Features", MarkerType::Chapter)).unwrap(),
            create_marker(&asset, new_marker(30_000, "Problem", MarkerType::Chapter)).unwrap(),
        ]
    }

    #[test]
    fn create_uses_default_color() {
        let markers = demo_markers();
        assert_eq!(markers[0].color, DEFAULT_MARKER_COLOR);
    }

    #[test]
    fn create_rejects_blank_title() {
        let asset = demo_asset();
        assert_matches!(
            create_marker(&asset, new_marker(0, "  ", MarkerType::Chapter)),
            Err(CoreError::EmptyContent { field: "title" })
        );
    }

    #[test]
    fn create_rejects_bad_color() {
        let asset = demo_asset();
        let mut input = new_marker(0, "Intro", MarkerType::Chapter);
        input.color = Some("red".to_string());
        assert_matches!(create_marker(&asset, input), Err(CoreError::InvalidAnnotation(_)));
    }

    #[test]
    fn create_rejects_out_of_bounds() {
        let asset = demo_asset();
        assert_matches!(
            create_marker(&asset, new_marker(600_000, "Late", MarkerType::Bookmark)),
            Err(CoreError::OutOfBounds { .. })
        );
    }

    #[test]
    fn sorted_by_timestamp() {
        let titles: Vec<String> = sorted_markers(&demo_markers())
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["Intro", "Problem", "Review this", "Features"]);
    }

    #[test]
    fn chapter_lookup_ignores_bookmarks() {
        let markers = demo_markers();
        assert_eq!(chapter_at(&markers, 100_000).unwrap().title, "Problem");
        assert_eq!(chapter_at(&markers, 120_000).unwrap().title, "Features");
        assert_eq!(chapter_at(&markers, 0).unwrap().title, "Intro");
    }

    #[test]
    fn marker_navigation() {
        let markers = demo_markers();
        assert_eq!(next_marker(&markers, 30_000).unwrap().title, "Review this");
        assert_eq!(previous_marker(&markers, 30_000).unwrap().title, "Intro");
        assert!(next_marker(&markers, 120_000).is_none());
        assert!(previous_marker(&markers, 0).is_none());
    }
}
