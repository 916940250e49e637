//! End-to-end review flows over the public core API.

use assert_matches::assert_matches;
use framenote_core::comment::{add_reply, create_comment, resolve_comment, NewComment, Priority};
use framenote_core::media::{AssetReviewStatus, MediaAsset, MediaSpec, NewMediaAsset};
use framenote_core::query::{self, CommentQuery, SortKey, StatusFilter};
use framenote_core::review::{create_session, NewReviewSession, SessionStatus};
use framenote_core::revision::{resolved_between, RevisionHistory};
use framenote_core::timecode::{self, FrameRate};
use framenote_core::CoreError;

fn product_demo() -> MediaAsset {
    MediaAsset::new(NewMediaAsset {
        owner_id: "owner".into(),
        title: "Product Demo".into(),
        description: Some("Launch cut".into()),
        media: MediaSpec {
            source: "media://product-demo.mp4".into(),
            duration_ms: 596_000,
            frame_rate: FrameRate::FPS_24,
            width: 1920,
            height: 1080,
        },
        allow_comments: true,
        allow_downloads: true,
    })
    .unwrap()
}

// ---------------------------------------------------------------------------
// Test: a comment is anchored to an exact frame and timecode
// ---------------------------------------------------------------------------

#[test]
fn comment_anchors_to_frame_and_timecode() {
    let asset = product_demo();
    let comment = create_comment(
        &asset,
        NewComment::new("u1", 45_000, "Logo flickers").with_priority(Priority::Critical),
    )
    .unwrap();

    assert_eq!(comment.frame_number(), 1080);
    assert_eq!(comment.timecode(asset.frame_rate).unwrap(), "00:00:45:00");
    assert_eq!(timecode::from_smpte("00:00:45:00", asset.frame_rate).unwrap(), 45_000);
}

// ---------------------------------------------------------------------------
// Test: resolve, reopen and thread replies
// ---------------------------------------------------------------------------

#[test]
fn resolve_then_reopen_round_trips() {
    let asset = product_demo();
    let comment = create_comment(&asset, NewComment::new("u1", 12_500, "Color shift")).unwrap();

    let resolved = resolve_comment(&comment, "u2");
    assert!(resolved.is_resolved());
    assert_eq!(resolved.resolved_by(), Some("u2"));
    assert!(resolved.resolved_at().is_some());

    let reopened = resolve_comment(&resolved, "u3");
    assert!(!reopened.is_resolved());
    assert!(reopened.resolved_by().is_none());
    assert!(reopened.resolved_at().is_none());
    assert_eq!(reopened, comment);
}

#[test]
fn replies_are_single_level() {
    let asset = product_demo();
    let root = create_comment(&asset, NewComment::new("u1", 30_000, "Cut here?")).unwrap();
    let reply = add_reply(&root, "u2", "Agreed").unwrap();
    assert_eq!(reply.timestamp_ms(), root.timestamp_ms());
    assert_eq!(reply.frame_number(), root.frame_number());
    assert_matches!(add_reply(&reply, "u3", "Nested"), Err(CoreError::NestedReplyNotAllowed));
}

// ---------------------------------------------------------------------------
// Test: reviewer view and playhead matching
// ---------------------------------------------------------------------------

#[test]
fn reviewer_view_filters_and_sorts() {
    let asset = product_demo();
    let make = |ts, text: &str| create_comment(&asset, NewComment::new("u1", ts, text)).unwrap();
    let comments = vec![
        make(45_000, "Audio pops here"),
        resolve_comment(&make(15_000, "audio too quiet"), "u2"),
        make(5_000, "Fix the AUDIO fade"),
        make(44_500, "Title is cut off"),
    ];

    let view = CommentQuery {
        status: StatusFilter::Active,
        search: "audio".into(),
        sort: SortKey::Timestamp,
    }
    .apply(&comments);
    let contents: Vec<&str> = view.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["Fix the AUDIO fade", "Audio pops here"]);

    let near = query::near_playhead(&comments, 45_200, 1000);
    assert_eq!(near.len(), 2);
    let active = query::active_comment(&comments, 45_200, 1000).unwrap();
    assert_eq!(active.content, "Audio pops here");
}

// ---------------------------------------------------------------------------
// Test: two-approver review session
// ---------------------------------------------------------------------------

#[test]
fn round_two_approves_on_second_approval() {
    let asset = product_demo();
    let session = create_session(&asset, NewReviewSession::new("owner", "Round 2", 2))
        .unwrap()
        .start_review()
        .unwrap();

    let session = session.record_approval("u1").unwrap();
    assert_eq!(session.status(), SessionStatus::InProgress);
    assert_eq!(session.asset_review_status(), AssetReviewStatus::InProgress);

    let session = session.record_approval("u2").unwrap();
    assert_eq!(session.status(), SessionStatus::Approved);
    assert_eq!(session.approval_count(), 2);

    assert_matches!(
        session.record_approval("u3"),
        Err(CoreError::SessionClosed { .. })
    );
}

// ---------------------------------------------------------------------------
// Test: uploads are serialized per asset
// ---------------------------------------------------------------------------

#[test]
fn upload_while_in_flight_is_rejected_then_versions_advance() {
    let mut asset = product_demo();
    let mut history = RevisionHistory::new(&asset);

    let ticket = history.begin_upload("editor").unwrap();
    assert_matches!(history.begin_upload("other"), Err(CoreError::UploadInProgress));
    let media = asset.media_spec();
    let v1 = history
        .complete_upload(ticket, &mut asset, media, Some("Fixed color grading".into()))
        .unwrap();
    let v2 = history.add_revision(&mut asset, "editor", None).unwrap();

    assert_eq!((v1.version, v2.version), (1, 2));
    assert_eq!(asset.version, 2);
    assert_eq!(history.list_revisions().first().unwrap().version, 0);

    let resolved = resolved_between(&[], &v1, &v2);
    let diff = history.compare_with_current(1, resolved).unwrap();
    assert!(!diff.has_metadata_changes());
    assert!(diff.resolved_comment_ids.is_empty());
}
