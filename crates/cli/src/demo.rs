//! Scripted review used by `framenote demo`.

use anyhow::Result;
use framenote_core::annotation::{CommentAnnotation, Region};
use framenote_core::comment::{NewComment, Priority};
use framenote_core::marker::{MarkerType, NewMarker};
use framenote_core::media::{MediaSpec, NewMediaAsset};
use framenote_core::review::NewReviewSession;
use framenote_core::timecode::FrameRate;
use framenote_core::ReviewConfig;
use framenote_store::{AssetSnapshot, ReviewStore};

/// Walk one asset through comments, a two-approver session and a re-upload.
pub fn run(config: ReviewConfig) -> Result<AssetSnapshot> {
    let store = ReviewStore::new(config);
    let mut events = store.events().subscribe();

    let asset = store.create_asset(NewMediaAsset {
        owner_id: "alex".into(),
        title: "Product Demo".into(),
        description: Some("Launch cut".into()),
        media: MediaSpec {
            source: "media://product-demo-v0.mp4".into(),
            duration_ms: 596_000,
            frame_rate: FrameRate::FPS_24,
            width: 1920,
            height: 1080,
        },
        allow_comments: true,
        allow_downloads: false,
    })?;

    for (title, at, marker_type) in [
        ("Intro", 0, MarkerType::Chapter),
        ("Problem", 30_000, MarkerType::Chapter),
        ("Logo reveal", 45_000, MarkerType::Bookmark),
    ] {
        store.add_marker(
            asset.id,
            NewMarker {
                author_id: "alex".into(),
                timestamp_ms: at,
                title: title.into(),
                description: None,
                color: None,
                marker_type,
            },
        )?;
    }

    let flicker = store.add_comment(
        asset.id,
        NewComment::new("sam", 45_000, "Logo flickers on the reveal")
            .with_priority(Priority::Critical)
            .with_annotation(CommentAnnotation::Region(Region {
                x: 0.4,
                y: 0.35,
                width: 0.2,
                height: 0.2,
            }))
            .with_tags(["vfx"]),
    )?;
    store.add_comment(
        asset.id,
        NewComment::new("jordan", 12_500, "Audio too quiet under the voiceover")
            .with_priority(Priority::Important)
            .with_mentions(["alex"]),
    )?;
    store.reply_to_comment(flicker.id, "alex", "Fixed in the next export")?;
    store.react(flicker.id, "👍")?;

    let session = store.create_session(
        asset.id,
        NewReviewSession::new("alex", "Round 2", 2).with_description("Final sign-off"),
    )?;
    store.start_review(session.id, "alex")?;

    store.add_revision(asset.id, "alex", Some("Fixed logo flicker".into()))?;
    store.toggle_resolved(flicker.id, "sam")?;

    store.record_approval(session.id, "sam")?;
    store.record_approval(session.id, "jordan")?;

    while let Ok(event) = events.try_recv() {
        tracing::info!(
            event_type = %event.event_type,
            actor = event.actor_user_id.as_deref().unwrap_or("-"),
            "Review event",
        );
    }

    Ok(store.snapshot(asset.id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use framenote_core::review::SessionStatus;

    #[test]
    fn demo_review_ends_approved_at_version_one() {
        let snapshot = run(ReviewConfig::default()).unwrap();
        assert_eq!(snapshot.asset.version, 1);
        assert_eq!(snapshot.revisions.len(), 2);
        assert_eq!(snapshot.comments.len(), 3);
        assert_eq!(snapshot.markers.len(), 3);
        assert_eq!(snapshot.sessions[0].status(), SessionStatus::Approved);
        assert_eq!(snapshot.comments.iter().filter(|c| c.is_resolved()).count(), 1);
    }
}
