use framenote_core::media::{MediaAsset, MediaSpec, NewMediaAsset};
use framenote_core::timecode::FrameRate;
use framenote_store::ReviewStore;

pub fn demo_media(frame_rate: FrameRate) -> MediaSpec {
    MediaSpec {
        source: "media://product-demo.mp4".into(),
        duration_ms: 596_000,
        frame_rate,
        width: 1920,
        height: 1080,
    }
}

/// Register the 596 s, 24 fps demo asset.
pub fn demo_asset(store: &ReviewStore) -> MediaAsset {
    store
        .create_asset(NewMediaAsset {
            owner_id: "owner".into(),
            title: "Product Demo".into(),
            description: None,
            media: demo_media(FrameRate::FPS_24),
            allow_comments: true,
            allow_downloads: false,
        })
        .expect("demo asset should register")
}
