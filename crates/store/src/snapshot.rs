//! Serializable view of one asset and everything anchored to it.

use framenote_core::comment::Comment;
use framenote_core::marker::Marker;
use framenote_core::media::MediaAsset;
use framenote_core::review::ReviewSession;
use framenote_core::revision::Revision;
use serde::{Deserialize, Serialize};

/// Export format consumed by the `framenote` CLI and downstream tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub asset: MediaAsset,
    /// Creation order.
    pub comments: Vec<Comment>,
    /// Timeline order.
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub sessions: Vec<ReviewSession>,
    /// Ascending by version.
    #[serde(default)]
    pub revisions: Vec<Revision>,
}
