//! Shared in-memory review state.
//!
//! [`ReviewStore`] owns assets and everything anchored to them (comments,
//! markers, review sessions, revisions) behind locks, so concurrent
//! collaborators can mutate them safely. Every accepted change is published
//! as a [`framenote_events::ReviewEvent`].

pub mod error;
pub mod snapshot;
pub mod store;
pub mod upload;

pub use error::{StoreError, StoreResult};
pub use snapshot::AssetSnapshot;
pub use store::ReviewStore;
pub use upload::UploadGuard;
