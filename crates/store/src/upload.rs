//! Per-asset upload slots.

use framenote_core::media::MediaSpec;
use framenote_core::revision::Revision;
use framenote_core::types::{EntityId, UserId};

use crate::error::StoreResult;
use crate::store::ReviewStore;

/// Exclusive right to upload the next version of one asset.
///
/// Obtained from [`ReviewStore::begin_upload`]. While a guard is alive every
/// other upload for the same asset fails with `UploadInProgress`. Dropping
/// the guard without calling [`UploadGuard::complete`] abandons the upload
/// and records nothing.
#[must_use = "dropping the guard abandons the upload"]
pub struct UploadGuard<'a> {
    store: &'a ReviewStore,
    asset_id: EntityId,
    uploaded_by: UserId,
}

impl std::fmt::Debug for UploadGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadGuard")
            .field("asset_id", &self.asset_id)
            .field("uploaded_by", &self.uploaded_by)
            .finish_non_exhaustive()
    }
}

impl<'a> UploadGuard<'a> {
    pub(crate) fn new(store: &'a ReviewStore, asset_id: EntityId, uploaded_by: UserId) -> Self {
        Self {
            store,
            asset_id,
            uploaded_by,
        }
    }

    pub fn asset_id(&self) -> EntityId {
        self.asset_id
    }

    pub fn uploaded_by(&self) -> &str {
        &self.uploaded_by
    }

    /// Record `media` as the asset's next version and release the slot.
    pub fn complete(self, media: MediaSpec, notes: Option<String>) -> StoreResult<Revision> {
        self.store
            .commit_upload(self.asset_id, &self.uploaded_by, media, notes)
    }

    /// Release the slot without recording a revision.
    pub fn abort(self) {
        tracing::info!(asset_id = %self.asset_id, uploaded_by = %self.uploaded_by, "Upload aborted");
    }
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.store.release_upload(self.asset_id);
    }
}
