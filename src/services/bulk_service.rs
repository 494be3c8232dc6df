//! Multi-select moderation over one of the store's collections.
//!
//! Deletes and downloads run strictly one photo after another. A failed
//! delete is counted and its id stays selected; everything that did get
//! deleted leaves both the store and the selection.

use crate::models::CollectionKind;
use crate::services::export_service::{self, ArchiveError, PhotoArchive, PhotoFile};
use crate::services::photo_store::PhotoStore;
use photo_service::{Photo, PhotoService};
use std::collections::BTreeSet;

/// Result of [`BulkCoordinator::delete_selected`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub attempted: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl BulkDeleteOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

pub struct BulkCoordinator<S> {
    store: PhotoStore<S>,
    kind: CollectionKind,
    selection_mode: bool,
    selected: BTreeSet<String>,
    archive_name: String,
}

impl<S: PhotoService> BulkCoordinator<S> {
    pub fn new(store: PhotoStore<S>, kind: CollectionKind) -> Self {
        Self {
            store,
            kind,
            selection_mode: false,
            selected: BTreeSet::new(),
            archive_name: "event_gallery_photos.zip".to_string(),
        }
    }

    pub fn with_archive_name(mut self, name: impl Into<String>) -> Self {
        self.archive_name = name.into();
        self
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn is_selection_mode(&self) -> bool {
        self.selection_mode
    }

    pub fn selected(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Enters selection mode with nothing selected
    pub fn enter_selection_mode(&mut self) {
        self.selection_mode = true;
        self.selected.clear();
    }

    /// Leaves selection mode and forgets the selection
    pub fn exit_selection_mode(&mut self) {
        self.selection_mode = false;
        self.selected.clear();
    }

    pub fn toggle_selection_mode(&mut self) {
        if self.selection_mode {
            self.exit_selection_mode();
        } else {
            self.enter_selection_mode();
        }
    }

    /// Flips `id` in the selection. Returns whether it is selected afterwards.
    ///
    /// Outside selection mode, or for ids not in the collection, nothing changes.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.selection_mode || !self.store.collection(self.kind).contains(id) {
            return false;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
            return true;
        }
        false
    }

    pub fn select_all(&mut self) {
        if !self.selection_mode {
            return;
        }
        self.selected = self.store.collection(self.kind).ids().into_iter().collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Deselects everything if everything is selected, otherwise selects everything
    pub fn toggle_select_all(&mut self) {
        self.prune();
        let total = self.store.collection(self.kind).len();
        if total > 0 && self.selected.len() == total {
            self.deselect_all();
        } else {
            self.select_all();
        }
    }

    /// Drops selected ids that are no longer in the collection
    pub fn prune(&mut self) {
        let collection = self.store.collection(self.kind);
        self.selected.retain(|id| collection.contains(id));
    }

    /// Deletes the selected photos one by one
    pub async fn delete_selected(&mut self) -> BulkDeleteOutcome {
        let targets: Vec<String> = self.selected.iter().cloned().collect();
        let mut outcome = BulkDeleteOutcome {
            attempted: targets.len(),
            ..BulkDeleteOutcome::default()
        };

        for id in targets {
            match self.store.remove_photo(&id).await {
                Ok(()) => {
                    self.selected.remove(&id);
                    outcome.deleted += 1;
                }
                Err(e) => {
                    log::warn!("Bulk delete: {}", e);
                    outcome.failed += 1;
                }
            }
        }

        if outcome.failed == 0 {
            log::info!("Deleted {} photos successfully", outcome.deleted);
        } else {
            log::warn!(
                "Failed to delete {} of {} photos",
                outcome.failed,
                outcome.attempted
            );
        }
        outcome
    }

    /// Packs photos into a zip archive.
    ///
    /// With `ids`, only those photos (in collection order); without, every
    /// photo currently loaded in the collection. Cannot be cancelled midway.
    pub async fn download_archive(
        &self,
        ids: Option<&[String]>,
    ) -> Result<PhotoArchive, ArchiveError> {
        let photos: Vec<Photo> = match ids {
            Some(ids) => self
                .store
                .photos(self.kind)
                .into_iter()
                .filter(|p| ids.contains(&p.id))
                .collect(),
            None => self.store.photos(self.kind),
        };
        export_service::build_archive(self.store.service().as_ref(), &photos, &self.archive_name)
            .await
    }

    pub async fn download_selected(&self) -> Result<PhotoArchive, ArchiveError> {
        let ids = self.selected();
        self.download_archive(Some(ids.as_slice())).await
    }

    pub async fn download_all(&self) -> Result<PhotoArchive, ArchiveError> {
        self.download_archive(None).await
    }

    /// Downloads a single photo of the collection
    pub async fn download_photo(&self, id: &str) -> Result<PhotoFile, ArchiveError> {
        let photo = self
            .store
            .collection(self.kind)
            .get(id)
            .cloned()
            .ok_or_else(|| ArchiveError::NotFound(id.to_string()))?;
        export_service::fetch_photo(self.store.service().as_ref(), &photo, self.kind).await
    }
}
