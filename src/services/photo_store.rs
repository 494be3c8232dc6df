//! Single source of truth for the gallery's photo collections.
//!
//! The store keeps three collections (`all`, `mine`, `admin`) with one
//! [`LoadState`] each. Only the store's own operations mutate them. Remote
//! failures never escape a fetch: they end up in the collection's
//! `LoadState::error` and the previous contents stay visible.

use crate::models::{CollectionKind, LoadState, PhotoCollection};
use photo_service::{Photo, PhotoService, ServiceError, ServiceResult};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Errors reported by store operations
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The remote service refused or failed the delete
    DeleteFailed { id: String, reason: ServiceError },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DeleteFailed { id, reason } => {
                write!(f, "Failed to delete photo {}: {}", id, reason)
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Default)]
struct StoreState {
    all: PhotoCollection,
    mine: PhotoCollection,
    admin: PhotoCollection,
    all_state: LoadState,
    mine_state: LoadState,
    admin_state: LoadState,
}

impl StoreState {
    fn collection(&self, kind: CollectionKind) -> &PhotoCollection {
        match kind {
            CollectionKind::All => &self.all,
            CollectionKind::Mine => &self.mine,
            CollectionKind::Admin => &self.admin,
        }
    }

    fn collection_mut(&mut self, kind: CollectionKind) -> &mut PhotoCollection {
        match kind {
            CollectionKind::All => &mut self.all,
            CollectionKind::Mine => &mut self.mine,
            CollectionKind::Admin => &mut self.admin,
        }
    }

    fn load_state(&self, kind: CollectionKind) -> &LoadState {
        match kind {
            CollectionKind::All => &self.all_state,
            CollectionKind::Mine => &self.mine_state,
            CollectionKind::Admin => &self.admin_state,
        }
    }

    fn load_state_mut(&mut self, kind: CollectionKind) -> &mut LoadState {
        match kind {
            CollectionKind::All => &mut self.all_state,
            CollectionKind::Mine => &mut self.mine_state,
            CollectionKind::Admin => &mut self.admin_state,
        }
    }
}

/// Cloneable handle to the shared photo store
pub struct PhotoStore<S> {
    service: Arc<S>,
    state: Arc<Mutex<StoreState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl<S> Clone for PhotoStore<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            state: self.state.clone(),
            revision: self.revision.clone(),
        }
    }
}

impl<S: PhotoService> PhotoStore<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (revision, _rx) = watch::channel(0);
        Self {
            service,
            state: Arc::new(Mutex::new(StoreState::default())),
            revision: Arc::new(revision),
        }
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Snapshot of a collection's photos
    pub fn photos(&self, kind: CollectionKind) -> Vec<Photo> {
        self.read(|state| state.collection(kind).as_slice().to_vec())
    }

    pub fn collection(&self, kind: CollectionKind) -> PhotoCollection {
        self.read(|state| state.collection(kind).clone())
    }

    pub fn load_state(&self, kind: CollectionKind) -> LoadState {
        self.read(|state| state.load_state(kind).clone())
    }

    /// Receives a new revision number after every change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Reloads the shared gallery, optionally filtered by uploader name
    pub async fn fetch_all(&self, name_filter: Option<&str>) {
        self.refresh(CollectionKind::All, self.service.list_gallery(name_filter))
            .await;
    }

    /// Reloads the current guest's photos
    pub async fn fetch_mine(&self, uploader_name: &str) {
        self.refresh(
            CollectionKind::Mine,
            self.service.list_by_uploader(uploader_name),
        )
        .await;
    }

    /// Reloads the moderation view.
    ///
    /// Callers check the admin gate first; the remote service enforces the
    /// actual privilege.
    pub async fn fetch_admin(&self) {
        self.refresh(CollectionKind::Admin, self.service.list_admin())
            .await;
    }

    /// Adds a freshly uploaded photo to both `all` and `mine`
    pub fn add_photo(&self, photo: Photo) {
        let id = photo.id.clone();
        self.update(|state| {
            state.all.insert(photo.clone());
            state.mine.insert(photo);
        });
        log::debug!("Added photo {} to gallery", id);
    }

    /// Deletes `id` remotely, then drops it from every collection.
    ///
    /// A photo the service no longer knows (404) counts as deleted. On any
    /// other failure the collections are left untouched.
    pub async fn remove_photo(&self, id: &str) -> Result<(), StoreError> {
        match self.service.delete_photo(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                log::debug!("Photo {} already gone remotely", id);
            }
            Err(e) => {
                log::warn!("Failed to delete photo {}: {}", id, e);
                return Err(StoreError::DeleteFailed {
                    id: id.to_string(),
                    reason: e,
                });
            }
        }

        self.update(|state| {
            state.all.remove(id);
            state.mine.remove(id);
            state.admin.remove(id);
        });
        Ok(())
    }

    async fn refresh<F>(&self, kind: CollectionKind, request: F)
    where
        F: Future<Output = ServiceResult<Vec<Photo>>>,
    {
        self.update(|state| *state.load_state_mut(kind) = LoadState::loading());

        match request.await {
            Ok(photos) => {
                let count = photos.len();
                self.update(|state| {
                    state.collection_mut(kind).replace(photos);
                    *state.load_state_mut(kind) = LoadState::default();
                });
                log::info!("Loaded {} photos into '{}'", count, kind.label());
            }
            Err(e) => {
                log::warn!("Failed to fetch '{}' photos: {}", kind.label(), e);
                let message = format!("Failed to fetch photos: {}", e);
                self.update(|state| *state.load_state_mut(kind) = LoadState::failed(message));
            }
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn update(&self, f: impl FnOnce(&mut StoreState)) {
        {
            let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard);
        }
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{photo, FakePhotoService};

    fn store_with(photos: Vec<Photo>) -> PhotoStore<FakePhotoService> {
        PhotoStore::new(Arc::new(FakePhotoService::with_photos(photos)))
    }

    fn ids(photos: &[Photo]) -> Vec<&str> {
        photos.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_add_photo_writes_all_and_mine() {
        let store = store_with(vec![]);
        for id in ["a", "b", "c"] {
            store.add_photo(photo(id, "Asha"));
        }
        // Re-adding must not duplicate
        store.add_photo(photo("b", "Asha"));

        assert_eq!(ids(&store.photos(CollectionKind::All)), vec!["a", "b", "c"]);
        assert_eq!(ids(&store.photos(CollectionKind::Mine)), vec!["a", "b", "c"]);
        assert!(store.photos(CollectionKind::Admin).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_replaces_collection() {
        let store = store_with(vec![photo("r1", "Asha"), photo("r2", "Ravi")]);
        store.add_photo(photo("local", "Asha"));

        store.fetch_all(None).await;

        assert_eq!(ids(&store.photos(CollectionKind::All)), vec!["r1", "r2"]);
        assert_eq!(store.load_state(CollectionKind::All), LoadState::default());
        // mine is untouched by a gallery refresh
        assert_eq!(ids(&store.photos(CollectionKind::Mine)), vec!["local"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_stale_contents() {
        let store = store_with(vec![photo("r1", "Asha")]);
        store.fetch_all(None).await;

        store.service().set_fail_listing(true);
        store.fetch_all(None).await;

        let state = store.load_state(CollectionKind::All);
        assert!(!state.loading);
        assert!(state.error.is_some());
        assert_eq!(ids(&store.photos(CollectionKind::All)), vec!["r1"]);

        store.service().set_fail_listing(false);
        store
            .service()
            .set_photos(vec![photo("r2", "Ravi"), photo("r3", "Ravi")]);
        store.fetch_all(None).await;

        assert_eq!(store.load_state(CollectionKind::All).error, None);
        assert_eq!(ids(&store.photos(CollectionKind::All)), vec!["r2", "r3"]);
    }

    #[tokio::test]
    async fn test_fetch_with_name_filter_and_mine() {
        let store = store_with(vec![
            photo("1", "Asha"),
            photo("2", "Ravi"),
            photo("3", "Asha"),
        ]);

        store.fetch_all(Some("ash")).await;
        assert_eq!(ids(&store.photos(CollectionKind::All)), vec!["1", "3"]);

        store.fetch_mine("Ravi").await;
        assert_eq!(ids(&store.photos(CollectionKind::Mine)), vec!["2"]);
        assert!(store.load_state(CollectionKind::Mine).is_idle());
    }

    #[tokio::test]
    async fn test_remove_photo_from_every_collection() {
        let store = store_with(vec![photo("a", "Asha"), photo("b", "Asha")]);
        store.fetch_all(None).await;
        store.fetch_mine("Asha").await;
        store.fetch_admin().await;

        store.remove_photo("a").await.unwrap();

        for kind in [CollectionKind::All, CollectionKind::Mine, CollectionKind::Admin] {
            assert_eq!(ids(&store.photos(kind)), vec!["b"]);
        }
    }

    #[tokio::test]
    async fn test_remove_photo_twice_is_idempotent() {
        let store = store_with(vec![photo("a", "Asha"), photo("b", "Asha")]);
        store.fetch_all(None).await;

        store.remove_photo("a").await.unwrap();
        store.remove_photo("a").await.unwrap();

        assert_eq!(ids(&store.photos(CollectionKind::All)), vec!["b"]);
        assert!(store.load_state(CollectionKind::All).is_idle());
        assert_eq!(store.service().delete_calls(), vec!["a", "a"]);
    }

    #[tokio::test]
    async fn test_failed_remove_leaves_collections() {
        let store = store_with(vec![photo("a", "Asha")]);
        store.fetch_all(None).await;
        store.service().fail_delete_of("a");

        let err = store.remove_photo("a").await.unwrap_err();

        assert!(matches!(err, StoreError::DeleteFailed { ref id, .. } if id == "a"));
        assert_eq!(ids(&store.photos(CollectionKind::All)), vec!["a"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_revisions() {
        let store = store_with(vec![photo("a", "Asha")]);
        let mut rx = store.subscribe();
        let before = *rx.borrow_and_update();

        store.fetch_all(None).await;

        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow() > before);
    }

    #[tokio::test]
    async fn test_concurrent_deletes_commute() {
        let store = store_with(vec![photo("a", "A"), photo("b", "B"), photo("c", "C")]);
        store.fetch_all(None).await;

        let (ra, rb) = tokio::join!(store.remove_photo("b"), store.remove_photo("a"));
        ra.unwrap();
        rb.unwrap();

        assert_eq!(ids(&store.photos(CollectionKind::All)), vec!["c"]);
    }
}
