//! Sends captured frames and picked files to the remote photo service.
//!
//! A photo reaches the store only after the service has confirmed it, with
//! the id the service assigned. While an upload is pending the view shows a
//! transient preview that is discarded as soon as the upload resolves.
//!
//! Upload futures do not borrow the orchestrator. They hold the store and
//! only a weak reference to the view state, so a view torn down mid-upload
//! simply misses the final view update.

use crate::camera::CapturedImage;
use crate::services::photo_store::PhotoStore;
use photo_service::{Photo, PhotoService, ServiceError};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};

#[derive(Debug, Clone, PartialEq)]
pub enum UploadError {
    /// No guest name has been entered
    MissingUploader,
    /// The service rejected the upload (`status`) or could not be reached
    Failed {
        status: Option<u16>,
        message: String,
    },
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::MissingUploader => write!(f, "No uploader name given"),
            UploadError::Failed {
                status: Some(status),
                message,
            } => write!(f, "Upload failed with status {}: {}", status, message),
            UploadError::Failed {
                status: None,
                message,
            } => write!(f, "Upload failed: {}", message),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<ServiceError> for UploadError {
    fn from(err: ServiceError) -> Self {
        UploadError::Failed {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

/// Where an upload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSource {
    Camera,
    File,
}

/// Transient preview shown while an upload is in flight
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPreview {
    pub source: UploadSource,
    pub bytes: Vec<u8>,
}

/// State of the upload view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadViewState {
    pub preview: Option<UploadPreview>,
    /// Uploads started from this view that have not resolved yet
    pub pending: usize,
}

impl UploadViewState {
    pub fn is_uploading(&self) -> bool {
        self.pending > 0
    }
}

/// Coordinates uploads from the upload view into the photo store
pub struct UploadOrchestrator<S> {
    store: PhotoStore<S>,
    view: Arc<Mutex<UploadViewState>>,
}

impl<S: PhotoService + 'static> UploadOrchestrator<S> {
    pub fn new(store: PhotoStore<S>) -> Self {
        Self {
            store,
            view: Arc::new(Mutex::new(UploadViewState::default())),
        }
    }

    pub fn view_state(&self) -> UploadViewState {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while any upload from this view is pending. The view disables
    /// its upload controls meanwhile instead of queueing.
    pub fn is_uploading(&self) -> bool {
        self.view_state().is_uploading()
    }

    /// Uploads a camera capture through the base64 endpoint.
    ///
    /// Single attempt; on success the photo is added to the store.
    pub fn upload_captured(
        &self,
        image: CapturedImage,
        uploader_name: &str,
    ) -> impl Future<Output = Result<Photo, UploadError>> + 'static {
        let uploader = uploader_name.trim().to_string();
        let service = self.store.service().clone();
        let store = self.store.clone();
        let view = (!uploader.is_empty()).then(|| {
            self.begin(UploadPreview {
                source: UploadSource::Camera,
                bytes: image.bytes.clone(),
            })
        });

        async move {
            let Some(view) = view else {
                return Err(UploadError::MissingUploader);
            };
            let data_url = image.to_data_url();
            let result = service.upload_base64(&data_url, &uploader).await;
            Self::settle(&store, &view, result)
        }
    }

    /// Uploads a user-picked file (any aspect ratio) through the multipart endpoint
    pub fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        uploader_name: &str,
    ) -> impl Future<Output = Result<Photo, UploadError>> + 'static {
        let uploader = uploader_name.trim().to_string();
        let file_name = file_name.to_string();
        let service = self.store.service().clone();
        let store = self.store.clone();
        let view = (!uploader.is_empty()).then(|| {
            self.begin(UploadPreview {
                source: UploadSource::File,
                bytes: bytes.clone(),
            })
        });

        async move {
            let Some(view) = view else {
                return Err(UploadError::MissingUploader);
            };
            let result = service.upload_file(bytes, &file_name, &uploader).await;
            Self::settle(&store, &view, result)
        }
    }

    fn begin(&self, preview: UploadPreview) -> Weak<Mutex<UploadViewState>> {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        view.preview = Some(preview);
        view.pending += 1;
        Arc::downgrade(&self.view)
    }

    fn settle(
        store: &PhotoStore<S>,
        view: &Weak<Mutex<UploadViewState>>,
        result: Result<Photo, ServiceError>,
    ) -> Result<Photo, UploadError> {
        match view.upgrade() {
            Some(view) => {
                let mut view = view.lock().unwrap_or_else(PoisonError::into_inner);
                view.pending = view.pending.saturating_sub(1);
                if view.pending == 0 {
                    view.preview = None;
                }
            }
            None => log::debug!("Upload view gone, skipping view update"),
        }

        match result {
            Ok(photo) => {
                log::info!("Photo {} uploaded by {}", photo.id, photo.uploader_name);
                store.add_photo(photo.clone());
                Ok(photo)
            }
            Err(e) => {
                log::warn!("Failed to upload photo: {}", e);
                Err(UploadError::from(e))
            }
        }
    }
}
