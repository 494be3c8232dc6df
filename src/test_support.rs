//! In-memory stand-ins for the camera and the remote photo service

use crate::camera::{CameraError, MediaDevices, MediaStream, RawFrame, VideoConstraints};
use photo_service::{Photo, PhotoService, ServiceError, ServiceResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn photo(id: &str, uploader: &str) -> Photo {
    Photo {
        id: id.to_string(),
        url: format!("https://cdn.test/{}.jpg", id),
        uploader_name: uploader.to_string(),
        timestamp: 1_700_000_000_000,
    }
}

#[derive(Default)]
struct Counters {
    started: AtomicUsize,
    stopped: AtomicUsize,
    denied: AtomicBool,
    last_constraints: Mutex<Option<VideoConstraints>>,
}

/// Camera fake counting started and stopped tracks
#[derive(Clone, Default)]
pub struct FakeMediaDevices {
    counters: Arc<Counters>,
}

impl FakeMediaDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_denied(&self, denied: bool) {
        self.counters.denied.store(denied, Ordering::SeqCst);
    }

    pub fn started(&self) -> usize {
        self.counters.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.counters.stopped.load(Ordering::SeqCst)
    }

    pub fn last_constraints(&self) -> Option<VideoConstraints> {
        self.counters.last_constraints.lock().unwrap().clone()
    }
}

pub struct FakeStream {
    counters: Arc<Counters>,
    live: bool,
}

impl MediaDevices for FakeMediaDevices {
    type Stream = FakeStream;

    async fn get_user_media(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Self::Stream, CameraError> {
        *self.counters.last_constraints.lock().unwrap() = Some(constraints.clone());
        if self.counters.denied.load(Ordering::SeqCst) {
            return Err(CameraError::CameraUnavailable("permission denied".to_string()));
        }
        self.counters.started.fetch_add(1, Ordering::SeqCst);
        Ok(FakeStream {
            counters: self.counters.clone(),
            live: true,
        })
    }
}

impl MediaStream for FakeStream {
    fn track_count(&self) -> usize {
        usize::from(self.live)
    }

    fn stop_all(&mut self) {
        if self.live {
            self.live = false;
            self.counters.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn grab_frame(&self) -> Option<RawFrame> {
        self.live.then(|| RawFrame {
            width: 9,
            height: 16,
            rgba: [10u8, 120, 200, 255].repeat(9 * 16),
        })
    }
}

#[derive(Default)]
struct FakeState {
    photos: Vec<Photo>,
    next_id: usize,
    fail_listing: bool,
    upload_status: Option<u16>,
    failing_deletes: HashSet<String>,
    delete_calls: Vec<String>,
    upload_calls: usize,
    blobs: HashMap<String, Vec<u8>>,
    fetch_calls: Vec<String>,
}

/// Remote photo service fake with scriptable failures
#[derive(Default)]
pub struct FakePhotoService {
    state: Mutex<FakeState>,
}

impl FakePhotoService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_photos(photos: Vec<Photo>) -> Self {
        let service = Self::new();
        service.state.lock().unwrap().photos = photos;
        service
    }

    pub fn set_photos(&self, photos: Vec<Photo>) {
        self.state.lock().unwrap().photos = photos;
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.state.lock().unwrap().fail_listing = fail;
    }

    /// Makes uploads answer with `status`; `None` restores success
    pub fn set_upload_status(&self, status: Option<u16>) {
        self.state.lock().unwrap().upload_status = status;
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_deletes
            .insert(id.to_string());
    }

    pub fn set_blob(&self, url: &str, bytes: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .blobs
            .insert(url.to_string(), bytes.to_vec());
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    pub fn upload_calls(&self) -> usize {
        self.state.lock().unwrap().upload_calls
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().fetch_calls.clone()
    }

    pub fn remote_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .photos
            .iter()
            .map(|p| p.id.clone())
            .collect()
    }

    fn listing(&self, filter: impl Fn(&Photo) -> bool) -> ServiceResult<Vec<Photo>> {
        let state = self.state.lock().unwrap();
        if state.fail_listing {
            return Err(ServiceError::Network("connection refused".to_string()));
        }
        Ok(state.photos.iter().filter(|p| filter(*p)).cloned().collect())
    }

    fn create(&self, uploader_name: &str) -> ServiceResult<Photo> {
        let mut state = self.state.lock().unwrap();
        state.upload_calls += 1;
        if let Some(status) = state.upload_status {
            return Err(ServiceError::Status {
                status,
                body: "rejected".to_string(),
            });
        }
        state.next_id += 1;
        let created = photo(&format!("p{}", state.next_id), uploader_name);
        state.photos.push(created.clone());
        Ok(created)
    }
}

impl PhotoService for FakePhotoService {
    async fn list_gallery(&self, name_filter: Option<&str>) -> ServiceResult<Vec<Photo>> {
        let filter = name_filter.map(|n| n.to_lowercase());
        self.listing(|p| match &filter {
            Some(f) => p.uploader_name.to_lowercase().contains(f.as_str()),
            None => true,
        })
    }

    async fn list_by_uploader(&self, uploader_name: &str) -> ServiceResult<Vec<Photo>> {
        self.listing(|p| p.uploader_name == uploader_name)
    }

    async fn list_admin(&self) -> ServiceResult<Vec<Photo>> {
        self.listing(|_| true)
    }

    async fn upload_file(
        &self,
        _bytes: Vec<u8>,
        _file_name: &str,
        uploader_name: &str,
    ) -> ServiceResult<Photo> {
        self.create(uploader_name)
    }

    async fn upload_base64(&self, data_url: &str, uploader_name: &str) -> ServiceResult<Photo> {
        if !data_url.starts_with("data:image/") {
            return Err(ServiceError::Status {
                status: 400,
                body: "not a data url".to_string(),
            });
        }
        self.create(uploader_name)
    }

    async fn delete_photo(&self, id: &str) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls.push(id.to_string());
        if state.failing_deletes.contains(id) {
            return Err(ServiceError::Status {
                status: 500,
                body: "delete failed".to_string(),
            });
        }
        let before = state.photos.len();
        state.photos.retain(|p| p.id != id);
        if state.photos.len() == before {
            return Err(ServiceError::Status {
                status: 404,
                body: "not found".to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_bytes(&self, url: &str) -> ServiceResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.fetch_calls.push(url.to_string());
        state.blobs.get(url).cloned().ok_or(ServiceError::Status {
            status: 404,
            body: "missing".to_string(),
        })
    }
}
