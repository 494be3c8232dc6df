use std::fmt;

use crate::camera::CameraError;
use crate::services::export_service::ArchiveError;
use crate::services::photo_store::StoreError;
use crate::services::upload_service::UploadError;
use admin_auth::AuthError;
use photo_service::ServiceError;

/// Central error types for the event gallery
#[derive(Debug)]
pub enum AppError {
    /// Remote photo service error
    Service(ServiceError),
    /// Admin login error
    Auth(AuthError),
    /// Camera error (permission denied, no device, no stream)
    Camera(CameraError),
    /// Upload rejected or not sent
    Upload(UploadError),
    /// Photo store error (e.g. a delete the server refused)
    Store(StoreError),
    /// Archive could not be built or written
    Archive(ArchiveError),
    /// Configuration or profile file could not be parsed or written
    Config(String),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Validation error (e.g. invalid inputs)
    Validation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Service(e) => write!(f, "Service error: {}", e),
            AppError::Auth(e) => write!(f, "Authentication error: {}", e),
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Upload(e) => write!(f, "Upload error: {}", e),
            AppError::Store(e) => write!(f, "Store error: {}", e),
            AppError::Archive(e) => write!(f, "Archive error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<CameraError> for AppError {
    fn from(e: CameraError) -> Self {
        AppError::Camera(e)
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        AppError::Upload(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<ArchiveError> for AppError {
    fn from(e: ArchiveError) -> Self {
        AppError::Archive(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

/// User-friendly error messages for notifications
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Service(_) => {
                "The photo service could not be reached. Please try again.".to_string()
            }
            AppError::Auth(AuthError::EmptyPassword) => {
                "Please enter the admin password.".to_string()
            }
            AppError::Auth(_) => "Login failed. Please try again.".to_string(),
            AppError::Camera(CameraError::CameraUnavailable(_)) => {
                "Unable to access camera".to_string()
            }
            AppError::Camera(_) => "Could not take the photo. Please try again.".to_string(),
            AppError::Upload(UploadError::MissingUploader) => {
                "Please enter your name before sharing photos.".to_string()
            }
            AppError::Upload(_) => "Failed to upload photo. Please try again.".to_string(),
            AppError::Store(_) => "Failed to delete photo".to_string(),
            AppError::Archive(ArchiveError::Empty) => {
                "There are no photos to download.".to_string()
            }
            AppError::Archive(ArchiveError::NotFound(_)) => {
                "That photo is not in the gallery.".to_string()
            }
            AppError::Archive(_) => "Failed to download images".to_string(),
            AppError::Config(msg) => msg.clone(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check permissions.".to_string()
            }
            AppError::Validation(msg) => msg.clone(),
        }
    }
}
