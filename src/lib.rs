//! # Event Gallery
//!
//! Client core for an event photo gallery: guests capture or upload photos,
//! browse the shared gallery and their own uploads, and an administrator
//! moderates everything.
//!
//! - [`camera`]: live camera feed and frame capture
//! - [`services::upload_service`]: uploads into the remote photo service
//! - [`services::photo_store`]: the `all` / `mine` / `admin` collections
//! - [`services::bulk_service`]: multi-select delete and zip download
//!
//! The remote service client lives in `photo-service`, the admin login in
//! `admin-auth`.

pub mod camera;
pub mod config;
pub mod error;
pub mod image_processing;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_support;

pub use camera::{CaptureController, CapturedImage, FacingMode};
pub use config::GalleryConfig;
pub use error::AppError;
pub use models::{CollectionKind, GuestProfile, LoadState, Photo, PhotoCollection};
pub use services::{
    BulkCoordinator, BulkDeleteOutcome, PhotoArchive, PhotoFile, PhotoStore, UploadOrchestrator,
};
