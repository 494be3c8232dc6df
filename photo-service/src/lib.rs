//! # Photo Service
//!
//! Client for the remote photo service that stores every guest upload.
//!
//! This crate provides:
//! - The canonical [`Photo`] shape used throughout the gallery
//! - Mapping from the wire format (`_id`, ISO timestamps) to [`Photo`]
//! - The [`PhotoService`] trait, the seam the gallery core is written against
//! - [`HttpPhotoService`], the `reqwest` implementation of that trait
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_service::{build_client, HttpPhotoService, PhotoService, PhotoServiceConfig};
//!
//! let config = PhotoServiceConfig::new("https://gallery.example.com/api");
//! let client = build_client(&config)?;
//! let service = HttpPhotoService::new(config, client, credentials);
//!
//! let photos = service.list_gallery(Some("Asha")).await?;
//! ```

pub mod client;
pub mod format;
pub mod models;
pub mod service;

pub use client::{build_client, HttpPhotoService, PhotoServiceConfig};
pub use format::{format_date, format_date_time, format_time};
pub use models::{Photo, RemotePhoto, RemoteTimestamp};
pub use service::{PhotoService, ServiceError, ServiceResult};
