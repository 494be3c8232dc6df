pub mod bulk_service;
pub mod export_service;
pub mod photo_store;
pub mod upload_service;

pub use bulk_service::{BulkCoordinator, BulkDeleteOutcome};
pub use export_service::{ArchiveError, PhotoArchive, PhotoFile};
pub use photo_store::{PhotoStore, StoreError};
pub use upload_service::{UploadError, UploadOrchestrator, UploadViewState};
