pub mod collection;
pub mod guest;

pub use collection::{CollectionKind, LoadState, PhotoCollection};
pub use guest::GuestProfile;
pub use photo_service::Photo;
