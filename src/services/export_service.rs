// Photo downloads: single files and zip archives

use crate::models::CollectionKind;
use photo_service::{Photo, PhotoService, ServiceError};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ArchiveError {
    /// Nothing to pack
    Empty,
    /// The requested photo is not in the collection
    NotFound(String),
    /// A photo's bytes could not be fetched; the archive is abandoned
    Fetch { photo_id: String, reason: ServiceError },
    Zip(String),
    Io(std::io::Error),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::Empty => write!(f, "No photos to archive"),
            ArchiveError::NotFound(id) => write!(f, "Photo {} is not in the gallery", id),
            ArchiveError::Fetch { photo_id, reason } => {
                write!(f, "Failed to fetch photo {}: {}", photo_id, reason)
            }
            ArchiveError::Zip(msg) => write!(f, "ZIP error: {}", msg),
            ArchiveError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Io(err)
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Zip(err.to_string())
    }
}

/// A finished zip archive, held in memory until saved
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub entries: usize,
}

impl PhotoArchive {
    /// Writes the archive into `dir` and returns the full path
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ArchiveError> {
        let path = write_into(dir, &self.file_name, &self.bytes)?;
        log::info!(
            "Saved {} photos to {} ({} bytes)",
            self.entries,
            path.display(),
            self.bytes.len()
        );
        Ok(path)
    }
}

/// One downloaded photo, held in memory until saved
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    /// Writes the photo into `dir` and returns the full path
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ArchiveError> {
        let path = write_into(dir, &self.file_name, &self.bytes)?;
        log::info!("Saved photo to {}", path.display());
        Ok(path)
    }
}

fn write_into(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ArchiveError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, bytes)?;
    Ok(path)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// `photo_<n>_by_<uploader>.jpg`, `n` counting from 1
pub fn entry_name(index: usize, photo: &Photo) -> String {
    format!("photo_{}_by_{}.jpg", index + 1, sanitize(&photo.uploader_name))
}

/// File name for a single downloaded photo.
///
/// A guest's own photos are named by id (`photo-<id>.jpg`), everything else
/// by uploader (`photo_by_<uploader>.jpg`).
pub fn single_file_name(kind: CollectionKind, photo: &Photo) -> String {
    match kind {
        CollectionKind::Mine => format!("photo-{}.jpg", sanitize(&photo.id)),
        CollectionKind::All | CollectionKind::Admin => {
            format!("photo_by_{}.jpg", sanitize(&photo.uploader_name))
        }
    }
}

/// Fetches one photo's bytes for saving
pub async fn fetch_photo<S: PhotoService>(
    service: &S,
    photo: &Photo,
    kind: CollectionKind,
) -> Result<PhotoFile, ArchiveError> {
    let bytes = service
        .fetch_bytes(&photo.url)
        .await
        .map_err(|reason| ArchiveError::Fetch {
            photo_id: photo.id.clone(),
            reason,
        })?;
    Ok(PhotoFile {
        file_name: single_file_name(kind, photo),
        bytes,
    })
}

/// Fetches every photo in order and packs them into one zip.
///
/// Strictly sequential; the first failed fetch aborts the whole archive.
pub async fn build_archive<S: PhotoService>(
    service: &S,
    photos: &[Photo],
    file_name: &str,
) -> Result<PhotoArchive, ArchiveError> {
    if photos.is_empty() {
        return Err(ArchiveError::Empty);
    }

    log::info!("Preparing {} photos for download", photos.len());

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options: zip::write::FileOptions<'_, ()> =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (index, photo) in photos.iter().enumerate() {
        let bytes = service
            .fetch_bytes(&photo.url)
            .await
            .map_err(|reason| ArchiveError::Fetch {
                photo_id: photo.id.clone(),
                reason,
            })?;

        zip.start_file(entry_name(index, photo), options)?;
        zip.write_all(&bytes)?;
        log::debug!("Packed photo {} ({}/{})", photo.id, index + 1, photos.len());
    }

    let bytes = zip.finish()?.into_inner();
    Ok(PhotoArchive {
        file_name: file_name.to_string(),
        bytes,
        entries: photos.len(),
    })
}
