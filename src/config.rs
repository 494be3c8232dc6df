use crate::error::AppError;
use photo_service::PhotoServiceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`GalleryConfig::api_url`]
pub const API_URL_ENV: &str = "EVENT_GALLERY_API_URL";

/// Client configuration, read from a TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    /// API root of the remote photo service
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// File name used for bulk downloads
    pub archive_name: String,
    /// JPEG quality for captured frames (1-100)
    pub jpeg_quality: u8,
    /// Where the guest's display name is kept
    pub guest_profile_path: PathBuf,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            archive_name: "event_gallery_photos.zip".to_string(),
            jpeg_quality: 92,
            guest_profile_path: PathBuf::from("./guest.toml"),
        }
    }
}

impl GalleryConfig {
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Loads `path` (defaults if absent or `None`), then applies the environment
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p)?;
                Self::from_toml(&content).map_err(|e| {
                    AppError::Config(format!("Invalid config {}: {}", p.display(), e))
                })?
            }
            Some(p) => {
                log::debug!("Config {} not found, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    fn apply_env_override(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            log::debug!("API URL overridden by {}", API_URL_ENV);
            self.api_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_url.trim().is_empty() {
            return Err(AppError::Config("api_url must not be empty".to_string()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AppError::Config(
                "jpeg_quality must be between 1 and 100".to_string(),
            ));
        }
        if self.archive_name.trim().is_empty() {
            return Err(AppError::Config("archive_name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Connection settings for the photo service client
    pub fn service_config(&self) -> PhotoServiceConfig {
        PhotoServiceConfig {
            base_url: self.api_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..PhotoServiceConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GalleryConfig::from_toml("api_url = \"https://gallery.example.com/api\"\n").unwrap();
        assert_eq!(config.api_url, "https://gallery.example.com/api");
        assert_eq!(config.jpeg_quality, 92);
        assert_eq!(config.archive_name, "event_gallery_photos.zip");
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GalleryConfig::load(Some(&dir.path().join("nope.toml"))).unwrap();
        // The environment may set the URL; compare the rest
        config.api_url = GalleryConfig::default().api_url;
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn test_load_rejects_bad_quality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.toml");
        std::fs::write(&path, "jpeg_quality = 0\n").unwrap();
        assert!(matches!(
            GalleryConfig::load(Some(&path)),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_env_override() {
        let mut config = GalleryConfig::default();
        config.apply_env_override(Some("  https://other.example.com/api ".to_string()));
        assert_eq!(config.api_url, "https://other.example.com/api");

        config.apply_env_override(Some("   ".to_string()));
        assert_eq!(config.api_url, "https://other.example.com/api");
    }

    #[test]
    fn test_service_config_timeouts() {
        let config = GalleryConfig {
            request_timeout_secs: 5,
            ..GalleryConfig::default()
        };
        let service = config.service_config();
        assert_eq!(service.request_timeout, Duration::from_secs(5));
        assert_eq!(service.base_url, config.api_url);
    }
}
