use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The guest's self-entered display name, sent as `uploaderName`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestProfile {
    pub name: String,
}

impl GuestProfile {
    /// Creates a profile, trimming the name
    pub fn new(name: &str) -> Result<Self, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Please enter your name".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Loads the stored profile; `Ok(None)` if none was saved yet
    pub fn load(path: &Path) -> Result<Option<Self>, AppError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let profile = Self::from_toml(&content)
            .map_err(|e| AppError::Config(format!("Invalid guest profile: {}", e)))?;
        // Reject a hand-edited empty name the same way as user input
        Self::new(&profile.name).map(Some)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = self
            .to_toml()
            .map_err(|e| AppError::Config(format!("Failed to serialize guest profile: {}", e)))?;
        std::fs::write(path, content)?;
        log::info!("Saved guest name '{}'", self.name);
        Ok(())
    }

    pub fn clear(path: &Path) -> Result<(), AppError> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
