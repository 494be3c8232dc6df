use photo_service::Photo;

/// The three photo views kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Shared gallery of every guest's photos
    All,
    /// Photos uploaded by the current guest
    Mine,
    /// Moderation view, loaded with admin privileges
    Admin,
}

impl CollectionKind {
    pub fn label(&self) -> &'static str {
        match self {
            CollectionKind::All => "all",
            CollectionKind::Mine => "mine",
            CollectionKind::Admin => "admin",
        }
    }
}

/// Loading status of one collection.
///
/// `loading` and `error` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
}

impl LoadState {
    pub fn loading() -> Self {
        Self {
            loading: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            loading: false,
            error: Some(message.into()),
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

/// Ordered photos, unique by id. Insertion order is kept for stable rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoCollection {
    photos: Vec<Photo>,
}

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection; later duplicates of an id are dropped
    pub fn from_photos(photos: Vec<Photo>) -> Self {
        let mut collection = Self::new();
        collection.replace(photos);
        collection
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Photo> {
        self.photos.iter()
    }

    pub fn as_slice(&self) -> &[Photo] {
        &self.photos
    }

    pub fn contains(&self, id: &str) -> bool {
        self.photos.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.photos.iter().map(|p| p.id.clone()).collect()
    }

    /// Appends `photo` unless its id is already present
    pub fn insert(&mut self, photo: Photo) -> bool {
        if self.contains(&photo.id) {
            return false;
        }
        self.photos.push(photo);
        true
    }

    /// Removes `id` if present; removing a missing id is a no-op
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.photos.len();
        self.photos.retain(|p| p.id != id);
        self.photos.len() != before
    }

    /// Full refresh: drops everything and loads `photos`
    pub fn replace(&mut self, photos: Vec<Photo>) {
        self.photos.clear();
        for photo in photos {
            self.insert(photo);
        }
    }

    pub fn into_vec(self) -> Vec<Photo> {
        self.photos
    }
}

impl<'a> IntoIterator for &'a PhotoCollection {
    type Item = &'a Photo;
    type IntoIter = std::slice::Iter<'a, Photo>;

    fn into_iter(self) -> Self::IntoIter {
        self.photos.iter()
    }
}
