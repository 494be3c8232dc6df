//! `reqwest` implementation of [`PhotoService`]
//!
//! All requests share one client with a cookie store, so a session cookie set
//! by the admin login travels with later requests. Where cookies are not
//! honoured, privileged requests fall back to the `adminKey` query parameter
//! read from the shared [`CredentialSlot`].

use crate::models::{Base64UploadRequest, Photo, PhotoListResponse, PhotoResponse};
use crate::service::{PhotoService, ServiceError, ServiceResult};
use admin_auth::CredentialSlot;
use reqwest::{Response, Url};
use std::time::Duration;

/// Connection settings for the remote photo service
#[derive(Debug, Clone)]
pub struct PhotoServiceConfig {
    /// API root, e.g. `https://gallery.example.com/api`
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl PhotoServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for PhotoServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("EventGallery/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build the HTTP client shared by the photo service and the admin login
pub fn build_client(config: &PhotoServiceConfig) -> ServiceResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(Duration::from_secs(30))
        .cookie_store(true)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| ServiceError::Network(format!("Client build failed: {}", e)))
}

/// Guess a MIME type from a file name's extension
pub fn guess_mime_from_name(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") | Some("heif") => "image/heic",
        _ => "image/jpeg",
    }
}

/// HTTP client for the remote photo service
pub struct HttpPhotoService {
    config: PhotoServiceConfig,
    client: reqwest::Client,
    credentials: CredentialSlot,
}

impl HttpPhotoService {
    pub fn new(
        config: PhotoServiceConfig,
        client: reqwest::Client,
        credentials: CredentialSlot,
    ) -> Self {
        Self {
            config,
            client,
            credentials,
        }
    }

    pub fn config(&self) -> &PhotoServiceConfig {
        &self.config
    }

    /// API URL with each segment percent-encoded
    fn url(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| ServiceError::Network(format!("Invalid API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::Network("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `adminKey` query pair, read fresh from the slot on every call
    fn admin_query(&self) -> Vec<(&'static str, String)> {
        match self.credentials.current() {
            Some(cred) => vec![("adminKey", cred.expose().to_string())],
            None => Vec::new(),
        }
    }

    async fn checked(response: Response) -> ServiceResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::error!("Server response: {} {}", status, body);
        Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_photo_list(&self, request: reqwest::RequestBuilder) -> ServiceResult<Vec<Photo>> {
        let response = request.header("Accept", "application/json").send().await?;
        let list: PhotoListResponse = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        list.into_photos()
    }

    async fn read_photo(response: Response) -> ServiceResult<Photo> {
        let body: PhotoResponse = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        Photo::try_from(body.photo)
    }
}

impl PhotoService for HttpPhotoService {
    async fn list_gallery(&self, name_filter: Option<&str>) -> ServiceResult<Vec<Photo>> {
        let mut request = self.client.get(self.url(&["gallery"])?);
        if let Some(name) = name_filter.filter(|n| !n.is_empty()) {
            request = request.query(&[("name", name)]);
        }
        let photos = self.get_photo_list(request).await?;
        log::debug!("Fetched {} gallery photos", photos.len());
        Ok(photos)
    }

    async fn list_by_uploader(&self, uploader_name: &str) -> ServiceResult<Vec<Photo>> {
        let request = self
            .client
            .get(self.url(&["gallery", "user", uploader_name])?);
        let photos = self.get_photo_list(request).await?;
        log::debug!("Fetched {} photos by {}", photos.len(), uploader_name);
        Ok(photos)
    }

    async fn list_admin(&self) -> ServiceResult<Vec<Photo>> {
        let request = self
            .client
            .get(self.url(&["admin", "uploads"])?)
            .query(&self.admin_query());
        self.get_photo_list(request).await
    }

    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        uploader_name: &str,
    ) -> ServiceResult<Photo> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(guess_mime_from_name(file_name))?;
        let form = reqwest::multipart::Form::new()
            .part("photo", part)
            .text("uploaderName", uploader_name.to_string());

        let response = self
            .client
            .post(self.url(&["upload"])?)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;
        let photo = Self::read_photo(response).await?;
        log::info!("Uploaded {} as photo {}", file_name, photo.id);
        Ok(photo)
    }

    async fn upload_base64(&self, data_url: &str, uploader_name: &str) -> ServiceResult<Photo> {
        let response = self
            .client
            .post(self.url(&["upload", "base64"])?)
            .header("Accept", "application/json")
            .json(&Base64UploadRequest {
                image_data: data_url,
                uploader_name,
            })
            .send()
            .await?;
        let photo = Self::read_photo(response).await?;
        log::info!("Uploaded captured image as photo {}", photo.id);
        Ok(photo)
    }

    async fn delete_photo(&self, id: &str) -> ServiceResult<()> {
        let response = self
            .client
            .delete(self.url(&["admin", "delete", id])?)
            .header("Accept", "application/json")
            .query(&self.admin_query())
            .send()
            .await?;
        Self::checked(response).await?;
        log::info!("Deleted photo {}", id);
        Ok(())
    }

    async fn fetch_bytes(&self, url: &str) -> ServiceResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let bytes = Self::checked(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
