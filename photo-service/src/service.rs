use crate::models::Photo;

/// Result type for remote photo service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by the remote photo service
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The request never produced a response
    Network(String),
    /// The service answered with a non-success status
    Status { status: u16, body: String },
    /// The response body could not be decoded
    Decode(String),
}

impl ServiceError {
    /// HTTP status, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Network(msg) => write!(f, "Network error: {}", msg),
            ServiceError::Status { status, .. } => write!(f, "Server returned status {}", status),
            ServiceError::Decode(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// The remote photo service, the authoritative store of photos.
///
/// Every call is a single attempt; callers decide whether to retry.
/// Privileged calls (`list_admin`, `delete_photo`) rely on the
/// implementation to attach whatever admin credential is current.
#[allow(async_fn_in_trait)]
pub trait PhotoService {
    /// `GET /gallery?name=<filter>`
    async fn list_gallery(&self, name_filter: Option<&str>) -> ServiceResult<Vec<Photo>>;

    /// `GET /gallery/user/{uploaderName}`
    async fn list_by_uploader(&self, uploader_name: &str) -> ServiceResult<Vec<Photo>>;

    /// `GET /admin/uploads`
    async fn list_admin(&self) -> ServiceResult<Vec<Photo>>;

    /// `POST /upload` (multipart)
    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        uploader_name: &str,
    ) -> ServiceResult<Photo>;

    /// `POST /upload/base64` with a `data:` URL
    async fn upload_base64(&self, data_url: &str, uploader_name: &str) -> ServiceResult<Photo>;

    /// `DELETE /admin/delete/{id}`
    async fn delete_photo(&self, id: &str) -> ServiceResult<()>;

    /// Raw bytes behind a photo's `url`
    async fn fetch_bytes(&self, url: &str) -> ServiceResult<Vec<u8>>;
}
