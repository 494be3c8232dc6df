use crate::service::ServiceError;
use serde::{Deserialize, Serialize};

/// A photo as the gallery sees it.
///
/// `id` is assigned by the remote service and is the photo's identity;
/// `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub uploader_name: String,
    pub timestamp: i64,
}

/// Photo record as returned by the remote service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePhoto {
    #[serde(rename = "_id")]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub uploader_name: String,
    pub timestamp: RemoteTimestamp,
}

/// The service sends ISO-8601 strings; older records carry epoch millis
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RemoteTimestamp {
    Millis(i64),
    Iso(String),
}

impl RemoteTimestamp {
    pub fn to_millis(&self) -> Result<i64, ServiceError> {
        match self {
            RemoteTimestamp::Millis(ms) => Ok(*ms),
            RemoteTimestamp::Iso(s) => parse_iso_millis(s),
        }
    }
}

fn parse_iso_millis(s: &str) -> Result<i64, ServiceError> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    // Offset-less timestamps are taken as UTC
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().timestamp_millis())
        .map_err(|e| ServiceError::Decode(format!("Invalid timestamp '{}': {}", s, e)))
}

impl TryFrom<RemotePhoto> for Photo {
    type Error = ServiceError;

    fn try_from(remote: RemotePhoto) -> Result<Self, Self::Error> {
        let timestamp = remote.timestamp.to_millis()?;
        Ok(Photo {
            id: remote.id,
            url: remote.url,
            uploader_name: remote.uploader_name,
            timestamp,
        })
    }
}

/// `{photos: [...]}`
#[derive(Debug, Deserialize)]
pub(crate) struct PhotoListResponse {
    pub photos: Vec<RemotePhoto>,
}

/// `{photo: {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct PhotoResponse {
    pub photo: RemotePhoto,
}

/// Body of `POST /upload/base64`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Base64UploadRequest<'a> {
    pub image_data: &'a str,
    pub uploader_name: &'a str,
}

impl PhotoListResponse {
    pub fn into_photos(self) -> Result<Vec<Photo>, ServiceError> {
        self.photos.into_iter().map(Photo::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_photo_maps_id_and_iso_timestamp() {
        let json = r#"{
            "_id": "65a1f",
            "url": "https://cdn.example.com/65a1f.jpg",
            "uploaderName": "Asha",
            "timestamp": "2024-02-10T18:30:00.000Z"
        }"#;
        let remote: RemotePhoto = serde_json::from_str(json).unwrap();
        let photo = Photo::try_from(remote).unwrap();

        assert_eq!(photo.id, "65a1f");
        assert_eq!(photo.uploader_name, "Asha");
        assert_eq!(photo.timestamp, 1_707_589_800_000);
    }

    #[test]
    fn test_numeric_timestamp_is_kept() {
        let json = r#"{"_id": "a", "url": "u", "uploaderName": "B", "timestamp": 1700000000000}"#;
        let remote: RemotePhoto = serde_json::from_str(json).unwrap();
        assert_eq!(Photo::try_from(remote).unwrap().timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_offsetless_timestamp_is_utc() {
        let ts = RemoteTimestamp::Iso("1970-01-01T00:00:01".to_string());
        assert_eq!(ts.to_millis().unwrap(), 1000);
    }

    #[test]
    fn test_invalid_timestamp_is_decode_error() {
        let ts = RemoteTimestamp::Iso("yesterday".to_string());
        assert!(matches!(ts.to_millis(), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_list_response_into_photos() {
        let json = r#"{"photos": [
            {"_id": "1", "url": "u1", "uploaderName": "A", "timestamp": "2024-01-01T00:00:00Z"},
            {"_id": "2", "url": "u2", "timestamp": 5}
        ]}"#;
        let list: PhotoListResponse = serde_json::from_str(json).unwrap();
        let photos = list.into_photos().unwrap();

        assert_eq!(photos.len(), 2);
        assert_eq!(photos[1].uploader_name, "");
        assert_eq!(photos[1].timestamp, 5);
    }

    #[test]
    fn test_base64_request_uses_camel_case() {
        let body = serde_json::to_value(Base64UploadRequest {
            image_data: "data:image/jpeg;base64,AAAA",
            uploader_name: "Asha",
        })
        .unwrap();
        assert_eq!(body["imageData"], "data:image/jpeg;base64,AAAA");
        assert_eq!(body["uploaderName"], "Asha");
    }
}
