// Camera capture for the upload view.
//
// The camera hardware sits behind `MediaDevices` / `MediaStream`. A running
// stream is owned by a `CaptureSession`, which stops every track when it is
// dropped, so leaving the view, switching cameras and failing half-way all
// release the device.

use crate::image_processing;
use std::path::Path;

/// Which camera to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    /// Front camera
    User,
    /// Back camera
    #[default]
    Environment,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    /// Constraint value understood by media APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FacingMode::User => "front",
            FacingMode::Environment => "back",
        }
    }
}

/// Portrait 9:16, the ratio captured photos are framed in
pub const PORTRAIT_ASPECT_RATIO: f64 = 9.0 / 16.0;

/// Constraints passed to [`MediaDevices::get_user_media`]
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub aspect_ratio: f64,
}

impl VideoConstraints {
    pub fn portrait(facing_mode: FacingMode) -> Self {
        Self {
            facing_mode,
            aspect_ratio: PORTRAIT_ASPECT_RATIO,
        }
    }
}

/// One uncompressed video frame
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    /// Permission denied or no matching device
    CameraUnavailable(String),
    /// Capture attempted without a running stream
    NoActiveStream,
    /// The stream has not delivered a frame yet
    FrameUnavailable,
    /// The frame could not be encoded
    Encoding(String),
}

impl std::fmt::Display for CameraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraError::CameraUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            CameraError::NoActiveStream => write!(f, "No active camera stream"),
            CameraError::FrameUnavailable => write!(f, "Camera has not delivered a frame yet"),
            CameraError::Encoding(msg) => write!(f, "Encoding error: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}

/// Access to camera devices
#[allow(async_fn_in_trait)]
pub trait MediaDevices {
    type Stream: MediaStream;

    /// Requests a stream matching `constraints`
    async fn get_user_media(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Self::Stream, CameraError>;
}

/// A live camera stream made of one or more hardware tracks
pub trait MediaStream {
    fn track_count(&self) -> usize;

    /// Stops every track; calling it again does nothing
    fn stop_all(&mut self);

    /// Current video frame, if one is available
    fn grab_frame(&self) -> Option<RawFrame>;
}

/// Exclusive owner of a running stream. Dropping it stops all tracks.
pub struct CaptureSession<T: MediaStream> {
    stream: T,
    facing_mode: FacingMode,
}

impl<T: MediaStream> CaptureSession<T> {
    fn new(stream: T, facing_mode: FacingMode) -> Self {
        Self {
            stream,
            facing_mode,
        }
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    pub fn stream(&self) -> &T {
        &self.stream
    }
}

impl<T: MediaStream> Drop for CaptureSession<T> {
    fn drop(&mut self) {
        log::debug!(
            "Releasing {} camera ({} tracks)",
            self.facing_mode.label(),
            self.stream.track_count()
        );
        self.stream.stop_all();
    }
}

/// A captured still, JPEG encoded
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CapturedImage {
    pub const MIME: &'static str = "image/jpeg";

    /// `data:image/jpeg;base64,...` payload for base64 uploads
    pub fn to_data_url(&self) -> String {
        image_processing::to_data_url(Self::MIME, &self.bytes)
    }
}

/// Drives the live camera feed of the upload view.
///
/// Holds at most one [`CaptureSession`]; dropping the controller releases it.
pub struct CaptureController<D: MediaDevices> {
    devices: D,
    facing_mode: FacingMode,
    session: Option<CaptureSession<D::Stream>>,
    last_frame: Option<CapturedImage>,
    jpeg_quality: u8,
}

impl<D: MediaDevices> CaptureController<D> {
    pub fn new(devices: D) -> Self {
        Self {
            devices,
            facing_mode: FacingMode::default(),
            session: None,
            last_frame: None,
            jpeg_quality: 92,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    pub fn last_frame(&self) -> Option<&CapturedImage> {
        self.last_frame.as_ref()
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    /// Starts the camera facing `facing_mode`, replacing any running session.
    ///
    /// The previous session is released before the new stream is requested,
    /// and stays released if the request fails.
    pub async fn start_capture(&mut self, facing_mode: FacingMode) -> Result<(), CameraError> {
        self.stop();
        self.facing_mode = facing_mode;

        let constraints = VideoConstraints::portrait(facing_mode);
        match self.devices.get_user_media(&constraints).await {
            Ok(stream) => {
                log::info!(
                    "Camera started ({}, {} tracks)",
                    facing_mode.label(),
                    stream.track_count()
                );
                self.session = Some(CaptureSession::new(stream, facing_mode));
                Ok(())
            }
            Err(e) => {
                log::warn!("Unable to access camera: {}", e);
                Err(match e {
                    CameraError::CameraUnavailable(msg) => CameraError::CameraUnavailable(msg),
                    other => CameraError::CameraUnavailable(other.to_string()),
                })
            }
        }
    }

    /// Switches between front and back camera and restarts the stream
    pub async fn switch_facing(&mut self) -> Result<FacingMode, CameraError> {
        let next = self.facing_mode.toggled();
        self.start_capture(next).await?;
        log::info!("Switched to {} camera", next.label());
        Ok(next)
    }

    /// Snapshots the current video frame as JPEG
    pub fn capture_frame(&mut self) -> Result<CapturedImage, CameraError> {
        let session = self.session.as_ref().ok_or(CameraError::NoActiveStream)?;
        let frame = session
            .stream()
            .grab_frame()
            .filter(|f| f.width > 0 && f.height > 0)
            .ok_or(CameraError::FrameUnavailable)?;

        let bytes = image_processing::encode_jpeg(&frame, self.jpeg_quality)?;
        let captured = CapturedImage {
            bytes,
            width: frame.width,
            height: frame.height,
        };
        self.last_frame = Some(captured.clone());
        Ok(captured)
    }

    /// Releases the camera. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            drop(session);
        }
    }
}

impl<D: MediaDevices> Drop for CaptureController<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A "camera" that shows a still image, for kiosks and scripted capture.
///
/// The image is center-cropped to the requested aspect ratio like a live feed.
pub struct StillImageDevices {
    frame: RawFrame,
}

impl StillImageDevices {
    pub fn new(frame: RawFrame) -> Self {
        Self { frame }
    }

    pub fn from_path(path: &Path) -> Result<Self, CameraError> {
        image_processing::decode_to_frame(path).map(Self::new)
    }
}

pub struct StillImageStream {
    frame: RawFrame,
    live: bool,
}

impl MediaDevices for StillImageDevices {
    type Stream = StillImageStream;

    async fn get_user_media(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Self::Stream, CameraError> {
        Ok(StillImageStream {
            frame: image_processing::crop_to_aspect(&self.frame, constraints.aspect_ratio)?,
            live: true,
        })
    }
}

impl MediaStream for StillImageStream {
    fn track_count(&self) -> usize {
        usize::from(self.live)
    }

    fn stop_all(&mut self) {
        self.live = false;
    }

    fn grab_frame(&self) -> Option<RawFrame> {
        self.live.then(|| self.frame.clone())
    }
}
