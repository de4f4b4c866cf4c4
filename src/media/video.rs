//! Live camera background. Follows the `show_video_background` setting and
//! guarantees the capture stream is stopped on every exit path.

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device available")]
    NoDevice,
    #[error("camera capture failed: {0}")]
    Platform(String),
}

/// Opaque handle to an acquired media stream.
#[derive(Debug, PartialEq, Eq)]
pub struct VideoStream {
    id: u64,
}

impl VideoStream {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Video capture collaborator.
pub trait VideoCapture {
    fn start(&mut self) -> Result<VideoStream, CaptureError>;
    fn stop(&mut self, stream: VideoStream);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Off,
    Live,
    /// Latched for the session once the user refuses camera access.
    Denied,
    /// Start failed for another reason; retried when the setting is turned on again.
    Unavailable,
}

pub struct VideoBackground {
    capture: Box<dyn VideoCapture>,
    stream: Option<VideoStream>,
    status: VideoStatus,
    was_enabled: bool,
}

impl VideoBackground {
    pub fn new(capture: Box<dyn VideoCapture>) -> Self {
        Self {
            capture,
            stream: None,
            status: VideoStatus::Off,
            was_enabled: false,
        }
    }

    pub fn status(&self) -> VideoStatus {
        self.status
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    /// Reacts to the current value of the video-background setting.
    pub fn sync(&mut self, enabled: bool) {
        let turned_on = enabled && !self.was_enabled;
        self.was_enabled = enabled;

        if !enabled {
            self.release();
            if self.status != VideoStatus::Denied {
                self.status = VideoStatus::Off;
            }
            return;
        }
        if self.stream.is_some() {
            return;
        }
        match self.status {
            VideoStatus::Denied => return,
            VideoStatus::Unavailable if !turned_on => return,
            _ => {}
        }

        match self.capture.start() {
            Ok(stream) => {
                log::info!("Camera stream {} started", stream.id());
                self.stream = Some(stream);
                self.status = VideoStatus::Live;
            }
            Err(CaptureError::PermissionDenied) => {
                log::warn!("Camera permission denied, continuing without video background");
                self.status = VideoStatus::Denied;
            }
            Err(err) => {
                log::warn!("Camera unavailable ({err}), continuing without video background");
                self.status = VideoStatus::Unavailable;
            }
        }
    }

    /// Stops the stream if one is held. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::info!("Camera stream {} stopped", stream.id());
            self.capture.stop(stream);
            self.status = VideoStatus::Off;
        }
    }
}

impl Drop for VideoBackground {
    fn drop(&mut self) {
        self.release();
    }
}

/// Capture for hosts without a camera.
#[derive(Debug, Default)]
pub struct UnavailableCapture;

impl VideoCapture for UnavailableCapture {
    fn start(&mut self) -> Result<VideoStream, CaptureError> {
        Err(CaptureError::NoDevice)
    }

    fn stop(&mut self, _stream: VideoStream) {}
}
