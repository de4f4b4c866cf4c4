mod video;

pub use video::{CaptureError, UnavailableCapture, VideoBackground, VideoCapture, VideoStatus, VideoStream};
