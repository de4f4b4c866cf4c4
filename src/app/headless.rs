//! Collaborators for running a session with no window, motion hardware or camera.

use crate::render::{
    CancellationToken, FrameDescription, OrientationSensor,
    PermissionOutcome, PermissionRequest, PickEvent, RawOrientation, Renderer, SensorError,
};
use std::sync::mpsc::Receiver;

/// No motion hardware. With `gated` set it behaves like a platform that asks
/// first, and every request is refused since nobody is there to accept it.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessSensor {
    pub gated: bool,
}

impl OrientationSensor for HeadlessSensor {
    fn requires_permission(&self) -> bool {
        self.gated
    }

    fn request_permission(&mut self) -> PermissionRequest {
        Box::pin(std::future::ready(Ok(PermissionOutcome::Denied)))
    }

    fn subscribe(
        &mut self,
        _token: CancellationToken,
    ) -> Result<Receiver<RawOrientation>, SensorError> {
        Err(SensorError::Unavailable)
    }
}

/// Renderer that logs each frame and keeps the most recent one.
#[derive(Debug, Default)]
pub struct LoggingRenderer {
    last: Option<FrameDescription>,
    frames: u64,
}

impl LoggingRenderer {
    pub fn last_frame(&self) -> Option<&FrameDescription> {
        self.last.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LoggingRenderer {
    fn render(&mut self, frame: &FrameDescription) {
        log::debug!(
            "frame {} t={:.3}s camera={:?} models={} prompt={} video={}",
            frame.frame,
            frame.elapsed,
            frame.camera.source,
            frame.models.len(),
            frame.permission_prompt.is_some(),
            frame.video_background
        );
        self.frames += 1;
        self.last = Some(frame.clone());
    }

    fn take_pick_events(&mut self) -> Vec<PickEvent> {
        Vec::new()
    }
}

