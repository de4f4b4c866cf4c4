//! Camera fusion: one camera pose per frame from either device orientation or
//! manual orbit input, gated by the motion-permission lifecycle.
//!
//! ## Permission lifecycle
//!
//! ```text
//!   mount ──(no gate)──► NotRequired ──► Granted ──► subscribe
//!     │
//!     └──(gate)──► Unknown ──request()──► Requesting ──► Granted ──► subscribe
//!                                                   └──► Denied ──(one retry)──► Requesting
//! ```
//!
//! Denial is not an error: the orbit camera keeps driving the pose for the
//! rest of the session.

use super::camera::{OrbitCamera, OrbitInput};
use super::sensor::{
    poll_permission, OrientationSample, OrientationSensor, PermissionOutcome, PermissionRequest,
    SensorSubscription,
};
use crate::scene::SceneSettings;
use glam::{Quat, Vec3};

/// Per-frame spherical blend toward the gyro target.
pub const GYRO_SMOOTHING: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionState {
    Unknown,
    NotRequired,
    Requesting,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseSource {
    Gyro,
    Orbit,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
    pub fov_deg: f32,
    pub source: PoseSource,
}

/// Device orientation (degrees) to camera orientation.
///
/// Pitch takes beta, yaw takes alpha, roll takes -gamma, applied yaw-pitch-roll.
/// This remap matches how the sensor is mounted relative to the camera's
/// forward axis and must not be "corrected".
pub fn gyro_orientation(sample: &OrientationSample) -> Quat {
    let pitch = sample.beta.to_radians();
    let yaw = sample.alpha.to_radians();
    let roll = (-sample.gamma).to_radians();
    Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch) * Quat::from_rotation_z(roll)
}

pub struct CameraFusionController {
    sensor: Box<dyn OrientationSensor>,
    permission: PermissionState,
    pending: Option<PermissionRequest>,
    subscription: Option<SensorSubscription>,
    retry_available: bool,
    last_sample: Option<OrientationSample>,
    target: Option<Quat>,
    orientation: Quat,
    orbit: OrbitCamera,
}

impl CameraFusionController {
    /// Mounts the controller. Platforms without a gate are granted immediately
    /// and the sensor stream is opened right away.
    pub fn mount(sensor: Box<dyn OrientationSensor>, orbit: OrbitCamera) -> Self {
        let permission = if sensor.requires_permission() {
            PermissionState::Unknown
        } else {
            PermissionState::NotRequired
        };
        let mut controller = Self {
            sensor,
            permission,
            pending: None,
            subscription: None,
            retry_available: true,
            last_sample: None,
            target: None,
            orientation: orbit.orientation(),
            orbit,
        };
        if permission == PermissionState::NotRequired {
            controller.grant();
        }
        controller
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn last_sample(&self) -> Option<OrientationSample> {
        self.last_sample
    }

    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    /// Whether the user should be offered a button to enable motion controls.
    pub fn can_request_permission(&self) -> bool {
        match self.permission {
            PermissionState::Unknown => true,
            PermissionState::Denied => self.retry_available,
            _ => false,
        }
    }

    /// Explicit user action. Returns false when no request was started.
    pub fn request_permission(&mut self) -> bool {
        if !self.can_request_permission() {
            log::debug!(
                "motion permission request ignored in state {:?}",
                self.permission
            );
            return false;
        }
        if self.permission == PermissionState::Denied {
            self.retry_available = false;
        }
        log::info!("Requesting motion permission");
        self.pending = Some(self.sensor.request_permission());
        self.permission = PermissionState::Requesting;
        true
    }

    /// Advances the permission request and drains sensor readings. Call once per frame.
    pub fn update(&mut self) {
        self.poll_pending();
        self.drain_samples();
    }

    /// Resolves this frame's camera pose. FOV is read from `settings` each call.
    pub fn resolve(&mut self, settings: &SceneSettings, input: &OrbitInput) -> CameraPose {
        match (self.permission, self.target) {
            (PermissionState::Granted, Some(target)) => {
                self.orientation = self.orientation.slerp(target, GYRO_SMOOTHING).normalize();
                CameraPose {
                    position: self.orbit.position(),
                    orientation: self.orientation,
                    fov_deg: settings.camera_fov,
                    source: PoseSource::Gyro,
                }
            }
            _ => {
                self.orbit.apply(input);
                self.orientation = self.orbit.orientation();
                CameraPose {
                    position: self.orbit.position(),
                    orientation: self.orientation,
                    fov_deg: settings.camera_fov,
                    source: PoseSource::Orbit,
                }
            }
        }
    }

    /// Releases the sensor subscription and abandons any pending request.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            log::info!("Orientation sensor released");
        }
        if self.pending.take().is_some() {
            self.permission = PermissionState::Unknown;
        }
        self.target = None;
    }

    fn poll_pending(&mut self) {
        let Some(request) = self.pending.as_mut() else {
            return;
        };
        let Some(result) = poll_permission(request) else {
            return;
        };
        self.pending = None;
        match result {
            Ok(PermissionOutcome::Granted) => {
                log::info!("Motion permission granted");
                self.grant();
            }
            Ok(PermissionOutcome::Denied) => {
                log::warn!("Motion permission denied, using orbit controls");
                self.permission = PermissionState::Denied;
            }
            Err(err) => {
                log::warn!("Motion permission request failed ({err}), using orbit controls");
                self.permission = PermissionState::Denied;
            }
        }
    }

    fn grant(&mut self) {
        self.permission = PermissionState::Granted;
        match SensorSubscription::open(self.sensor.as_mut()) {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(err) => log::warn!("Orientation sensor not started: {err}"),
        }
    }

    fn drain_samples(&mut self) {
        let Some(subscription) = self.subscription.as_mut() else {
            return;
        };
        let drained = subscription.drain();
        for reading in drained.readings {
            match reading.validate() {
                Some(sample) => {
                    self.last_sample = Some(sample);
                    self.target = Some(gyro_orientation(&sample));
                }
                None => log::debug!("discarding partial orientation reading {reading:?}"),
            }
        }
        if drained.disconnected {
            log::warn!("Orientation stream ended, keeping last target");
            self.subscription = None;
        }
    }
}

impl Drop for CameraFusionController {
    fn drop(&mut self) {
        self.unmount();
    }
}
