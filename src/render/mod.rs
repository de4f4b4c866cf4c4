pub mod animator;
mod camera;
pub mod composer;
pub mod fusion;
pub mod lighting;
pub mod pick;
pub mod sensor;

pub use animator::{animate, AnimationFlags, RenderTransform};
pub use camera::{
    OrbitCamera, OrbitInput, CAMERA_FAR, CAMERA_NEAR, INITIAL_CAMERA_POSITION, MAX_ORBIT_DISTANCE,
    MIN_ORBIT_DISTANCE, ORBIT_TARGET,
};
pub use composer::{FrameDescription, FrameInput, ModelFrame, Renderer, SceneComposer};
pub use fusion::{CameraFusionController, CameraPose, PermissionState, PoseSource};
pub use lighting::{derive_lighting, LightingDescription};
pub use pick::{PickEvent, PickKey, PickKind, PickTarget};
pub use sensor::{
    permission_channel, CancellationToken, OrientationSample, OrientationSensor,
    PermissionOutcome, PermissionRequest, PermissionResolver, RawOrientation, SensorError,
    UnavailableSensor,
};
