use crate::scene::{compose_transform_matrix, Model, SceneSettings};
use glam::Mat4;

pub const BOUNCE_FREQUENCY: f32 = 1.5;
pub const BOUNCE_AMPLITUDE: f32 = 0.1;
/// Spin speed around Y in radians per second.
pub const SPIN_SPEED: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationFlags {
    pub bounce: bool,
    pub spin: bool,
}

impl AnimationFlags {
    pub fn from_settings(settings: &SceneSettings) -> Self {
        Self {
            bounce: settings.enable_bounce,
            spin: settings.enable_rotation,
        }
    }
}

/// Transform handed to the renderer. The model in the store is never touched.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RenderTransform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: f32,
    pub matrix: Mat4,
}

/// Procedural motion as a pure function of flags, elapsed seconds and base transform.
/// Disabled animations contribute exactly nothing, so toggling snaps on the next frame.
pub fn animate(model: &Model, flags: AnimationFlags, elapsed: f32) -> RenderTransform {
    let mut position = model.position;
    let mut rotation = model.rotation;
    if flags.bounce {
        position[1] = model.position[1] + (elapsed * BOUNCE_FREQUENCY).sin() * BOUNCE_AMPLITUDE;
    }
    if flags.spin {
        rotation[1] = model.rotation[1] + elapsed * SPIN_SPEED;
    }
    RenderTransform {
        position,
        rotation,
        scale: model.scale,
        matrix: compose_transform_matrix(position, rotation, model.scale),
    }
}
