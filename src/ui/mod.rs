//! Control-panel logic: turns user edits into [`SceneState`] mutations.

mod panel;

pub use panel::{ControlPanel, PanelOutput, PanelStatus};

use crate::scene::{EnvironmentPreset, ListenerId, Model, ModelId, ModelPatch, SceneChange, SceneState};
use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::path::Path;
use std::rc::Rc;

pub const POSITION_RANGE: RangeInclusive<f32> = -5.0..=5.0;
pub const ROTATION_RANGE_DEG: RangeInclusive<f32> = -180.0..=180.0;
pub const SCALE_RANGE: RangeInclusive<f32> = 0.1..=5.0;
pub const FOV_RANGE: RangeInclusive<f32> = 40.0..=80.0;

pub const SAMPLE_MODEL_URI: &str = "assets/models/DamagedHelmet.glb";
const UPLOAD_POSITION: [f32; 3] = [0.0, 0.0, -2.0];
const SAMPLE_POSITION: [f32; 3] = [0.0, 0.5, -2.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// One user edit from a control widget.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    UploadModel { uri: String },
    AddSampleModel,
    Select(Option<ModelId>),
    SetPosition { axis: Axis, value: f32 },
    SetRotationDegrees { axis: Axis, degrees: f32 },
    SetScale(f32),
    SnapToGround,
    RemoveSelected,
    SetCameraFov(f32),
    SetEnvironment(EnvironmentPreset),
    SetShadows(bool),
    SetVideoBackground(bool),
    SetBounce(bool),
    SetSpin(bool),
    SetLightHeight(f32),
    SetLightIntensity(f32),
    SetLightDistance(f32),
    SetShadowRadius(f32),
    SetContactShadowBlur(f32),
    SetContactShadowOpacity(f32),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EditorError {
    #[error("unsupported model format: {0} (expected .glb or .gltf)")]
    UnsupportedFormat(String),
    #[error("no model selected")]
    NothingSelected,
}

/// Applies [`EditorCommand`]s and keeps a one-line summary of the scene current
/// through a store subscription.
pub struct TransformEditor {
    summary: Rc<RefCell<String>>,
    listener: Option<ListenerId>,
}

impl TransformEditor {
    pub fn attach(scene: &mut SceneState) -> Self {
        let summary = Rc::new(RefCell::new(summarize(scene)));
        let sink = Rc::clone(&summary);
        let listener = scene.subscribe(move |change, state| {
            if !matches!(change, SceneChange::SettingChanged(_)) {
                *sink.borrow_mut() = summarize(state);
            }
        });
        Self {
            summary,
            listener: Some(listener),
        }
    }

    pub fn detach(&mut self, scene: &mut SceneState) {
        if let Some(listener) = self.listener.take() {
            scene.unsubscribe(listener);
        }
    }

    pub fn summary(&self) -> String {
        self.summary.borrow().clone()
    }

    pub fn apply(&mut self, scene: &mut SceneState, command: EditorCommand) -> Result<(), EditorError> {
        match command {
            EditorCommand::UploadModel { uri } => {
                if !is_supported_model(&uri) {
                    return Err(EditorError::UnsupportedFormat(uri));
                }
                let id = scene.allocate_id();
                scene.add_model(Model::new(id, uri).with_position(UPLOAD_POSITION));
            }
            EditorCommand::AddSampleModel => {
                let id = scene.allocate_id();
                scene.add_model(Model::new(id, SAMPLE_MODEL_URI).with_position(SAMPLE_POSITION));
            }
            EditorCommand::Select(id) => scene.select(id),
            EditorCommand::SetPosition { axis, value } => {
                let mut position = selected(scene)?.position;
                position[axis.index()] = clamp(value, POSITION_RANGE);
                scene.update_selected(ModelPatch::position(position));
            }
            EditorCommand::SetRotationDegrees { axis, degrees } => {
                let mut rotation = selected(scene)?.rotation;
                rotation[axis.index()] = clamp(degrees, ROTATION_RANGE_DEG).to_radians();
                scene.update_selected(ModelPatch::rotation(rotation));
            }
            EditorCommand::SetScale(scale) => {
                selected(scene)?;
                scene.update_selected(ModelPatch::scale(clamp(scale, SCALE_RANGE)));
            }
            EditorCommand::SnapToGround => {
                let mut position = selected(scene)?.position;
                position[1] = 0.0;
                scene.update_selected(ModelPatch::position(position));
            }
            EditorCommand::RemoveSelected => {
                if scene.remove_selected().is_none() {
                    return Err(EditorError::NothingSelected);
                }
            }
            EditorCommand::SetCameraFov(fov) => scene.set_camera_fov(clamp(fov, FOV_RANGE)),
            EditorCommand::SetEnvironment(preset) => scene.set_environment(preset),
            EditorCommand::SetShadows(on) => scene.set_shadows(on),
            EditorCommand::SetVideoBackground(on) => scene.set_show_video_background(on),
            EditorCommand::SetBounce(on) => scene.set_enable_bounce(on),
            EditorCommand::SetSpin(on) => scene.set_enable_rotation(on),
            EditorCommand::SetLightHeight(height) => {
                let mut position = scene.settings().light_position;
                position[1] = height;
                scene.set_light_position(position);
            }
            EditorCommand::SetLightIntensity(value) => scene.set_light_intensity(value),
            EditorCommand::SetLightDistance(value) => scene.set_light_distance(value),
            EditorCommand::SetShadowRadius(value) => scene.set_shadow_radius(value),
            EditorCommand::SetContactShadowBlur(value) => scene.set_contact_shadow_blur(value),
            EditorCommand::SetContactShadowOpacity(value) => {
                scene.set_contact_shadow_opacity(value)
            }
        }
        Ok(())
    }

    /// Applies a batch, logging and skipping commands that fail.
    pub fn apply_all(&mut self, scene: &mut SceneState, commands: Vec<EditorCommand>) {
        for command in commands {
            if let Err(err) = self.apply(scene, command) {
                log::warn!("edit ignored: {err}");
            }
        }
    }
}

pub fn is_supported_model(uri: &str) -> bool {
    Path::new(uri)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("glb") || ext.eq_ignore_ascii_case("gltf"))
        .unwrap_or(false)
}

fn selected(scene: &SceneState) -> Result<&Model, EditorError> {
    scene.selected_model().ok_or(EditorError::NothingSelected)
}

fn clamp(value: f32, range: RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

fn summarize(scene: &SceneState) -> String {
    let count = scene.models().len();
    let noun = if count == 1 { "model" } else { "models" };
    match scene.selected_model() {
        Some(model) => format!("{count} {noun}, selected {} ({})", model.name, model.id),
        None => format!("{count} {noun}, nothing selected"),
    }
}
