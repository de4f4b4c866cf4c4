//! Per-frame assembly of camera, lighting and animated models into one
//! [`FrameDescription`] for the external renderer.

use super::animator::{animate, AnimationFlags, RenderTransform};
use super::camera::{OrbitInput, CAMERA_FAR, CAMERA_NEAR};
use super::fusion::{CameraFusionController, PoseSource};
use super::lighting::{derive_lighting, LightingDescription};
use super::pick::{PickEvent, PickKey, PickTable, PickTarget};
use crate::scene::{ListenerId, ModelId, SceneChange, SceneState};
use glam::{Quat, Vec3};
use std::cell::Cell;
use std::rc::Rc;

/// World placement of the in-scene "enable motion controls" panel.
pub const PERMISSION_PROMPT_POSITION: [f32; 3] = [0.0, 2.0, -3.0];
pub const PERMISSION_PROMPT_SIZE: [f32; 3] = [2.0, 0.5, 0.1];

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CameraFrame {
    pub position: Vec3,
    pub orientation: Quat,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub source: PoseSource,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ModelFrame {
    pub id: ModelId,
    pub source_uri: String,
    pub pick: Option<PickKey>,
    pub selected: bool,
    pub transform: RenderTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PromptFrame {
    pub position: [f32; 3],
    pub size: [f32; 3],
    pub pick: PickKey,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FrameDescription {
    pub frame: u64,
    pub elapsed: f32,
    pub camera: CameraFrame,
    pub lights: LightingDescription,
    pub models: Vec<ModelFrame>,
    pub permission_prompt: Option<PromptFrame>,
    pub video_background: bool,
    /// Screen position the renderer should resolve to a [`PickEvent`].
    pub pick_request: Option<[f32; 2]>,
}

/// External rendering collaborator. Owns pixels, shadows and asset decoding.
pub trait Renderer {
    fn render(&mut self, frame: &FrameDescription);

    /// Pick events produced since the last call, keyed against the last rendered frame.
    fn take_pick_events(&mut self) -> Vec<PickEvent>;
}

/// Inputs for one frame that do not come from the scene store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub elapsed: f32,
    pub orbit: OrbitInput,
    pub pick_request: Option<[f32; 2]>,
    /// Whether a capture stream is actually live behind the scene.
    pub video_live: bool,
}

pub struct SceneComposer {
    pick_table: PickTable,
    lighting: Option<LightingDescription>,
    lighting_dirty: Rc<Cell<bool>>,
    listener: Option<ListenerId>,
    frame_index: u64,
}

impl SceneComposer {
    /// Creates a composer listening to `scene` for lighting-relevant changes.
    pub fn attach(scene: &mut SceneState) -> Self {
        let lighting_dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&lighting_dirty);
        let listener = scene.subscribe(move |change, _| match change {
            SceneChange::SettingChanged(key) if key.affects_lighting() => flag.set(true),
            SceneChange::Replaced => flag.set(true),
            _ => {}
        });
        Self {
            pick_table: PickTable::default(),
            lighting: None,
            lighting_dirty,
            listener: Some(listener),
            frame_index: 0,
        }
    }

    pub fn detach(&mut self, scene: &mut SceneState) {
        if let Some(listener) = self.listener.take() {
            scene.unsubscribe(listener);
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Builds this frame from a single snapshot of `scene`.
    pub fn compose(
        &mut self,
        scene: &SceneState,
        camera: &mut CameraFusionController,
        input: &FrameInput,
    ) -> FrameDescription {
        let snapshot = scene.snapshot();
        let pose = camera.resolve(&snapshot.settings, &input.orbit);

        // Without a listener there is no invalidation, so derive every frame.
        if self.listener.is_none() || self.lighting_dirty.replace(false) || self.lighting.is_none()
        {
            self.lighting = Some(derive_lighting(&snapshot.settings));
        }
        let lights = match &self.lighting {
            Some(lights) => lights.clone(),
            None => derive_lighting(&snapshot.settings),
        };

        self.pick_table.clear();
        let flags = AnimationFlags::from_settings(&snapshot.settings);
        let models = snapshot
            .models
            .iter()
            .map(|model| ModelFrame {
                id: model.id.clone(),
                source_uri: model.source_uri.clone(),
                pick: self.pick_table.register(&model.id),
                selected: snapshot.is_selected(&model.id),
                transform: animate(model, flags, input.elapsed),
            })
            .collect();

        let permission_prompt = camera.can_request_permission().then(|| PromptFrame {
            position: PERMISSION_PROMPT_POSITION,
            size: PERMISSION_PROMPT_SIZE,
            pick: self.pick_table.show_prompt(),
        });

        self.frame_index += 1;
        FrameDescription {
            frame: self.frame_index,
            elapsed: input.elapsed,
            camera: CameraFrame {
                position: pose.position,
                orientation: pose.orientation,
                fov_deg: pose.fov_deg,
                near: CAMERA_NEAR,
                far: CAMERA_FAR,
                source: pose.source,
            },
            lights,
            models,
            permission_prompt,
            video_background: snapshot.settings.show_video_background && input.video_live,
            pick_request: input.pick_request,
        }
    }

    /// Maps a render-layer pick onto the store: models become the selection,
    /// the prompt panel starts a permission request.
    pub fn handle_pick(
        &self,
        event: PickEvent,
        scene: &mut SceneState,
        camera: &mut CameraFusionController,
    ) -> PickTarget {
        let target = self.pick_table.resolve(event.key);
        match &target {
            PickTarget::Model(id) => scene.select(Some(id.clone())),
            PickTarget::PermissionPrompt => {
                if !camera.request_permission() {
                    log::debug!(
                        "prompt pick ignored while motion permission is {:?}",
                        camera.permission()
                    );
                }
            }
            PickTarget::Nothing => {
                log::debug!("pick at ({}, {}) hit nothing", event.screen_x, event.screen_y);
            }
        }
        target
    }

    /// Compose, submit and route the renderer's pick events back into the store.
    pub fn render_frame(
        &mut self,
        scene: &mut SceneState,
        camera: &mut CameraFusionController,
        input: &FrameInput,
        renderer: &mut dyn Renderer,
    ) -> FrameDescription {
        let frame = self.compose(scene, camera, input);
        renderer.render(&frame);
        for event in renderer.take_pick_events() {
            self.handle_pick(event, scene, camera);
        }
        frame
    }
}
