pub mod config;
mod headless;
mod input;
mod timing;

pub use config::SessionConfig;
pub use headless::{HeadlessSensor, LoggingRenderer};
pub use input::{FrameControls, InputState};
pub use timing::{FrameClock, FrameTick};

use crate::media::{VideoBackground, VideoCapture, VideoStatus};
use crate::render::{
    CameraFusionController, FrameDescription, FrameInput, OrbitCamera, OrientationSensor,
    Renderer, SceneComposer,
};
use crate::scene::serialization::{load_scene_from_file, save_scene_to_file, SerializationError};
use crate::scene::SceneState;
use crate::ui::{ControlPanel, EditorCommand, EditorError, PanelStatus, TransformEditor};
use std::path::Path;
use std::time::Instant;
use winit::event::WindowEvent;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("scene: {0}")]
    Scene(#[from] SerializationError),
    #[error("output: {0}")]
    Output(#[from] serde_json::Error),
}

/// One mounted viewer: the store plus everything that reads or writes it.
pub struct Session {
    scene: SceneState,
    editor: TransformEditor,
    panel: ControlPanel,
    camera: CameraFusionController,
    video: VideoBackground,
    composer: SceneComposer,
    input: InputState,
    clock: FrameClock,
    shut_down: bool,
}

impl Session {
    pub fn new(
        mut scene: SceneState,
        sensor: Box<dyn OrientationSensor>,
        capture: Box<dyn VideoCapture>,
        now: Instant,
    ) -> Self {
        let editor = TransformEditor::attach(&mut scene);
        let composer = SceneComposer::attach(&mut scene);
        let camera = CameraFusionController::mount(sensor, OrbitCamera::default());
        log::info!(
            "Session mounted with {} model(s), motion permission {:?}",
            scene.models().len(),
            camera.permission()
        );
        Self {
            scene,
            editor,
            panel: ControlPanel::new(),
            camera,
            video: VideoBackground::new(capture),
            composer,
            input: InputState::default(),
            clock: FrameClock::new(now),
            shut_down: false,
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn camera(&self) -> &CameraFusionController {
        &self.camera
    }

    pub fn video_status(&self) -> VideoStatus {
        self.video.status()
    }

    pub fn summary(&self) -> String {
        self.editor.summary()
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Returns true when the event was taken as camera input.
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        self.input.on_window_event(event)
    }

    pub fn apply(&mut self, command: EditorCommand) -> Result<(), EditorError> {
        self.editor.apply(&mut self.scene, command)
    }

    pub fn request_motion_permission(&mut self) -> bool {
        self.camera.request_permission()
    }

    pub fn panel_status(&self) -> PanelStatus {
        PanelStatus {
            permission: self.camera.permission(),
            can_request_motion: self.camera.can_request_permission(),
            video: self.video.status(),
            summary: self.editor.summary(),
        }
    }

    /// Draws the control panel and applies what it emitted.
    pub fn show_panel(&mut self, ui: &mut egui::Ui) {
        let status = self.panel_status();
        let output = self.panel.show(ui, &self.scene, &status);
        self.editor.apply_all(&mut self.scene, output.commands);
        if output.request_motion_permission {
            self.camera.request_permission();
        }
    }

    pub fn frame(&mut self, renderer: &mut dyn Renderer, now: Instant) -> FrameDescription {
        let tick = self.clock.update(now);
        self.camera.update();
        self.video.sync(self.scene.settings().show_video_background);
        let controls = self.input.take_frame(tick.dt);
        let input = FrameInput {
            elapsed: tick.elapsed,
            orbit: controls.orbit,
            pick_request: controls.pick_request,
            video_live: self.video.is_live(),
        };
        self.composer
            .render_frame(&mut self.scene, &mut self.camera, &input, renderer)
    }

    pub fn save(&self, path: &Path) -> Result<(), SerializationError> {
        save_scene_to_file(&self.scene, path)
    }

    /// Replaces the store contents with a saved document.
    pub fn load(&mut self, path: &Path) -> Result<(), SerializationError> {
        load_scene_from_file(path)?.apply_to(&mut self.scene);
        Ok(())
    }

    /// Releases the sensor subscription and camera stream and stops listening to the store.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.editor.detach(&mut self.scene);
        self.composer.detach(&mut self.scene);
        self.camera.unmount();
        self.video.release();
        log::info!("Session shut down after {} frame(s)", self.composer.frame_index());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
