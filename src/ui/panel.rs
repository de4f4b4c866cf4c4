use super::{
    Axis, EditorCommand, FOV_RANGE, POSITION_RANGE, ROTATION_RANGE_DEG, SCALE_RANGE,
};
use crate::media::VideoStatus;
use crate::render::PermissionState;
use crate::scene::{EnvironmentPreset, SceneState};
use std::ops::RangeInclusive;

/// Session state the panel shows but does not own.
#[derive(Debug, Clone)]
pub struct PanelStatus {
    pub permission: PermissionState,
    pub can_request_motion: bool,
    pub video: VideoStatus,
    pub summary: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PanelOutput {
    pub commands: Vec<EditorCommand>,
    pub request_motion_permission: bool,
}

/// egui control panel. Reads the store, emits commands; never mutates the store itself.
pub struct ControlPanel {
    upload_uri: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self {
            upload_uri: String::new(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, scene: &SceneState, status: &PanelStatus) -> PanelOutput {
        let mut out = PanelOutput::default();
        ui.heading("AR Mockup Tool");
        ui.label(&status.summary);
        ui.separator();

        ui.collapsing("Load Model", |ui| {
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.upload_uri);
                if ui.button("Upload GLB/GLTF").clicked() && !self.upload_uri.trim().is_empty() {
                    out.commands.push(EditorCommand::UploadModel {
                        uri: self.upload_uri.trim().to_string(),
                    });
                    self.upload_uri.clear();
                }
            });
            if ui.button("Add Sample Model").clicked() {
                out.commands.push(EditorCommand::AddSampleModel);
            }
        });

        if !scene.models().is_empty() {
            self.model_selection(ui, scene, &mut out);
        }
        if scene.selected_model().is_some() {
            self.transform_controls(ui, scene, &mut out);
        }
        self.scene_settings(ui, scene, &mut out);
        self.lighting(ui, scene, &mut out);
        self.motion(ui, status, &mut out);
        out
    }

    fn model_selection(&self, ui: &mut egui::Ui, scene: &SceneState, out: &mut PanelOutput) {
        ui.separator();
        ui.label(egui::RichText::new("Select Model").strong());
        let current = scene.selected_model();
        let selected_text = current
            .map(|model| model.name.clone())
            .unwrap_or_else(|| "-- Select Model --".to_string());
        egui::ComboBox::from_id_salt("model_select")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                if ui.selectable_label(current.is_none(), "-- Select Model --").clicked() {
                    out.commands.push(EditorCommand::Select(None));
                }
                for model in scene.models() {
                    let is_current = current.map(|c| c.id == model.id).unwrap_or(false);
                    let label = format!("{} ({})", model.name, model.id);
                    if ui.selectable_label(is_current, label).clicked() && !is_current {
                        out.commands.push(EditorCommand::Select(Some(model.id.clone())));
                    }
                }
            });
        if current.is_some() && ui.button("Remove Selected").clicked() {
            out.commands.push(EditorCommand::RemoveSelected);
        }
    }

    fn transform_controls(&self, ui: &mut egui::Ui, scene: &SceneState, out: &mut PanelOutput) {
        let Some(model) = scene.selected_model() else {
            return;
        };
        ui.separator();
        ui.label(egui::RichText::new("Transform").strong());

        ui.label("Position");
        for axis in Axis::ALL {
            let mut value = model.position[axis.index()];
            let slider = value_slider(&mut value, POSITION_RANGE).text(axis.label());
            if ui.add(slider).changed() {
                out.commands.push(EditorCommand::SetPosition { axis, value });
            }
        }
        if ui.button("Snap to Ground").clicked() {
            out.commands.push(EditorCommand::SnapToGround);
        }

        ui.label("Rotation (degrees)");
        for axis in Axis::ALL {
            let mut degrees = model.rotation[axis.index()].to_degrees();
            let slider = value_slider(&mut degrees, ROTATION_RANGE_DEG)
                .suffix("°")
                .text(axis.label());
            if ui.add(slider).changed() {
                out.commands.push(EditorCommand::SetRotationDegrees { axis, degrees });
            }
        }

        let mut scale = model.scale;
        let slider = value_slider(&mut scale, SCALE_RANGE).suffix("x").text("Scale");
        if ui.add(slider).changed() {
            out.commands.push(EditorCommand::SetScale(scale));
        }
    }

    fn scene_settings(&self, ui: &mut egui::Ui, scene: &SceneState, out: &mut PanelOutput) {
        let settings = scene.settings();
        ui.separator();
        ui.label(egui::RichText::new("Scene Settings").strong());

        let mut fov = settings.camera_fov;
        if ui
            .add(value_slider(&mut fov, FOV_RANGE).suffix("°").text("Camera FOV"))
            .changed()
        {
            out.commands.push(EditorCommand::SetCameraFov(fov));
        }

        let mut environment = settings.environment;
        egui::ComboBox::from_label("Environment")
            .selected_text(environment.label())
            .show_ui(ui, |ui| {
                for preset in EnvironmentPreset::ALL {
                    ui.selectable_value(&mut environment, preset, preset.label());
                }
            });
        if environment != settings.environment {
            out.commands.push(EditorCommand::SetEnvironment(environment));
        }

        let mut shadows = settings.shadows;
        if ui.checkbox(&mut shadows, "Shadows").changed() {
            out.commands.push(EditorCommand::SetShadows(shadows));
        }
        let mut video = settings.show_video_background;
        if ui.checkbox(&mut video, "Camera Background").changed() {
            out.commands.push(EditorCommand::SetVideoBackground(video));
        }
        let mut bounce = settings.enable_bounce;
        if ui.checkbox(&mut bounce, "Bounce").changed() {
            out.commands.push(EditorCommand::SetBounce(bounce));
        }
        let mut spin = settings.enable_rotation;
        if ui.checkbox(&mut spin, "Spin").changed() {
            out.commands.push(EditorCommand::SetSpin(spin));
        }
    }

    fn lighting(&self, ui: &mut egui::Ui, scene: &SceneState, out: &mut PanelOutput) {
        let settings = scene.settings();
        ui.collapsing("Lighting", |ui| {
            let mut height = settings.light_position[1];
            if ui
                .add(value_slider(&mut height, 0.0..=20.0).text("Light height"))
                .changed()
            {
                out.commands.push(EditorCommand::SetLightHeight(height));
            }
            let mut intensity = settings.light_intensity;
            if ui
                .add(value_slider(&mut intensity, 0.0..=20.0).text("Intensity"))
                .changed()
            {
                out.commands.push(EditorCommand::SetLightIntensity(intensity));
            }
            let mut distance = settings.light_distance;
            if ui
                .add(value_slider(&mut distance, 1.0..=100.0).text("Falloff distance"))
                .changed()
            {
                out.commands.push(EditorCommand::SetLightDistance(distance));
            }
            let mut radius = settings.shadow_radius;
            if ui
                .add(value_slider(&mut radius, 0.0..=100.0).text("Shadow softness"))
                .changed()
            {
                out.commands.push(EditorCommand::SetShadowRadius(radius));
            }
            let mut blur = settings.contact_shadow_blur;
            if ui
                .add(value_slider(&mut blur, 0.0..=100.0).text("Contact blur"))
                .changed()
            {
                out.commands.push(EditorCommand::SetContactShadowBlur(blur));
            }
            let mut opacity = settings.contact_shadow_opacity;
            if ui
                .add(value_slider(&mut opacity, 0.0..=1.0).text("Contact opacity"))
                .changed()
            {
                out.commands.push(EditorCommand::SetContactShadowOpacity(opacity));
            }
        });
    }

    fn motion(&self, ui: &mut egui::Ui, status: &PanelStatus, out: &mut PanelOutput) {
        ui.separator();
        ui.label(egui::RichText::new("Motion Controls").strong());
        let text = match status.permission {
            PermissionState::Granted => "Gyroscope active",
            PermissionState::Requesting => "Waiting for permission...",
            PermissionState::Denied => "Gyroscope off, drag to orbit",
            PermissionState::Unknown | PermissionState::NotRequired => "Drag to orbit",
        };
        ui.label(text);
        if status.can_request_motion && ui.button("Enable motion controls").clicked() {
            out.request_motion_permission = true;
        }
        match status.video {
            VideoStatus::Denied => {
                ui.label("Camera permission required for AR background");
            }
            VideoStatus::Unavailable => {
                ui.label("No camera available");
            }
            VideoStatus::Off | VideoStatus::Live => {}
        }
    }
}

/// Displays a stored value without pulling it into `range`. Only a user edit
/// produces a change, and the editor clamps that.
fn value_slider(value: &mut f32, range: RangeInclusive<f32>) -> egui::Slider<'_> {
    egui::Slider::new(value, range).clamping(egui::SliderClamping::Never)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Model;

    fn run(panel: &mut ControlPanel, scene: &SceneState, status: &PanelStatus) -> PanelOutput {
        let ctx = egui::Context::default();
        let mut out = PanelOutput::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                out = panel.show(ui, scene, status);
            });
        });
        out
    }

    fn status() -> PanelStatus {
        PanelStatus {
            permission: PermissionState::Unknown,
            can_request_motion: true,
            video: VideoStatus::Denied,
            summary: "1 model".to_string(),
        }
    }

    #[test]
    fn idle_frame_emits_nothing() {
        let mut scene = SceneState::new();
        scene.add_model(Model::new("a", "a.glb").with_rotation([0.0, 1.0, 0.0]));
        let mut panel = ControlPanel::new();
        let out = run(&mut panel, &scene, &status());
        assert_eq!(out, PanelOutput::default());
    }

    #[test]
    fn stored_values_outside_slider_ranges_are_not_rewritten() {
        let mut scene = SceneState::new();
        scene.add_model(
            Model::new("a", "a.glb")
                .with_position([7.5, 0.0, -2.0])
                .with_rotation([0.3, 4.0, 0.0])
                .with_scale(9.0),
        );
        scene.set_camera_fov(120.0);
        scene.set_light_intensity(50.0);
        scene.set_contact_shadow_opacity(1.7);
        let mut panel = ControlPanel::new();
        for _ in 0..3 {
            assert_eq!(run(&mut panel, &scene, &status()), PanelOutput::default());
        }
    }

    #[test]
    fn empty_scene_renders() {
        let scene = SceneState::new();
        let mut panel = ControlPanel::default();
        let out = run(&mut panel, &scene, &status());
        assert!(out.commands.is_empty());
        assert!(!out.request_motion_permission);
    }
}
