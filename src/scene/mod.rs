pub mod observers;
pub mod serialization;

pub use observers::{ListenerId, SceneChange, SettingKey};

use glam::{Mat4, Quat, Vec3};
use observers::Observers;
use std::collections::HashSet;
use std::fmt;

/// Stable identifier of a placed model. Issued once per session, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A placed 3D asset. Rotation is Euler XYZ in radians, scale is uniform.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    pub source_uri: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl Model {
    pub fn new(id: impl Into<ModelId>, source_uri: impl Into<String>) -> Self {
        let source_uri = source_uri.into();
        Self {
            id: id.into(),
            name: display_name(&source_uri),
            source_uri,
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: 1.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        compose_transform_matrix(self.position, self.rotation, self.scale)
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Fields of a [`Model`] that may be edited after creation. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelPatch {
    pub name: Option<String>,
    pub position: Option<[f32; 3]>,
    pub rotation: Option<[f32; 3]>,
    pub scale: Option<f32>,
}

impl ModelPatch {
    pub fn position(position: [f32; 3]) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: [f32; 3]) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn scale(scale: f32) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.position.is_none()
            && self.rotation.is_none()
            && self.scale.is_none()
    }

    fn apply(self, model: &mut Model) {
        if let Some(name) = self.name {
            model.name = name;
        }
        if let Some(position) = self.position {
            model.position = position;
        }
        if let Some(rotation) = self.rotation {
            model.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            model.scale = scale;
        }
    }
}

/// Named image-based lighting presets understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPreset {
    #[default]
    City,
    Sunset,
    Dawn,
    Night,
    Warehouse,
    Forest,
    Apartment,
    Studio,
    Park,
    Lobby,
}

impl EnvironmentPreset {
    pub const ALL: [EnvironmentPreset; 10] = [
        Self::City,
        Self::Sunset,
        Self::Dawn,
        Self::Night,
        Self::Warehouse,
        Self::Forest,
        Self::Apartment,
        Self::Studio,
        Self::Park,
        Self::Lobby,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Sunset => "sunset",
            Self::Dawn => "dawn",
            Self::Night => "night",
            Self::Warehouse => "warehouse",
            Self::Forest => "forest",
            Self::Apartment => "apartment",
            Self::Studio => "studio",
            Self::Park => "park",
            Self::Lobby => "lobby",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::City => "City",
            Self::Sunset => "Sunset",
            Self::Dawn => "Dawn",
            Self::Night => "Night",
            Self::Warehouse => "Warehouse",
            Self::Forest => "Forest",
            Self::Apartment => "Apartment",
            Self::Studio => "Studio",
            Self::Park => "Park",
            Self::Lobby => "Lobby",
        }
    }
}

/// Global render configuration - matches what can be edited in the control panel
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub environment: EnvironmentPreset,
    pub shadows: bool,
    pub camera_fov: f32,
    pub show_video_background: bool,
    pub enable_bounce: bool,
    pub enable_rotation: bool,
    pub light_position: [f32; 3],
    pub light_intensity: f32,
    pub light_distance: f32,
    pub shadow_radius: f32,
    pub contact_shadow_blur: f32,
    pub contact_shadow_opacity: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            environment: EnvironmentPreset::City,
            shadows: true,
            camera_fov: 60.0,
            show_video_background: false,
            enable_bounce: true,
            enable_rotation: false,
            light_position: [0.0, 8.5, 0.0],
            light_intensity: 5.0,
            light_distance: 25.0,
            shadow_radius: 50.0,
            contact_shadow_blur: 30.0,
            contact_shadow_opacity: 1.0,
        }
    }
}

/// Immutable copy of the store taken once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    pub models: Vec<Model>,
    /// Already resolved: never names a model missing from `models`.
    pub selection: Option<ModelId>,
    pub settings: SceneSettings,
    pub revision: u64,
}

impl SceneSnapshot {
    pub fn is_selected(&self, id: &ModelId) -> bool {
        self.selection.as_ref() == Some(id)
    }
}

/// Single source of truth for placed models, selection and scene settings.
///
/// All mutation goes through the methods below; each one notifies subscribed
/// listeners synchronously, after the new state is fully applied.
#[derive(Default)]
pub struct SceneState {
    models: Vec<Model>,
    selected: Option<ModelId>,
    settings: SceneSettings,
    next_id: u64,
    /// Every id that has been in the scene or handed out this session.
    issued: HashSet<ModelId>,
    revision: u64,
    observers: Observers,
}

impl fmt::Debug for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneState")
            .field("models", &self.models)
            .field("selected", &self.selected)
            .field("settings", &self.settings)
            .field("revision", &self.revision)
            .field("listeners", &self.observers.len())
            .finish()
    }
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SceneSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn model(&self, id: &ModelId) -> Option<&Model> {
        self.models.iter().find(|model| &model.id == id)
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Raw selection as last set; may dangle after [`SceneState::select`] with an unknown id.
    pub fn selection(&self) -> Option<&ModelId> {
        self.selected.as_ref()
    }

    /// Selection that refers to an existing model, `None` otherwise.
    pub fn resolved_selection(&self) -> Option<&ModelId> {
        self.selected_model().map(|model| &model.id)
    }

    pub fn selected_model(&self) -> Option<&Model> {
        self.selected.as_ref().and_then(|id| self.model(id))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            models: self.models.clone(),
            selection: self.resolved_selection().cloned(),
            settings: self.settings.clone(),
            revision: self.revision,
        }
    }

    /// Returns a fresh `model-<n>` id not present in the scene and never handed out before.
    pub fn allocate_id(&mut self) -> ModelId {
        loop {
            self.next_id += 1;
            let candidate = ModelId::new(format!("model-{}", self.next_id));
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SceneChange, &SceneState) + 'static,
    ) -> ListenerId {
        self.observers.insert(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.observers.remove(id)
    }

    /// Appends `model` and selects it. Returns `false` (and changes nothing) when the id exists.
    pub fn add_model(&mut self, model: Model) -> bool {
        if self.model(&model.id).is_some() {
            log::debug!("add_model ignored: {} already present", model.id);
            return false;
        }
        let id = model.id.clone();
        self.issued.insert(id.clone());
        self.models.push(model);
        self.selected = Some(id.clone());
        self.notify(SceneChange::ModelAdded(id));
        true
    }

    pub fn select(&mut self, id: Option<ModelId>) {
        if self.selected == id {
            return;
        }
        self.selected = id.clone();
        self.notify(SceneChange::SelectionChanged(id));
    }

    /// Merges `patch` into the selected model. No-op without a resolvable selection.
    pub fn update_selected(&mut self, patch: ModelPatch) -> bool {
        let Some(selected) = self.selected.clone() else {
            return false;
        };
        let Some(model) = self.models.iter_mut().find(|model| model.id == selected) else {
            return false;
        };
        if patch.is_empty() {
            return false;
        }
        patch.apply(model);
        self.notify(SceneChange::ModelUpdated(selected));
        true
    }

    /// Removes the selected model and clears the selection in one step.
    pub fn remove_selected(&mut self) -> Option<Model> {
        let selected = self.selected.take()?;
        let index = self.models.iter().position(|model| model.id == selected);
        let removed = index.map(|index| self.models.remove(index));
        match &removed {
            Some(model) => self.notify(SceneChange::ModelRemoved(model.id.clone())),
            None => self.notify(SceneChange::SelectionChanged(None)),
        }
        removed
    }

    pub fn set_environment(&mut self, environment: EnvironmentPreset) {
        if self.settings.environment != environment {
            self.settings.environment = environment;
            self.notify(SceneChange::SettingChanged(SettingKey::Environment));
        }
    }

    pub fn set_shadows(&mut self, shadows: bool) {
        if self.settings.shadows != shadows {
            self.settings.shadows = shadows;
            self.notify(SceneChange::SettingChanged(SettingKey::Shadows));
        }
    }

    pub fn set_camera_fov(&mut self, fov: f32) {
        if self.settings.camera_fov != fov {
            self.settings.camera_fov = fov;
            self.notify(SceneChange::SettingChanged(SettingKey::CameraFov));
        }
    }

    pub fn set_show_video_background(&mut self, show: bool) {
        if self.settings.show_video_background != show {
            self.settings.show_video_background = show;
            self.notify(SceneChange::SettingChanged(SettingKey::VideoBackground));
        }
    }

    pub fn set_enable_bounce(&mut self, enable: bool) {
        if self.settings.enable_bounce != enable {
            self.settings.enable_bounce = enable;
            self.notify(SceneChange::SettingChanged(SettingKey::Bounce));
        }
    }

    pub fn set_enable_rotation(&mut self, enable: bool) {
        if self.settings.enable_rotation != enable {
            self.settings.enable_rotation = enable;
            self.notify(SceneChange::SettingChanged(SettingKey::Rotation));
        }
    }

    pub fn set_light_position(&mut self, position: [f32; 3]) {
        if self.settings.light_position != position {
            self.settings.light_position = position;
            self.notify(SceneChange::SettingChanged(SettingKey::LightPosition));
        }
    }

    pub fn set_light_intensity(&mut self, intensity: f32) {
        if self.settings.light_intensity != intensity {
            self.settings.light_intensity = intensity;
            self.notify(SceneChange::SettingChanged(SettingKey::LightIntensity));
        }
    }

    pub fn set_light_distance(&mut self, distance: f32) {
        if self.settings.light_distance != distance {
            self.settings.light_distance = distance;
            self.notify(SceneChange::SettingChanged(SettingKey::LightDistance));
        }
    }

    pub fn set_shadow_radius(&mut self, radius: f32) {
        if self.settings.shadow_radius != radius {
            self.settings.shadow_radius = radius;
            self.notify(SceneChange::SettingChanged(SettingKey::ShadowRadius));
        }
    }

    pub fn set_contact_shadow_blur(&mut self, blur: f32) {
        if self.settings.contact_shadow_blur != blur {
            self.settings.contact_shadow_blur = blur;
            self.notify(SceneChange::SettingChanged(SettingKey::ContactShadowBlur));
        }
    }

    pub fn set_contact_shadow_opacity(&mut self, opacity: f32) {
        if self.settings.contact_shadow_opacity != opacity {
            self.settings.contact_shadow_opacity = opacity;
            self.notify(SceneChange::SettingChanged(SettingKey::ContactShadowOpacity));
        }
    }

    /// Replaces models and settings wholesale, e.g. after loading a scene document.
    /// Selection is cleared and the id allocator keeps counting from where it was.
    pub fn replace_contents(&mut self, models: Vec<Model>, settings: SceneSettings) {
        let mut unique: Vec<Model> = Vec::with_capacity(models.len());
        for model in models {
            if unique.iter().any(|existing| existing.id == model.id) {
                log::warn!("dropping duplicate model id {} from loaded scene", model.id);
                continue;
            }
            self.issued.insert(model.id.clone());
            unique.push(model);
        }
        self.models = unique;
        self.settings = settings;
        self.selected = None;
        self.notify(SceneChange::Replaced);
    }

    fn notify(&mut self, change: SceneChange) {
        self.revision = self.revision.wrapping_add(1);
        if self.observers.is_empty() {
            return;
        }
        // Listeners only see `&SceneState`, so none can register or mutate mid-dispatch.
        let mut listeners = self.observers.take();
        for (_, listener) in listeners.iter_mut() {
            listener(&change, self);
        }
        self.observers.restore(listeners);
    }
}

/// Euler XYZ (radians) + uniform scale + translation, column-major.
pub fn compose_transform_matrix(position: [f32; 3], rotation: [f32; 3], scale: f32) -> Mat4 {
    let rotation = Quat::from_rotation_x(rotation[0])
        * Quat::from_rotation_y(rotation[1])
        * Quat::from_rotation_z(rotation[2]);
    Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, Vec3::from(position))
}

fn display_name(source_uri: &str) -> String {
    source_uri
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("model")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn model(id: &str) -> Model {
        Model::new(id, "x")
            .with_position([0.0, -0.5, -1.5])
            .with_scale(0.8)
    }

    #[test]
    fn add_model_twice_is_idempotent() {
        let mut scene = SceneState::new();
        assert!(scene.add_model(model("a")));
        let after_first = scene.models().to_vec();
        assert!(!scene.add_model(model("a")));
        assert_eq!(scene.models(), after_first.as_slice());
    }

    #[test]
    fn duplicate_add_keeps_the_original_model() {
        let mut scene = SceneState::new();
        scene.add_model(model("a"));
        scene.add_model(model("b"));
        scene.add_model(model("a").with_scale(3.0));
        assert_eq!(scene.models().len(), 2);
        assert_eq!(scene.model(&"a".into()).map(|m| m.scale), Some(0.8));
        assert_eq!(scene.selection(), Some(&ModelId::from("b")));
    }

    #[test]
    fn scenario_add_update_remove() {
        let mut scene = SceneState::new();
        assert_eq!(scene.settings().camera_fov, 60.0);

        scene.add_model(model("a"));
        assert_eq!(scene.selection(), Some(&ModelId::from("a")));
        assert_eq!(scene.models().len(), 1);

        scene.update_selected(ModelPatch::scale(1.2));
        let a = scene.model(&"a".into()).unwrap();
        assert_eq!(a.scale, 1.2);
        assert_eq!(a.position, [0.0, -0.5, -1.5]);
        assert_eq!(a.rotation, [0.0, 0.0, 0.0]);

        let removed = scene.remove_selected();
        assert_eq!(removed.map(|m| m.id), Some(ModelId::from("a")));
        assert!(scene.models().is_empty());
        assert_eq!(scene.selection(), None);
    }

    #[test]
    fn partial_update_touches_only_the_selected_field() {
        let mut scene = SceneState::new();
        scene.add_model(model("a").with_rotation([0.1, 0.2, 0.3]));
        scene.add_model(model("b"));
        scene.select(Some("a".into()));
        let before = scene.models().to_vec();

        scene.update_selected(ModelPatch::scale(2.5));

        let mut expected = before.clone();
        expected[0].scale = 2.5;
        assert_eq!(scene.models(), expected.as_slice());
        assert_eq!(scene.models()[1], before[1]);
    }

    #[test]
    fn update_without_selection_is_noop() {
        let mut scene = SceneState::new();
        scene.add_model(model("a"));
        scene.select(None);
        assert!(!scene.update_selected(ModelPatch::scale(9.0)));
        scene.select(Some("ghost".into()));
        assert!(!scene.update_selected(ModelPatch::scale(9.0)));
        assert_eq!(scene.models()[0].scale, 0.8);
    }

    #[test]
    fn remove_selected_clears_selection_for_any_list() {
        for selected in ["a", "b", "c"] {
            let mut scene = SceneState::new();
            for id in ["a", "b", "c"] {
                scene.add_model(model(id));
            }
            scene.select(Some(selected.into()));
            scene.remove_selected();
            assert_eq!(scene.selection(), None);
            assert!(scene.model(&selected.into()).is_none());
            assert_eq!(scene.models().len(), 2);
        }
    }

    #[test]
    fn dangling_selection_reads_as_empty() {
        let mut scene = SceneState::new();
        scene.add_model(model("a"));
        scene.select(Some("gone".into()));
        assert_eq!(scene.selection(), Some(&ModelId::from("gone")));
        assert!(scene.selected_model().is_none());
        assert!(scene.resolved_selection().is_none());
        assert!(scene.snapshot().selection.is_none());

        assert!(scene.remove_selected().is_none());
        assert_eq!(scene.models().len(), 1);
        assert_eq!(scene.selection(), None);
    }

    #[test]
    fn listeners_observe_state_after_mutation() {
        let mut scene = SceneState::new();
        let seen: Rc<RefCell<Vec<(SceneChange, usize, Option<ModelId>)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let id = scene.subscribe(move |change, state| {
            sink.borrow_mut().push((
                change.clone(),
                state.models().len(),
                state.selection().cloned(),
            ));
        });

        scene.add_model(model("a"));
        scene.remove_selected();
        scene.set_camera_fov(70.0);

        let seen_now = seen.borrow().clone();
        assert_eq!(
            seen_now,
            vec![
                (SceneChange::ModelAdded("a".into()), 1, Some("a".into())),
                (SceneChange::ModelRemoved("a".into()), 0, None),
                (SceneChange::SettingChanged(SettingKey::CameraFov), 0, None),
            ]
        );

        assert!(scene.unsubscribe(id));
        scene.set_camera_fov(50.0);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn setters_replace_single_fields() {
        let mut scene = SceneState::new();
        let defaults = scene.settings().clone();
        scene.set_light_position([1.0, 4.0, 0.0]);
        scene.set_environment(EnvironmentPreset::Studio);
        scene.set_camera_fov(120.0);

        let mut expected = defaults;
        expected.light_position = [1.0, 4.0, 0.0];
        expected.environment = EnvironmentPreset::Studio;
        expected.camera_fov = 120.0;
        assert_eq!(scene.settings(), &expected);
    }

    #[test]
    fn unchanged_setter_does_not_bump_revision() {
        let mut scene = SceneState::new();
        let revision = scene.revision();
        scene.set_shadows(true);
        assert_eq!(scene.revision(), revision);
        scene.set_shadows(false);
        assert_eq!(scene.revision(), revision + 1);
    }

    #[test]
    fn allocated_ids_are_never_reused() {
        let mut scene = SceneState::new();
        scene.add_model(model("model-2"));
        let first = scene.allocate_id();
        let second = scene.allocate_id();
        assert_eq!(first.as_str(), "model-1");
        assert_eq!(second.as_str(), "model-3");

        scene.add_model(Model::new(first.clone(), "x"));
        scene.remove_selected();
        assert_ne!(scene.allocate_id(), first);
    }

    #[test]
    fn ids_from_loaded_and_removed_models_stay_retired() {
        let mut scene = SceneState::new();
        scene.replace_contents(
            vec![model("model-1"), model("model-2")],
            SceneSettings::default(),
        );
        scene.select(Some("model-2".into()));
        let removed = scene.remove_selected().map(|m| m.id);
        assert_eq!(removed, Some("model-2".into()));

        let fresh = scene.allocate_id();
        assert_eq!(fresh.as_str(), "model-3");
        assert_ne!(scene.allocate_id(), "model-2".into());
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(Model::new("a", "assets/models/Helmet.glb").name, "Helmet.glb");
        assert_eq!(Model::new("a", "C:\\models\\duck.gltf").name, "duck.gltf");
        assert_eq!(Model::new("a", "").name, "model");
    }

    #[test]
    fn transform_matrix_applies_scale_then_translation() {
        let matrix = compose_transform_matrix([1.0, 2.0, 3.0], [0.0, 0.0, 0.0], 2.0);
        let point = matrix.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((point - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-6);
    }
}
