use crate::scene::{Model, SceneSettings, SceneState};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Persisted part of a scene. Selection, listeners and id counters are session-only.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(default)]
    pub settings: SceneSettings,
}

impl SceneDocument {
    pub fn capture(scene: &SceneState) -> Self {
        Self {
            models: scene.models().to_vec(),
            settings: scene.settings().clone(),
        }
    }

    pub fn apply_to(self, scene: &mut SceneState) {
        scene.replace_contents(self.models, self.settings);
    }
}

pub fn save_scene_to_file(scene: &SceneState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&SceneDocument::capture(scene))?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_scene_from_file(path: &Path) -> Result<SceneDocument> {
    let json = std::fs::read_to_string(path)?;
    let document: SceneDocument = serde_json::from_str(&json)?;
    log::info!(
        "Loaded scene {} ({} models)",
        path.display(),
        document.models.len()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::SceneDocument;
    use crate::scene::{EnvironmentPreset, Model, SceneState};

    #[test]
    fn test_empty_scene_serialization() {
        let scene = SceneState::new();
        let json = serde_json::to_string_pretty(&SceneDocument::capture(&scene)).unwrap();
        let loaded: SceneDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.models.len(), 0);
        assert_eq!(loaded.settings.camera_fov, 60.0);
    }

    #[test]
    fn test_session_fields_are_not_serialized() {
        let mut scene = SceneState::new();
        scene.add_model(Model::new("a", "assets/models/DamagedHelmet.glb"));
        scene.subscribe(|_, _| {});

        let json = serde_json::to_string_pretty(&SceneDocument::capture(&scene)).unwrap();
        assert!(!json.contains("selected"));
        assert!(!json.contains("revision"));
        assert!(!json.contains("next_id"));
        assert!(json.contains("\"environment\": \"city\""));
    }

    #[test]
    fn test_missing_settings_fall_back_to_defaults() {
        let json = r#"{
            "models": [{
                "id": "model-7",
                "name": "duck.glb",
                "source_uri": "duck.glb",
                "position": [0.0, 0.5, -2.0],
                "rotation": [0.0, 0.0, 0.0],
                "scale": 1.0
            }],
            "settings": { "environment": "night", "shadows": false }
        }"#;
        let loaded: SceneDocument = serde_json::from_str(json).unwrap();
        assert_eq!(loaded.models[0].id.as_str(), "model-7");
        assert_eq!(loaded.settings.environment, EnvironmentPreset::Night);
        assert!(!loaded.settings.shadows);
        assert_eq!(loaded.settings.light_position, [0.0, 8.5, 0.0]);
    }

    #[test]
    fn test_apply_clears_selection_and_drops_duplicates() {
        let mut scene = SceneState::new();
        scene.add_model(Model::new("old", "old.glb"));
        let document = SceneDocument {
            models: vec![
                Model::new("a", "a.glb"),
                Model::new("a", "other.glb"),
                Model::new("b", "b.glb"),
            ],
            settings: Default::default(),
        };
        document.apply_to(&mut scene);
        assert_eq!(scene.models().len(), 2);
        assert_eq!(scene.models()[0].source_uri, "a.glb");
        assert_eq!(scene.selection(), None);
    }

    #[test]
    fn test_save_load_stress_loop_via_file() {
        let mut scene = SceneState::new();
        scene.add_model(
            Model::new("model-1", "assets/models/DamagedHelmet.glb").with_position([1.0, 2.0, 3.0]),
        );
        scene.add_model(Model::new("model-2", "assets/models/heart-red.glb").with_scale(0.5));
        scene.set_environment(EnvironmentPreset::Warehouse);

        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "previz_ar_scene_stress_{}_{}.json",
            std::process::id(),
            nonce
        ));

        for _ in 0..20 {
            super::save_scene_to_file(&scene, &path).unwrap();
            let loaded = super::load_scene_from_file(&path).unwrap();
            loaded.apply_to(&mut scene);
            assert_eq!(scene.models().len(), 2);
            assert_eq!(scene.models()[0].source_uri, "assets/models/DamagedHelmet.glb");
            assert_eq!(scene.models()[1].scale, 0.5);
            assert_eq!(scene.settings().environment, EnvironmentPreset::Warehouse);
        }

        let _ = std::fs::remove_file(path);
    }
}
