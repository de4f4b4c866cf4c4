//! Lighting description derived from [`SceneSettings`]. Holds no state of its own.

use crate::scene::{EnvironmentPreset, SceneSettings};

pub const AMBIENT_INTENSITY: f32 = 0.3;
pub const SHADOW_MAP_SIZE: u32 = 4096;
pub const SHADOW_NEAR: f32 = 0.1;
pub const SHADOW_BIAS: f32 = -0.0001;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PointLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
    pub shadow_near: f32,
    pub shadow_far: f32,
    pub shadow_radius: f32,
    pub shadow_bias: f32,
}

/// Flat ground plane that only receives shadows.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ShadowCatcher {
    pub height: f32,
    pub size: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ContactShadows {
    pub height: f32,
    pub opacity: f32,
    pub scale: f32,
    pub blur: f32,
    pub far: f32,
    pub resolution: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LightingDescription {
    pub environment: EnvironmentPreset,
    /// Environment lights the scene but is never drawn as a background.
    pub environment_background: bool,
    pub ambient_intensity: f32,
    pub key_light: PointLight,
    pub shadow_catcher: Option<ShadowCatcher>,
    pub contact_shadows: Option<ContactShadows>,
}

pub fn derive_lighting(settings: &SceneSettings) -> LightingDescription {
    let key_light = PointLight {
        position: settings.light_position,
        color: [1.0, 1.0, 1.0],
        intensity: settings.light_intensity,
        distance: settings.light_distance,
        decay: 1.0,
        cast_shadow: settings.shadows,
        shadow_map_size: SHADOW_MAP_SIZE,
        shadow_near: SHADOW_NEAR,
        shadow_far: settings.light_distance,
        shadow_radius: settings.shadow_radius,
        shadow_bias: SHADOW_BIAS,
    };
    let (shadow_catcher, contact_shadows) = if settings.shadows {
        (
            Some(ShadowCatcher {
                height: -0.9,
                size: 10.0,
                opacity: 0.2,
            }),
            Some(ContactShadows {
                height: -0.85,
                opacity: settings.contact_shadow_opacity,
                scale: 4.0,
                blur: settings.contact_shadow_blur,
                far: 6.0,
                resolution: 2048,
            }),
        )
    } else {
        (None, None)
    };
    LightingDescription {
        environment: settings.environment,
        environment_background: false,
        ambient_intensity: AMBIENT_INTENSITY,
        key_light,
        shadow_catcher,
        contact_shadows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_shadowed_point_light() {
        let lighting = derive_lighting(&SceneSettings::default());
        assert_eq!(lighting.environment, EnvironmentPreset::City);
        assert_eq!(lighting.key_light.position, [0.0, 8.5, 0.0]);
        assert_eq!(lighting.key_light.intensity, 5.0);
        assert_eq!(lighting.key_light.shadow_far, 25.0);
        assert!(lighting.key_light.cast_shadow);
        let contact = lighting.contact_shadows.unwrap();
        assert_eq!(contact.blur, 30.0);
        assert_eq!(contact.opacity, 1.0);
        assert!(lighting.shadow_catcher.is_some());
    }

    #[test]
    fn disabling_shadows_drops_ground_effects() {
        let settings = SceneSettings {
            shadows: false,
            ..SceneSettings::default()
        };
        let lighting = derive_lighting(&settings);
        assert!(!lighting.key_light.cast_shadow);
        assert!(lighting.shadow_catcher.is_none());
        assert!(lighting.contact_shadows.is_none());
    }

    #[test]
    fn light_distance_bounds_shadow_camera() {
        let settings = SceneSettings {
            light_distance: 12.0,
            shadow_radius: 8.0,
            ..SceneSettings::default()
        };
        let light = derive_lighting(&settings).key_light;
        assert_eq!(light.distance, 12.0);
        assert_eq!(light.shadow_far, 12.0);
        assert_eq!(light.shadow_radius, 8.0);
    }
}
