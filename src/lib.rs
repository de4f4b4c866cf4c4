//! Scene-state synchronization and camera fusion for AR mockups.
//!
//! A [`scene::SceneState`] store holds placed models and scene settings.
//! Control widgets edit it through [`ui::TransformEditor`], and each frame the
//! [`render::SceneComposer`] turns one snapshot of it into a
//! [`render::FrameDescription`] for an external renderer. The camera pose is
//! fused from the device gyroscope and a manual orbit by
//! [`render::CameraFusionController`].

pub mod app;
pub mod content;
pub mod media;
pub mod render;
pub mod scene;
pub mod ui;
