//! Subscribe/notify contract for [`SceneState`](super::SceneState) mutations.

use super::{ModelId, SceneState};

/// Which settings field a setter replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Environment,
    Shadows,
    CameraFov,
    VideoBackground,
    Bounce,
    Rotation,
    LightPosition,
    LightIntensity,
    LightDistance,
    ShadowRadius,
    ContactShadowBlur,
    ContactShadowOpacity,
}

impl SettingKey {
    /// True for the fields lighting derivation reads.
    pub fn affects_lighting(self) -> bool {
        matches!(
            self,
            Self::Environment
                | Self::Shadows
                | Self::LightPosition
                | Self::LightIntensity
                | Self::LightDistance
                | Self::ShadowRadius
                | Self::ContactShadowBlur
                | Self::ContactShadowOpacity
        )
    }
}

/// One applied mutation. Removal implies the selection was cleared in the same step.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneChange {
    ModelAdded(ModelId),
    ModelUpdated(ModelId),
    ModelRemoved(ModelId),
    SelectionChanged(Option<ModelId>),
    SettingChanged(SettingKey),
    Replaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) type Listener = Box<dyn FnMut(&SceneChange, &SceneState)>;

#[derive(Default)]
pub(crate) struct Observers {
    next: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl Observers {
    pub(crate) fn insert(&mut self, listener: Listener) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<(ListenerId, Listener)> {
        std::mem::take(&mut self.listeners)
    }

    pub(crate) fn restore(&mut self, listeners: Vec<(ListenerId, Listener)>) {
        self.listeners = listeners;
    }
}
