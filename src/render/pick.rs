//! Pick keys
//!
//! Every pickable element of a frame is tagged with a [`PickKey`]. The
//! renderer reports the key under the pointer back as a [`PickEvent`]; the
//! composer maps it to a model id through its [`PickTable`]. A model keeps the
//! same object index for the whole session and indices are never handed to
//! another model, so a key for a model that is no longer drawn resolves to nothing.

use crate::scene::ModelId;
use std::collections::HashMap;

/// Classification of pickable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PickKind {
    SceneMesh,
    PermissionPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct PickKey {
    pub kind: PickKind,
    pub object_id: u32,
}

impl PickKey {
    pub const PERMISSION_PROMPT: Self = Self {
        kind: PickKind::PermissionPrompt,
        object_id: 0,
    };

    pub fn scene_mesh(object_id: u32) -> Self {
        Self {
            kind: PickKind::SceneMesh,
            object_id,
        }
    }
}

/// Pointer interaction reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickEvent {
    pub key: PickKey,
    pub screen_x: f32,
    pub screen_y: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickTarget {
    Model(ModelId),
    PermissionPrompt,
    Nothing,
}

/// Session-stable object indices plus the set drawn in the current frame.
#[derive(Debug, Clone, Default)]
pub struct PickTable {
    indices: HashMap<ModelId, u32>,
    next_index: u32,
    visible: HashMap<u32, ModelId>,
    prompt_visible: bool,
}

impl PickTable {
    /// Starts a new frame. Indices already issued are kept.
    pub fn clear(&mut self) {
        self.visible.clear();
        self.prompt_visible = false;
    }

    /// Registers a model drawn this frame and returns its key, or `None` once
    /// the index space is exhausted.
    pub fn register(&mut self, id: &ModelId) -> Option<PickKey> {
        let index = match self.indices.get(id) {
            Some(index) => *index,
            None => {
                let Some(next) = self.next_index.checked_add(1) else {
                    log::warn!("pick indices exhausted, {} is not pickable", id);
                    return None;
                };
                let index = self.next_index;
                self.next_index = next;
                self.indices.insert(id.clone(), index);
                index
            }
        };
        self.visible.insert(index, id.clone());
        Some(PickKey::scene_mesh(index))
    }

    pub fn show_prompt(&mut self) -> PickKey {
        self.prompt_visible = true;
        PickKey::PERMISSION_PROMPT
    }

    pub fn resolve(&self, key: PickKey) -> PickTarget {
        match key.kind {
            PickKind::SceneMesh => self
                .visible
                .get(&key.object_id)
                .cloned()
                .map(PickTarget::Model)
                .unwrap_or(PickTarget::Nothing),
            PickKind::PermissionPrompt if self.prompt_visible => PickTarget::PermissionPrompt,
            PickKind::PermissionPrompt => PickTarget::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(table: &mut PickTable, ids: &[&str]) -> Vec<PickKey> {
        table.clear();
        ids.iter()
            .map(|id| table.register(&(*id).into()).unwrap())
            .collect()
    }

    #[test]
    fn table_resolves_registered_models_only() {
        let mut table = PickTable::default();
        let keys = frame(&mut table, &["a", "b"]);
        assert_eq!(table.resolve(keys[0]), PickTarget::Model("a".into()));
        assert_eq!(table.resolve(keys[1]), PickTarget::Model("b".into()));
        assert_eq!(table.resolve(PickKey::scene_mesh(7)), PickTarget::Nothing);
    }

    #[test]
    fn indices_are_stable_across_frames() {
        let mut table = PickTable::default();
        let first = frame(&mut table, &["a", "b"]);
        let second = frame(&mut table, &["b", "a"]);
        assert_eq!(first[0], second[1]);
        assert_eq!(first[1], second[0]);
    }

    #[test]
    fn key_of_removed_middle_model_hits_nothing() {
        let mut table = PickTable::default();
        let keys = frame(&mut table, &["a", "b", "c"]);
        let next = frame(&mut table, &["a", "c"]);
        assert_eq!(table.resolve(keys[1]), PickTarget::Nothing);
        assert_eq!(table.resolve(keys[2]), PickTarget::Model("c".into()));
        assert_eq!(next[1], keys[2]);

        let added = frame(&mut table, &["a", "c", "d"]);
        assert_ne!(added[2], keys[1]);
        assert_eq!(table.resolve(keys[1]), PickTarget::Nothing);
    }

    #[test]
    fn prompt_resolves_only_while_shown() {
        let mut table = PickTable::default();
        assert_eq!(table.resolve(PickKey::PERMISSION_PROMPT), PickTarget::Nothing);
        let key = table.show_prompt();
        assert_eq!(table.resolve(key), PickTarget::PermissionPrompt);
        table.clear();
        assert_eq!(table.resolve(key), PickTarget::Nothing);
    }
}
