use serde::{Deserialize, Serialize};

use crate::animation::LoopMode;

/// Feature switches of a [`SceneModel`](crate::scene::SceneModel).
///
/// `skinning` and `animation` drive [`update`](crate::scene::SceneModel::update);
/// the other flags are only reported to the renderer through
/// [`DrawItem`](crate::scene::DrawItem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    pub materials: bool,
    pub textures: bool,
    pub skinning: bool,
    pub animation: bool,
    pub custom_shader: bool,
    pub loop_mode: LoopMode,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            materials: true,
            textures: true,
            skinning: true,
            animation: false,
            custom_shader: false,
            loop_mode: LoopMode::Loop,
        }
    }
}
