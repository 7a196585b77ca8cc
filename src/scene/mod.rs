//! Scene graph module
//!
//! Manages the node hierarchy of a model and everything driven by it:
//! - Node: hierarchy entry (parent/children, meshes)
//! - Transform: local TRS plus the lazily derived world transform
//! - NodeTree: node arena with name lookup and dirty propagation
//! - TransformSystem: decoupled derived-transform resolution
//! - Skeleton / SkinningEngine: bone matrices and host-side skinning
//! - SceneModel: per-frame orchestration and the render boundary

pub mod model;
pub mod node;
pub mod options;
pub mod skeleton;
pub mod skinning;
pub mod transform;
pub mod transform_system;
pub mod tree;

pub use model::{DrawItem, SceneModel};
pub use node::Node;
pub use options::ModelOptions;
pub use skeleton::Skeleton;
pub use skinning::SkinningEngine;
pub use transform::{DerivedTransform, LocalPose, Transform};
pub use tree::NodeTree;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
