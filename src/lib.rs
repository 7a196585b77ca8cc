#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod errors;
pub mod resources;
pub mod scene;

pub use animation::{AnimationAction, AnimationClip, Binder, KeyframeTrack, LoopMode, NodeChannel};
pub use assets::{MeshDescription, ModelLoader, NodeDescription, SceneDescription};
pub use errors::{PoseError, Result};
pub use resources::{Bone, BoundingBox, MaterialInfo, Mesh, MeshCache, RenderData, Vertex, VertexWeight};
pub use scene::{
    DerivedTransform, DrawItem, LocalPose, ModelOptions, Node, NodeHandle, NodeTree, SceneModel, Skeleton,
    SkinningEngine, Transform,
};
