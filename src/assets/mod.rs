pub mod description;
pub mod loader;

pub use description::{MeshDescription, NodeDescription, SceneDescription};
pub use loader::ModelLoader;
