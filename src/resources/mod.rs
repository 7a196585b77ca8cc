//! Mesh data and render-facing buffers
//!
//! - Mesh: source arrays, bones, per-frame skinning output
//! - MeshCache: validated render buffers handed to the renderer
//! - BoundingBox: axis-aligned bounds

pub mod bounds;
pub mod mesh;
pub mod mesh_cache;

pub use bounds::BoundingBox;
pub use mesh::{Bone, MaterialInfo, Mesh, VertexInfluences, VertexWeight};
pub use mesh_cache::{MeshCache, RenderData, Vertex};
