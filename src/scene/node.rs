use smallvec::SmallVec;

use crate::scene::NodeHandle;
use crate::scene::transform::{LocalPose, Transform};

/// A node of the model hierarchy.
///
/// # Hierarchy
///
/// Nodes form a tree stored in the [`NodeTree`](crate::scene::NodeTree) arena:
/// - `children`: handles of the nodes this node owns
/// - `parent`: non-owning handle back to the owner, used only for upward
///   derived-transform queries (None for the root)
///
/// # Meshes
///
/// `meshes` indexes into the model's flat mesh list. A mesh may be referenced
/// by several nodes.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Core Spatial Data ===
    pub(crate) transform: Transform,

    // === Components ===
    pub(crate) meshes: SmallVec<[usize; 2]>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_pose(name, LocalPose::IDENTITY)
    }

    #[must_use]
    pub fn with_pose(name: &str, pose: LocalPose) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::from_pose(pose),
            meshes: SmallVec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Local transform and derived cache. Mutation goes through the tree.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Indices of the meshes drawn at this node.
    #[inline]
    #[must_use]
    pub fn meshes(&self) -> &[usize] {
        &self.meshes
    }

    pub fn push_mesh(&mut self, mesh_index: usize) {
        self.meshes.push(mesh_index);
    }
}
