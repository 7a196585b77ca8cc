use glam::Mat4;

use crate::errors::{PoseError, Result};
use crate::resources::Mesh;
use crate::scene::{NodeHandle, NodeTree};

/// The bones of one mesh, resolved to the nodes that place them.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,

    // === Core Data ===
    // bones[i] corresponds to mesh.bones()[i]
    pub(crate) bones: Vec<NodeHandle>,

    // Offset (inverse bind) matrices, copied from the mesh at bind time.
    // Transforms vertices from mesh space to bone local space.
    pub(crate) offset_matrices: Vec<Mat4>,

    // === Runtime Data ===
    // Final bone matrices, rewritten every skinning pass
    pub(crate) bone_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Resolves every bone of `mesh` by node name.
    ///
    /// Bone bindings are part of the imported topology, so an unknown name is
    /// reported instead of skipped.
    pub fn bind(mesh: &Mesh, tree: &NodeTree) -> Result<Self> {
        let mut bones = Vec::with_capacity(mesh.bones().len());
        let mut offset_matrices = Vec::with_capacity(mesh.bones().len());

        for bone in mesh.bones() {
            let node = tree.find(&bone.name).ok_or_else(|| PoseError::BoneNodeNotFound {
                mesh: mesh.name().to_string(),
                bone: bone.name.clone(),
            })?;
            bones.push(node);
            offset_matrices.push(bone.offset_matrix);
        }

        let count = bones.len();
        Ok(Self {
            name: mesh.name().to_string(),
            bones,
            offset_matrices,
            bone_matrices: vec![Mat4::IDENTITY; count],
        })
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Node handles of the bones, in `mesh.bones()` order.
    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[NodeHandle] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn offset_matrices(&self) -> &[Mat4] {
        &self.offset_matrices
    }

    /// Matrices computed by the last [`compute_bone_matrices`](Self::compute_bone_matrices).
    #[inline]
    #[must_use]
    pub fn bone_matrices(&self) -> &[Mat4] {
        &self.bone_matrices
    }

    /// Updates bone matrices
    ///
    /// `bone_matrix = node.derived_transform * offset`: the offset takes a
    /// vertex into bone space, the node's world placement takes it back out
    /// in the current pose.
    pub fn compute_bone_matrices(&mut self, tree: &NodeTree) -> Result<()> {
        for ((&bone_handle, offset), matrix) in self
            .bones
            .iter()
            .zip(&self.offset_matrices)
            .zip(&mut self.bone_matrices)
        {
            let world = tree
                .derived_transform(bone_handle)
                .ok_or_else(|| PoseError::NodeNotFound(format!("{bone_handle:?}")))?;
            *matrix = world * *offset;
        }
        Ok(())
    }
}
