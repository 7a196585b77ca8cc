//! Host-side skinning
//!
//! Blends every vertex of a mesh by the bones that influence it:
//!
//! ```text
//! animated_position[v] = Σ weight * (bone_matrix * base_position[v])
//! animated_normal[v]   = Σ weight * (upper3x3(bone_matrix) * base_normal[v])
//! ```
//!
//! Weights are used as given. Nothing is renormalized, so weights that do not
//! sum to one scale the result proportionally.

use glam::{Mat3, Mat4, Vec3};

use crate::errors::Result;
use crate::resources::Mesh;
use crate::scene::NodeTree;
use crate::scene::skeleton::Skeleton;

pub struct SkinningEngine;

impl SkinningEngine {
    /// Recomputes the bone matrices of `skeleton` from the current pose and
    /// deforms `mesh` with them.
    ///
    /// All bone matrices are resolved before the animated buffers are touched;
    /// on error the mesh (and its render cache) is left as it was.
    pub fn skin_mesh(mesh: &mut Mesh, skeleton: &mut Skeleton, tree: &NodeTree) -> Result<()> {
        if !mesh.has_bones() {
            return Ok(());
        }

        skeleton.compute_bone_matrices(tree)?;
        Self::deform(mesh, skeleton.bone_matrices());
        Ok(())
    }

    /// Rewrites the animated buffers of `mesh` from its base arrays and
    /// invalidates the render cache.
    ///
    /// `bone_matrices[i]` belongs to `mesh.bones()[i]`.
    pub fn deform(mesh: &mut Mesh, bone_matrices: &[Mat4]) {
        let Mesh {
            positions,
            normals,
            bones,
            animated_positions,
            animated_normals,
            ..
        } = mesh;

        // Whole-buffer reset; nothing from the previous pass survives
        animated_positions.clear();
        animated_positions.resize(positions.len(), Vec3::ZERO);
        animated_normals.clear();
        animated_normals.resize(normals.len(), Vec3::ZERO);

        for (bone, bone_matrix) in bones.iter().zip(bone_matrices) {
            for w in &bone.weights {
                let v = w.vertex as usize;
                if let (Some(out), Some(src)) = (animated_positions.get_mut(v), positions.get(v)) {
                    *out += w.weight * bone_matrix.transform_point3(*src);
                }
            }

            if !normals.is_empty() {
                // Rotation and scale only, translation stripped
                let normal_matrix = Mat3::from_mat4(*bone_matrix);
                for w in &bone.weights {
                    let v = w.vertex as usize;
                    if let (Some(out), Some(src)) = (animated_normals.get_mut(v), normals.get(v)) {
                        *out += w.weight * (normal_matrix * *src);
                    }
                }
            }
        }

        mesh.invalidate_cache();
    }
}
