use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::animation::AnimationClip;
use crate::resources::{Bone, MaterialInfo};
use crate::scene::LocalPose;

/// A parsed node, as handed over by the importer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDescription {
    pub name: String,
    pub pose: LocalPose,
    /// Indices into [`SceneDescription::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    // === Chained configuration ===

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.pose.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.pose.scale = scale;
        self
    }

    /// Uses the decomposition of a source-file local matrix.
    #[must_use]
    pub fn with_matrix(mut self, matrix: &Mat4) -> Self {
        self.pose = LocalPose::from_matrix(matrix);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh_index: usize) -> Self {
        self.meshes.push(mesh_index);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }
}

/// A parsed mesh, as handed over by the importer.
///
/// `normals`, `tex_coords` and `colors` are either empty or hold one entry per
/// position. Every face must be a triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDescription {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub colors: Vec<Vec4>,
    pub faces: Vec<Vec<u32>>,
    pub bones: Vec<Bone>,
    pub material: MaterialInfo,
    pub two_sided: bool,
}

impl MeshDescription {
    #[must_use]
    pub fn new(name: &str, positions: Vec<Vec3>) -> Self {
        Self {
            name: name.to_string(),
            positions,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    #[must_use]
    pub fn with_triangles(mut self, triangles: &[[u32; 3]]) -> Self {
        self.faces = triangles.iter().map(|t| t.to_vec()).collect();
        self
    }

    #[must_use]
    pub fn with_bone(mut self, bone: Bone) -> Self {
        self.bones.push(bone);
        self
    }
}

/// Everything the importer supplies for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    pub root: NodeDescription,
    pub meshes: Vec<MeshDescription>,
    pub animations: Vec<AnimationClip>,
}

impl SceneDescription {
    #[must_use]
    pub fn new(root: NodeDescription) -> Self {
        Self {
            root,
            meshes: Vec::new(),
            animations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshDescription) -> Self {
        self.meshes.push(mesh);
        self
    }

    #[must_use]
    pub fn with_animation(mut self, clip: AnimationClip) -> Self {
        self.animations.push(clip);
        self
    }
}
