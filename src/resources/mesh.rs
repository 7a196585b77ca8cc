use glam::{Mat4, Vec2, Vec3, Vec4};
use smallvec::SmallVec;

use crate::assets::MeshDescription;
use crate::errors::{PoseError, Result};
use crate::resources::mesh_cache::{MeshCache, RenderData};

/// One `(vertex, weight)` influence of a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

impl VertexWeight {
    #[must_use]
    pub fn new(vertex: u32, weight: f32) -> Self {
        Self { vertex, weight }
    }
}

/// A bone as stored on a mesh.
///
/// `name` is the name of the node that supplies the bone's current world
/// placement; `offset_matrix` maps mesh space into bone space in the bind
/// pose and never changes after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub offset_matrix: Mat4,
    pub weights: Vec<VertexWeight>,
}

impl Bone {
    #[must_use]
    pub fn new(name: &str, offset_matrix: Mat4, weights: Vec<VertexWeight>) -> Self {
        Self {
            name: name.to_string(),
            offset_matrix,
            weights,
        }
    }
}

/// Material data carried through to the renderer untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialInfo {
    pub name: String,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub ambient: Vec4,
    pub emission: Vec4,
    /// Diffuse texture path as found in the source file, unresolved.
    pub diffuse_texture: Option<String>,
}

impl Default for MaterialInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse: Vec4::ONE,
            specular: Vec4::new(0.0, 0.0, 0.0, 1.0),
            ambient: Vec4::new(0.0, 0.0, 0.0, 1.0),
            emission: Vec4::new(0.0, 0.0, 0.0, 1.0),
            diffuse_texture: None,
        }
    }
}

/// Per-vertex list of `(bone index, weight)` pairs.
pub type VertexInfluences = SmallVec<[(usize, f32); 4]>;

/// A mesh of the model.
///
/// Source arrays are fixed at load. `animated_*` are rewritten by every
/// skinning pass; the [`MeshCache`] holds whatever the renderer may read.
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,

    // === Source data ===
    pub(crate) positions: Vec<Vec3>,
    pub(crate) normals: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    colors: Vec<Vec4>,
    indices: Vec<u32>,
    pub(crate) bones: Vec<Bone>,

    // === Instance settings ===
    pub material: MaterialInfo,
    pub two_sided: bool,
    pub visible: bool,

    // === Per-frame data ===
    pub(crate) animated_positions: Vec<Vec3>,
    pub(crate) animated_normals: Vec<Vec3>,
    pub(crate) cache: MeshCache,
}

impl Mesh {
    /// Validates and converts an imported mesh.
    pub fn from_description(desc: MeshDescription) -> Result<Self> {
        let MeshDescription {
            name,
            positions,
            normals,
            tex_coords,
            colors,
            faces,
            bones,
            material,
            two_sided,
        } = desc;

        let vertex_count = positions.len();
        check_attribute(&name, "normals", vertex_count, normals.len())?;
        check_attribute(&name, "tex_coords", vertex_count, tex_coords.len())?;
        check_attribute(&name, "colors", vertex_count, colors.len())?;

        let mut indices = Vec::with_capacity(faces.len() * 3);
        for (face_index, face) in faces.iter().enumerate() {
            if face.len() != 3 {
                return Err(PoseError::NonTriangularFace {
                    mesh: name,
                    face: face_index,
                    indices: face.len(),
                });
            }
            for &index in face {
                check_vertex(&name, index, vertex_count)?;
                indices.push(index);
            }
        }

        for bone in &bones {
            for w in &bone.weights {
                check_vertex(&name, w.vertex, vertex_count)?;
            }
        }

        Ok(Self {
            cache: MeshCache::new(&positions, &normals),
            animated_positions: positions.clone(),
            animated_normals: normals.clone(),
            name,
            positions,
            normals,
            tex_coords,
            colors,
            indices,
            bones,
            material,
            two_sided,
            visible: true,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Base (un-skinned) positions.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Base normals, empty if the mesh has none.
    #[inline]
    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[inline]
    #[must_use]
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn tex_coords(&self) -> &[Vec2] {
        &self.tex_coords
    }

    #[inline]
    #[must_use]
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }

    /// Regroups the per-bone weight lists by vertex.
    #[must_use]
    pub fn vertex_influences(&self) -> Vec<VertexInfluences> {
        let mut influences = vec![VertexInfluences::new(); self.positions.len()];
        for (bone_index, bone) in self.bones.iter().enumerate() {
            for w in &bone.weights {
                if let Some(slot) = influences.get_mut(w.vertex as usize) {
                    slot.push((bone_index, w.weight));
                }
            }
        }
        influences
    }

    /// Output of the last skinning pass (not necessarily committed to the cache).
    #[inline]
    #[must_use]
    pub fn animated_positions(&self) -> &[Vec3] {
        &self.animated_positions
    }

    #[inline]
    #[must_use]
    pub fn animated_normals(&self) -> &[Vec3] {
        &self.animated_normals
    }

    // ========================================================================
    // Render cache
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn cache(&self) -> &MeshCache {
        &self.cache
    }

    /// Marks the render cache stale. Returns true on a valid → invalid transition.
    pub fn invalidate_cache(&mut self) -> bool {
        self.cache.invalidate()
    }

    /// Commits either the skinned or the base buffers to the render cache.
    ///
    /// Meshes without bones always serve their base data. Returns true if
    /// the cache was rewritten.
    pub fn refresh_cache(&mut self, skinning_enabled: bool) -> bool {
        if skinning_enabled && self.has_bones() {
            self.cache
                .refresh(&self.animated_positions, &self.animated_normals)
        } else {
            self.cache.refresh(&self.positions, &self.normals)
        }
    }

    /// Validated render data, or `None` while the cache is stale.
    #[must_use]
    pub fn render_data(&self) -> Option<RenderData<'_>> {
        if !self.cache.is_valid() {
            return None;
        }
        Some(RenderData {
            positions: self.cache.positions(),
            normals: self.cache.normals(),
            tex_coords: &self.tex_coords,
            colors: &self.colors,
            indices: &self.indices,
            two_sided: self.two_sided,
            visible: self.visible,
        })
    }
}

/// Optional attributes are either absent or one entry per vertex.
fn check_attribute(mesh: &str, attribute: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual == 0 || actual == expected {
        Ok(())
    } else {
        Err(PoseError::AttributeLengthMismatch {
            mesh: mesh.to_string(),
            attribute,
            expected,
            actual,
        })
    }
}

fn check_vertex(mesh: &str, index: u32, count: usize) -> Result<()> {
    if (index as usize) < count {
        Ok(())
    } else {
        Err(PoseError::VertexIndexOutOfBounds {
            mesh: mesh.to_string(),
            index: index as usize,
            count,
        })
    }
}
