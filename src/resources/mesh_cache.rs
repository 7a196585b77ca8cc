use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

/// Render-ready vertex/normal buffers with an explicit validity flag.
///
/// Buffers are always replaced as a whole: a reader either sees the previous
/// epoch's data or the new one, never a mix.
#[derive(Debug, Clone, Default)]
pub struct MeshCache {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    valid: bool,
}

impl MeshCache {
    /// A valid cache holding the given data.
    #[must_use]
    pub fn new(positions: &[Vec3], normals: &[Vec3]) -> Self {
        Self {
            positions: positions.to_vec(),
            normals: normals.to_vec(),
            valid: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Marks the cache stale. Returns true if it was valid before the call.
    pub fn invalidate(&mut self) -> bool {
        std::mem::replace(&mut self.valid, false)
    }

    /// Copies `positions`/`normals` into the cache unless it is already valid.
    ///
    /// Returns true if the buffers were rewritten.
    pub fn refresh(&mut self, positions: &[Vec3], normals: &[Vec3]) -> bool {
        if self.valid {
            return false;
        }

        self.positions.clear();
        self.positions.extend_from_slice(positions);
        self.normals.clear();
        self.normals.extend_from_slice(normals);

        self.valid = true;
        true
    }

    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }
}

/// Interleaved vertex layout for upload by a renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    pub color: [f32; 4],
}

/// Borrowed view of a mesh's validated render data.
#[derive(Debug, Clone, Copy)]
pub struct RenderData<'a> {
    pub positions: &'a [Vec3],
    /// Empty when the mesh has no normals.
    pub normals: &'a [Vec3],
    /// Empty when the mesh has no texture coordinates.
    pub tex_coords: &'a [Vec2],
    /// Empty when the mesh has no vertex colors.
    pub colors: &'a [Vec4],
    pub indices: &'a [u32],
    pub two_sided: bool,
    pub visible: bool,
}

impl RenderData<'_> {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Builds an interleaved vertex buffer. Missing attributes are zero,
    /// except color which defaults to opaque white.
    #[must_use]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                position: p.to_array(),
                normal: self.normals.get(i).copied().unwrap_or(Vec3::ZERO).to_array(),
                tex_coord: self.tex_coords.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
                color: self.colors.get(i).copied().unwrap_or(Vec4::ONE).to_array(),
            })
            .collect()
    }
}
