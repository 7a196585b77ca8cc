//! Scene Model
//!
//! Owns everything loaded for one model and drives the per-frame update:
//!
//! 1. **Animation**: sample the selected clip and write local poses
//! 2. **Skinning**: deform every reachable boned mesh from the new pose
//! 3. **Cache**: commit the deformed (or base) buffers to each mesh's render cache
//!
//! Derived transforms are never pushed during the update; the skinning pass
//! pulls them through [`NodeTree`] and only stale chains are recomputed.

use glam::{Quat, Vec3};

use crate::animation::{AnimationAction, AnimationClip, LoopMode};
use crate::assets::{ModelLoader, SceneDescription};
use crate::errors::{PoseError, Result};
use crate::resources::{BoundingBox, Mesh, RenderData};
use crate::scene::options::ModelOptions;
use crate::scene::skeleton::Skeleton;
use crate::scene::skinning::SkinningEngine;
use crate::scene::transform_system;
use crate::scene::{NodeHandle, NodeTree};

/// One mesh occurrence handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    /// Node the mesh hangs from
    pub node: NodeHandle,
    pub mesh_index: usize,
    pub mesh: &'a Mesh,
    /// Validated cache contents of `mesh`
    pub render: RenderData<'a>,

    // === Render switches ===
    pub materials: bool,
    pub textures: bool,
    pub custom_shader: bool,
}

/// A loaded model: node hierarchy, meshes, skeletons and animation clips.
#[derive(Debug, Clone)]
pub struct SceneModel {
    tree: NodeTree,
    meshes: Vec<Mesh>,
    // skeletons[i] belongs to meshes[i]
    skeletons: Vec<Skeleton>,

    // Mesh-bearing nodes in depth-first preorder
    mesh_nodes: Vec<NodeHandle>,
    // Every mesh index reachable from `mesh_nodes`, each listed once
    reachable_meshes: Vec<usize>,

    clips: Vec<AnimationClip>,
    action: Option<AnimationAction>,
    time: f64,

    options: ModelOptions,
    bounding_box: Option<BoundingBox>,
}

impl SceneModel {
    /// Builds a model from an imported description.
    pub fn from_description(desc: SceneDescription) -> Result<Self> {
        ModelLoader::load(desc)
    }

    pub(crate) fn from_parts(
        tree: NodeTree,
        meshes: Vec<Mesh>,
        skeletons: Vec<Skeleton>,
        clips: Vec<AnimationClip>,
    ) -> Self {
        let mesh_nodes = tree.mesh_nodes();

        let mut seen = vec![false; meshes.len()];
        let mut reachable_meshes = Vec::with_capacity(meshes.len());
        for &handle in &mesh_nodes {
            let Some(node) = tree.get(handle) else {
                continue;
            };
            for &index in node.meshes() {
                if let Some(flag) = seen.get_mut(index)
                    && !*flag
                {
                    *flag = true;
                    reachable_meshes.push(index);
                }
            }
        }

        let action = clips
            .first()
            .map(|clip| AnimationAction::new(0, clip, &tree));

        let mut model = Self {
            tree,
            meshes,
            skeletons,
            mesh_nodes,
            reachable_meshes,
            clips,
            action,
            time: 0.0,
            options: ModelOptions::default(),
            bounding_box: None,
        };
        model.bounding_box = model.compute_bounding_box();
        model
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Advances the model to `time_seconds` (absolute clip time).
    ///
    /// A skinning failure on one mesh does not stop the others; the failing
    /// mesh keeps its previous cache contents and the first error is returned
    /// after every cache has been refreshed.
    pub fn update(&mut self, time_seconds: f64) -> Result<()> {
        self.time = time_seconds;

        if self.options.animation {
            self.update_animation();
        }

        let result = if self.options.skinning {
            self.update_skinning()
        } else {
            Ok(())
        };

        self.refresh_meshes();
        result
    }

    fn update_animation(&mut self) {
        let Some(action) = self.action.as_mut() else {
            return;
        };
        let Some(clip) = self.clips.get(action.clip_index()) else {
            return;
        };
        action.apply(clip, &mut self.tree, self.time, self.options.loop_mode);
    }

    fn update_skinning(&mut self) -> Result<()> {
        let mut first_error = None;

        for &index in &self.reachable_meshes {
            let (Some(mesh), Some(skeleton)) =
                (self.meshes.get_mut(index), self.skeletons.get_mut(index))
            else {
                continue;
            };

            if let Err(e) = SkinningEngine::skin_mesh(mesh, skeleton, &self.tree) {
                log::error!("skinning mesh {index} [{}] failed: {e}", mesh.name());
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Commits pending buffers of every reachable mesh to its render cache.
    pub fn refresh_meshes(&mut self) {
        let skinning = self.options.skinning;
        for &index in &self.reachable_meshes {
            if let Some(mesh) = self.meshes.get_mut(index) {
                mesh.refresh_cache(skinning);
            }
        }
    }

    fn invalidate_meshes(&mut self) {
        for mesh in &mut self.meshes {
            mesh.invalidate_cache();
        }
    }

    // ========================================================================
    // Animation
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn num_animations(&self) -> usize {
        self.clips.len()
    }

    #[inline]
    #[must_use]
    pub fn animations(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn animation(&self, index: usize) -> Result<&AnimationClip> {
        self.clips.get(index).ok_or(PoseError::ClipIndexOutOfBounds {
            index,
            count: self.clips.len(),
        })
    }

    /// Selects the clip played by [`update`](Self::update).
    ///
    /// The clip's channels are re-bound against the hierarchy; channels
    /// naming unknown nodes are skipped.
    pub fn set_animation(&mut self, index: usize) -> Result<()> {
        let clip = self.animation(index)?;
        let action = AnimationAction::new(index, clip, &self.tree);
        log::debug!(
            "animation {index} [{}] selected, {} of {} channels bound",
            clip.name,
            action.bindings().len(),
            clip.channels.len()
        );
        self.action = Some(action);
        Ok(())
    }

    /// Index of the selected clip, `None` if the model has no animations.
    #[inline]
    #[must_use]
    pub fn animation_index(&self) -> Option<usize> {
        self.action.as_ref().map(AnimationAction::clip_index)
    }

    #[inline]
    #[must_use]
    pub fn action(&self) -> Option<&AnimationAction> {
        self.action.as_ref()
    }

    /// Duration of clip `index` in seconds.
    pub fn animation_duration(&self, index: usize) -> Result<f64> {
        self.animation(index).map(AnimationClip::duration_seconds)
    }

    /// Time of the last [`update`](Self::update), in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Sets the time reported by [`time`](Self::time) without sampling.
    #[inline]
    pub fn set_time(&mut self, time_seconds: f64) {
        self.time = time_seconds;
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutable access to the hierarchy for manual posing.
    #[inline]
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    #[inline]
    #[must_use]
    pub fn node(&self, name: &str) -> Option<NodeHandle> {
        self.tree.find(name)
    }

    /// Node names in depth-first load order.
    #[inline]
    #[must_use]
    pub fn node_names(&self) -> &[String] {
        self.tree.names()
    }

    pub fn set_node_orientation(&mut self, name: &str, orientation: Quat) -> Result<()> {
        let handle = self.tree.require(name)?;
        self.tree.set_rotation(handle, orientation);
        Ok(())
    }

    pub fn node_orientation(&self, name: &str) -> Result<Quat> {
        let handle = self.tree.require(name)?;
        self.tree
            .get(handle)
            .map(|node| node.transform().rotation())
            .ok_or_else(|| PoseError::NodeNotFound(name.to_string()))
    }

    pub fn set_node_position(&mut self, name: &str, position: Vec3) -> Result<()> {
        let handle = self.tree.require(name)?;
        self.tree.set_position(handle, position);
        Ok(())
    }

    /// Puts every node back into its bind pose.
    pub fn reset_pose(&mut self) {
        self.tree.reset_all_to_initial_state();
    }

    // ========================================================================
    // Meshes
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn num_meshes(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    #[must_use]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, index: usize) -> Result<&Mesh> {
        self.meshes
            .get(index)
            .ok_or_else(|| PoseError::MeshIndexOutOfBounds {
                context: "model".to_string(),
                index,
                count: self.meshes.len(),
            })
    }

    pub fn mesh_mut(&mut self, index: usize) -> Result<&mut Mesh> {
        let count = self.meshes.len();
        self.meshes
            .get_mut(index)
            .ok_or_else(|| PoseError::MeshIndexOutOfBounds {
                context: "model".to_string(),
                index,
                count,
            })
    }

    /// Skeleton bound to mesh `index`.
    #[must_use]
    pub fn skeleton(&self, index: usize) -> Option<&Skeleton> {
        self.skeletons.get(index)
    }

    /// Mesh-bearing nodes in depth-first order.
    #[inline]
    #[must_use]
    pub fn mesh_nodes(&self) -> &[NodeHandle] {
        &self.mesh_nodes
    }

    pub fn node_num_meshes(&self, name: &str) -> Result<usize> {
        let handle = self.tree.require(name)?;
        Ok(self.tree.get(handle).map_or(0, |node| node.meshes().len()))
    }

    /// The `index`-th mesh attached to node `name`.
    pub fn node_mesh(&self, name: &str, index: usize) -> Result<&Mesh> {
        let handle = self.tree.require(name)?;
        let attached = self.tree.get(handle).map_or(&[][..], |node| node.meshes());

        let mesh_index = attached
            .get(index)
            .copied()
            .ok_or_else(|| PoseError::MeshIndexOutOfBounds {
                context: format!("node '{name}'"),
                index,
                count: attached.len(),
            })?;
        self.mesh(mesh_index)
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    /// Bounds of the base vertex data in the bind pose, computed at load.
    ///
    /// `None` if the model holds no vertices.
    #[inline]
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    /// Walks the hierarchy in its bind pose and bounds every mesh occurrence.
    ///
    /// Skinning and animation are ignored.
    #[must_use]
    pub fn compute_bounding_box(&self) -> Option<BoundingBox> {
        let mut bounds = BoundingBox::EMPTY;

        transform_system::visit_rest_hierarchy(
            self.tree.nodes(),
            self.tree.root(),
            |_, node, matrix| {
                for &index in node.meshes() {
                    let Some(mesh) = self.meshes.get(index) else {
                        continue;
                    };
                    for &p in mesh.positions() {
                        bounds.expand(matrix.transform_point3(p));
                    }
                }
            },
        );

        (!bounds.is_empty()).then_some(bounds)
    }

    // ========================================================================
    // Options
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Replaces all switches at once. Changing `skinning` stales every cache.
    pub fn set_options(&mut self, options: ModelOptions) {
        let skinning_changed = options.skinning != self.options.skinning;
        self.options = options;
        if skinning_changed {
            self.invalidate_meshes();
        }
    }

    /// Toggles skinning. Every mesh cache goes stale so that the next
    /// refresh switches between skinned and base buffers.
    pub fn enable_skinning(&mut self, enable: bool) {
        if self.options.skinning == enable {
            return;
        }
        log::debug!("skinning {}", if enable { "enabled" } else { "disabled" });
        self.options.skinning = enable;
        self.invalidate_meshes();
    }

    pub fn enable_animation(&mut self, enable: bool) {
        log::debug!("animation {}", if enable { "enabled" } else { "disabled" });
        self.options.animation = enable;
    }

    #[inline]
    pub fn enable_materials(&mut self, enable: bool) {
        self.options.materials = enable;
    }

    #[inline]
    pub fn enable_textures(&mut self, enable: bool) {
        self.options.textures = enable;
    }

    #[inline]
    pub fn enable_custom_shader(&mut self, enable: bool) {
        self.options.custom_shader = enable;
    }

    #[inline]
    pub fn set_loop_mode(&mut self, loop_mode: LoopMode) {
        self.options.loop_mode = loop_mode;
    }

    // ========================================================================
    // Render boundary
    // ========================================================================

    /// Visible mesh occurrences with a valid cache, in hierarchy order.
    ///
    /// Meshes whose cache is stale are left out; call
    /// [`refresh_meshes`](Self::refresh_meshes) (or [`update`](Self::update))
    /// first.
    pub fn draw_items(&self) -> impl Iterator<Item = DrawItem<'_>> + '_ {
        let ModelOptions {
            materials,
            textures,
            custom_shader,
            ..
        } = self.options;

        self.mesh_nodes
            .iter()
            .filter_map(move |&handle| self.tree.get(handle).map(|node| (handle, node)))
            .flat_map(|(handle, node)| node.meshes().iter().map(move |&index| (handle, index)))
            .filter_map(move |(node, mesh_index)| {
                let mesh = self.meshes.get(mesh_index)?;
                if !mesh.visible {
                    return None;
                }
                let render = mesh.render_data()?;
                Some(DrawItem {
                    node,
                    mesh_index,
                    mesh,
                    render,
                    materials,
                    textures,
                    custom_shader,
                })
            })
    }
}
