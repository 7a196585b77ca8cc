use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::errors::{PoseError, Result};
use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::transform::{DerivedTransform, LocalPose};
use crate::scene::transform_system;

/// The node hierarchy of one model.
///
/// Nodes live in a [`SlotMap`] arena; ownership follows the `children`
/// lists from the single root, and each child keeps a plain handle back to
/// its parent. Every local mutation goes through this type so that the dirty
/// flag always covers the mutated node's whole subtree.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,
    by_name: FxHashMap<String, NodeHandle>,
    names: Vec<String>,
}

impl NodeTree {
    #[must_use]
    pub fn new(root: Node) -> Self {
        let mut nodes = SlotMap::with_key();
        let name = root.name.clone();
        let root = nodes.insert(root);

        let mut by_name = FxHashMap::default();
        by_name.insert(name.clone(), root);

        Self {
            nodes,
            root,
            by_name,
            names: vec![name],
        }
    }

    /// Inserts `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeHandle, mut node: Node) -> Result<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return Err(PoseError::NodeNotFound(format!("{parent:?}")));
        }
        if self.by_name.contains_key(&node.name) {
            return Err(PoseError::DuplicateNodeName(node.name));
        }

        node.parent = Some(parent);
        let name = node.name.clone();
        let handle = self.nodes.insert(node);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        self.by_name.insert(name.clone(), handle);
        self.names.push(name);

        Ok(handle)
    }

    /// Moves `child` (with its subtree) under `parent`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        let child_name = self.name_of(child)?.to_string();
        let parent_name = self.name_of(parent)?.to_string();

        if transform_system::is_ancestor_or_self(&self.nodes, child, parent) {
            return Err(PoseError::HierarchyCycle {
                child: child_name,
                parent: parent_name,
            });
        }

        // Detach from the old parent
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(old) = old_parent
            && let Some(old_node) = self.nodes.get_mut(old)
        {
            old_node.children.retain(|&c| c != child);
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }

        transform_system::request_update(&self.nodes, child);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.by_name.get(name).copied()
    }

    /// Like [`find`](Self::find) but reports a [`PoseError::NodeNotFound`].
    pub fn require(&self, name: &str) -> Result<NodeHandle> {
        self.find(name)
            .ok_or_else(|| PoseError::NodeNotFound(name.to_string()))
    }

    /// All node names in insertion (load) order.
    #[inline]
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    /// Handles of nodes carrying at least one mesh, in depth-first order.
    #[must_use]
    pub fn mesh_nodes(&self) -> Vec<NodeHandle> {
        let mut result = Vec::new();
        let mut stack = vec![self.root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if !node.meshes.is_empty() {
                result.push(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    pub(crate) fn nodes(&self) -> &SlotMap<NodeHandle, Node> {
        &self.nodes
    }

    fn name_of(&self, handle: NodeHandle) -> Result<&str> {
        self.nodes
            .get(handle)
            .map(Node::name)
            .ok_or_else(|| PoseError::NodeNotFound(format!("{handle:?}")))
    }

    // ========================================================================
    // Local state (every setter dirties the subtree)
    // ========================================================================

    pub fn set_position(&mut self, handle: NodeHandle, position: Vec3) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_position(position);
            transform_system::request_update(&self.nodes, handle);
        }
    }

    pub fn set_rotation(&mut self, handle: NodeHandle, rotation: Quat) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_rotation(rotation);
            transform_system::request_update(&self.nodes, handle);
        }
    }

    pub fn set_scale(&mut self, handle: NodeHandle, scale: Vec3) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_scale(scale);
            transform_system::request_update(&self.nodes, handle);
        }
    }

    /// Sets position, rotation and scale with a single subtree invalidation.
    pub fn set_local_pose(&mut self, handle: NodeHandle, pose: LocalPose) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_local_pose(pose);
            transform_system::request_update(&self.nodes, handle);
        }
    }

    pub fn set_inherit_rotation(&mut self, handle: NodeHandle, inherit: bool) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_inherit_rotation(inherit);
            transform_system::request_update(&self.nodes, handle);
        }
    }

    pub fn set_inherit_scale(&mut self, handle: NodeHandle, inherit: bool) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_inherit_scale(inherit);
            transform_system::request_update(&self.nodes, handle);
        }
    }

    pub(crate) fn push_mesh(&mut self, handle: NodeHandle, mesh_index: usize) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.push_mesh(mesh_index);
        }
    }

    // ========================================================================
    // Bind pose
    // ========================================================================

    pub fn set_initial_state(&mut self, handle: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_initial_state();
        }
    }

    pub fn reset_to_initial_state(&mut self, handle: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.reset_to_initial_state();
            transform_system::request_update(&self.nodes, handle);
        }
    }

    /// Snapshots every node's current local state as its bind pose.
    pub fn set_initial_state_all(&mut self) {
        for (_, node) in &mut self.nodes {
            node.transform.set_initial_state();
        }
    }

    /// Restores every node to its bind pose.
    pub fn reset_all_to_initial_state(&mut self) {
        for (_, node) in &mut self.nodes {
            node.transform.reset_to_initial_state();
        }
    }

    // ========================================================================
    // Derived state
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn derived(&self, handle: NodeHandle) -> Option<DerivedTransform> {
        transform_system::resolve_derived(&self.nodes, handle)
    }

    #[must_use]
    pub fn derived_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.derived(handle).map(|d| d.position)
    }

    #[must_use]
    pub fn derived_rotation(&self, handle: NodeHandle) -> Option<Quat> {
        self.derived(handle).map(|d| d.rotation)
    }

    #[must_use]
    pub fn derived_scale(&self, handle: NodeHandle) -> Option<Vec3> {
        self.derived(handle).map(|d| d.scale)
    }

    #[must_use]
    pub fn derived_transform(&self, handle: NodeHandle) -> Option<Mat4> {
        self.derived(handle).map(|d| d.matrix)
    }
}
