//! Transform System
//!
//! Hierarchy-level transform logic, decoupled from [`NodeTree`](crate::scene::NodeTree)
//! so that it only borrows the node arena.
//!
//! Derived transforms are pulled, not pushed:
//! - writes call [`request_update`], which flags the node and its whole
//!   subtree as dirty (no matrix work happens on write)
//! - reads call [`resolve_derived`], which climbs to the nearest clean
//!   ancestor and recomputes the dirty chain top-down
//!
//! Because dirtiness always covers complete subtrees, a clean node implies
//! clean ancestors, so each node is recomputed at most once per dirty epoch
//! regardless of which sibling is read first.

use glam::Mat4;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::transform::DerivedTransform;

/// Marks `handle` and every descendant as needing a derived-transform update.
///
/// Uses an explicit stack so that deep hierarchies cannot overflow.
pub fn request_update(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) {
    let mut stack: SmallVec<[NodeHandle; 32]> = SmallVec::new();
    stack.push(handle);

    while let Some(current) = stack.pop() {
        let Some(node) = nodes.get(current) else {
            continue;
        };
        node.transform.mark_dirty();
        stack.extend(node.children.iter().copied());
    }
}

/// Returns the derived transform of `handle`, recomputing stale state.
///
/// Returns `None` if the handle is not part of the arena.
pub fn resolve_derived(
    nodes: &SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
) -> Option<DerivedTransform> {
    let node = nodes.get(handle)?;
    if !node.transform.needs_update() {
        return Some(node.transform.cached());
    }

    // 1. Collect the dirty chain up to the first clean ancestor (or the root)
    let mut chain: SmallVec<[NodeHandle; 16]> = SmallVec::new();
    chain.push(handle);

    let mut parent_state: Option<DerivedTransform> = None;
    let mut cursor = node.parent;
    while let Some(parent_handle) = cursor {
        let Some(parent) = nodes.get(parent_handle) else {
            break;
        };
        if !parent.transform.needs_update() {
            parent_state = Some(parent.transform.cached());
            break;
        }
        chain.push(parent_handle);
        cursor = parent.parent;
    }

    // 2. Recompute top-down
    let mut derived = DerivedTransform::IDENTITY;
    for &current in chain.iter().rev() {
        if let Some(node) = nodes.get(current) {
            derived = node.transform.refresh(parent_state.as_ref());
            parent_state = Some(derived);
        }
    }

    Some(derived)
}

/// Returns true if `ancestor` is `handle` itself or one of its ancestors.
pub fn is_ancestor_or_self(
    nodes: &SlotMap<NodeHandle, Node>,
    ancestor: NodeHandle,
    handle: NodeHandle,
) -> bool {
    let mut cursor = Some(handle);
    while let Some(current) = cursor {
        if current == ancestor {
            return true;
        }
        cursor = nodes.get(current).and_then(|n| n.parent);
    }
    false
}

/// Depth-first walk over the subtree at `root` in the bind pose.
///
/// Uses an explicit running matrix built from each node's initial local
/// matrix and never touches the derived caches. The visitor receives the node
/// and its accumulated bind-pose matrix.
pub fn visit_rest_hierarchy<F>(nodes: &SlotMap<NodeHandle, Node>, root: NodeHandle, mut visit: F)
where
    F: FnMut(NodeHandle, &Node, &Mat4),
{
    let mut stack: Vec<(NodeHandle, Mat4)> = Vec::with_capacity(64);
    stack.push((root, Mat4::IDENTITY));

    while let Some((handle, parent_matrix)) = stack.pop() {
        let Some(node) = nodes.get(handle) else {
            continue;
        };

        let matrix = parent_matrix * node.transform.initial_pose().to_matrix();
        visit(handle, node, &matrix);

        // Reverse so that children are visited in declaration order
        for &child in node.children.iter().rev() {
            stack.push((child, matrix));
        }
    }
}
