use crate::assets::description::{NodeDescription, SceneDescription};
use crate::errors::{PoseError, Result};
use crate::resources::Mesh;
use crate::scene::{Node, NodeHandle, NodeTree, SceneModel, Skeleton};

/// Turns a [`SceneDescription`] into a runnable [`SceneModel`].
pub struct ModelLoader;

impl ModelLoader {
    /// Entry point
    ///
    /// Every structural problem of the description (bad faces, out-of-range
    /// indices, duplicate node names, bones without a node) fails the load.
    pub fn load(desc: SceneDescription) -> Result<SceneModel> {
        let SceneDescription {
            root,
            meshes,
            animations,
        } = desc;

        // 1. Meshes
        let mut loaded = Vec::with_capacity(meshes.len());
        for (i, mesh) in meshes.into_iter().enumerate() {
            log::info!("loading mesh {i} [{}]", mesh.name);
            loaded.push(Mesh::from_description(mesh)?);
        }

        // 2. Hierarchy
        let mut tree = NodeTree::new(Node::with_pose(&root.name, root.pose));
        let root_handle = tree.root();
        Self::attach_meshes(&mut tree, root_handle, &root, loaded.len())?;
        for child in &root.children {
            Self::load_node(&mut tree, root_handle, child, loaded.len())?;
        }
        tree.set_initial_state_all();

        // 3. Skeletons, now that every node exists
        let skeletons = loaded
            .iter()
            .map(|mesh| Skeleton::bind(mesh, &tree))
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "loaded model: {} nodes, {} meshes, {} animations",
            tree.len(),
            loaded.len(),
            animations.len()
        );

        // 4. Animations are bound when selected
        Ok(SceneModel::from_parts(tree, loaded, skeletons, animations))
    }

    fn load_node(
        tree: &mut NodeTree,
        parent: NodeHandle,
        desc: &NodeDescription,
        mesh_count: usize,
    ) -> Result<()> {
        let handle = tree.add_child(parent, Node::with_pose(&desc.name, desc.pose))?;
        Self::attach_meshes(tree, handle, desc, mesh_count)?;

        for child in &desc.children {
            Self::load_node(tree, handle, child, mesh_count)?;
        }
        Ok(())
    }

    fn attach_meshes(
        tree: &mut NodeTree,
        handle: NodeHandle,
        desc: &NodeDescription,
        mesh_count: usize,
    ) -> Result<()> {
        for &mesh_index in &desc.meshes {
            if mesh_index >= mesh_count {
                return Err(PoseError::MeshIndexOutOfBounds {
                    context: format!("node '{}'", desc.name),
                    index: mesh_index,
                    count: mesh_count,
                });
            }
            tree.push_mesh(handle, mesh_index);
        }
        Ok(())
    }
}
