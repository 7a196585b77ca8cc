//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! [`PoseError`] covers the failure modes of the runtime:
//! - Name lookups that do not resolve to a node
//! - Clip and mesh indices outside the loaded range
//! - Malformed scene descriptions rejected while building a model
//!
//! Degenerate key data (a track without keys) is never an error; sampling
//! falls back to the identity value for that track.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, PoseError>`.
//!
//! ```rust,ignore
//! use pose::errors::Result;
//!
//! fn pick_clip(model: &mut pose::SceneModel) -> Result<()> {
//!     model.set_animation(1)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// No node with the given name exists in the model.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A bone references a node name that is not part of the hierarchy.
    #[error("Bone '{bone}' of mesh '{mesh}' references a missing node")]
    BoneNodeNotFound {
        /// Name of the mesh owning the bone
        mesh: String,
        /// Name of the bone (and of the node it should bind to)
        bone: String,
    },

    /// Two nodes of the same model share a name.
    #[error("Duplicate node name: {0}")]
    DuplicateNodeName(String),

    /// Re-parenting would make a node its own ancestor.
    #[error("Attaching '{child}' under '{parent}' would create a cycle")]
    HierarchyCycle {
        /// Node being moved
        child: String,
        /// Requested new parent
        parent: String,
    },

    // ========================================================================
    // Index Errors
    // ========================================================================
    /// Animation clip index out of bounds.
    #[error("Animation clip index out of bounds: {index} (count: {count})")]
    ClipIndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Number of clips in the model
        count: usize,
    },

    /// Mesh index out of bounds.
    #[error("Mesh index out of bounds: {context} (index: {index}, count: {count})")]
    MeshIndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
        /// Number of meshes available in that context
        count: usize,
    },

    // ========================================================================
    // Scene Description Errors
    // ========================================================================
    /// A face with other than three indices was found.
    #[error("Non-triangular face found: mesh '{mesh}', face #{face} has {indices} indices")]
    NonTriangularFace {
        /// Mesh name
        mesh: String,
        /// Face number
        face: usize,
        /// Number of indices of the offending face
        indices: usize,
    },

    /// A face or bone weight points past the end of the vertex arrays.
    #[error("Vertex index out of bounds in mesh '{mesh}': {index} (vertex count: {count})")]
    VertexIndexOutOfBounds {
        /// Mesh name
        mesh: String,
        /// The invalid vertex index
        index: usize,
        /// Number of vertices in the mesh
        count: usize,
    },

    /// A per-vertex attribute does not match the position count.
    #[error("Attribute '{attribute}' of mesh '{mesh}' has {actual} entries, expected {expected}")]
    AttributeLengthMismatch {
        /// Mesh name
        mesh: String,
        /// Attribute name
        attribute: &'static str,
        /// Expected entry count (the vertex count)
        expected: usize,
        /// Actual entry count
        actual: usize,
    },
}

/// Alias for `Result<T, PoseError>`.
pub type Result<T> = std::result::Result<T, PoseError>;
