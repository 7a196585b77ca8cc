use std::cell::Cell;

use glam::{Mat4, Quat, Vec3};

/// Local TRS state of a node, also used as the bind-pose snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalPose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Local matrix `T * R * S` of this pose.
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Decomposes a local matrix. Shear is lost.
    #[must_use]
    pub fn from_matrix(mat: &Mat4) -> Self {
        let (scale, rotation, position) = mat.to_scale_rotation_translation();
        Self {
            position,
            rotation: normalize_rotation(rotation),
            scale,
        }
    }
}

impl Default for LocalPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// World-space state derived from a node and all of its ancestors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub matrix: Mat4,
}

impl DerivedTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        matrix: Mat4::IDENTITY,
    };

    /// Combines a local pose with the derived state of its parent.
    ///
    /// With no parent the local pose is taken as-is.
    #[must_use]
    pub fn compose(
        local: &LocalPose,
        parent: Option<&DerivedTransform>,
        inherit_rotation: bool,
        inherit_scale: bool,
    ) -> Self {
        let (position, rotation, scale) = match parent {
            None => (local.position, local.rotation, local.scale),
            Some(parent) => {
                let rotation = if inherit_rotation {
                    parent.rotation * local.rotation
                } else {
                    local.rotation
                };
                let scale = if inherit_scale {
                    parent.scale * local.scale
                } else {
                    local.scale
                };
                let position = parent.position + parent.rotation * (parent.scale * local.position);
                (position, rotation, scale)
            }
        };

        Self {
            position,
            rotation,
            scale,
            matrix: Mat4::from_scale_rotation_translation(scale, rotation, position),
        }
    }
}

impl Default for DerivedTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Transform component
///
/// Holds the local TRS of a node, its bind-pose snapshot and the lazily
/// computed derived transform. The derived values live in [`Cell`]s so that
/// read accessors can refresh them through a shared reference; the owning
/// [`NodeTree`](crate::scene::NodeTree) is responsible for propagating the
/// dirty flag to descendants, which is why the setters are crate-private.
#[derive(Debug, Clone)]
pub struct Transform {
    local: LocalPose,
    initial: LocalPose,

    inherit_rotation: bool,
    inherit_scale: bool,

    // === Derived cache ===
    derived: Cell<DerivedTransform>,
    needs_update: Cell<bool>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self::from_pose(LocalPose::IDENTITY)
    }

    /// A transform whose local state and bind pose are both `local`.
    #[must_use]
    pub fn from_pose(local: LocalPose) -> Self {
        let local = LocalPose {
            rotation: normalize_rotation(local.rotation),
            ..local
        };
        Self {
            local,
            initial: local,
            inherit_rotation: true,
            inherit_scale: true,
            derived: Cell::new(DerivedTransform::IDENTITY),
            needs_update: Cell::new(true),
        }
    }

    // ========================================================================
    // Local state
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.local.position
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.local.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.local.scale
    }

    #[inline]
    #[must_use]
    pub fn local_pose(&self) -> &LocalPose {
        &self.local
    }

    #[inline]
    #[must_use]
    pub fn inherit_rotation(&self) -> bool {
        self.inherit_rotation
    }

    #[inline]
    #[must_use]
    pub fn inherit_scale(&self) -> bool {
        self.inherit_scale
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.local.position = position;
        self.mark_dirty();
    }

    pub(crate) fn set_rotation(&mut self, rotation: Quat) {
        self.local.rotation = normalize_rotation(rotation);
        self.mark_dirty();
    }

    pub(crate) fn set_scale(&mut self, scale: Vec3) {
        self.local.scale = scale;
        self.mark_dirty();
    }

    pub(crate) fn set_local_pose(&mut self, pose: LocalPose) {
        self.local = LocalPose {
            rotation: normalize_rotation(pose.rotation),
            ..pose
        };
        self.mark_dirty();
    }

    pub(crate) fn set_inherit_rotation(&mut self, inherit: bool) {
        self.inherit_rotation = inherit;
        self.mark_dirty();
    }

    pub(crate) fn set_inherit_scale(&mut self, inherit: bool) {
        self.inherit_scale = inherit;
        self.mark_dirty();
    }

    // ========================================================================
    // Bind pose
    // ========================================================================

    /// The pose recorded by the last [`set_initial_state`](Self::set_initial_state).
    #[inline]
    #[must_use]
    pub fn initial_pose(&self) -> &LocalPose {
        &self.initial
    }

    /// Snapshots the current local state as the bind pose.
    pub fn set_initial_state(&mut self) {
        self.initial = self.local;
    }

    pub(crate) fn reset_to_initial_state(&mut self) {
        self.local = self.initial;
        self.mark_dirty();
    }

    // ========================================================================
    // Derived cache
    // ========================================================================

    /// Whether the cached derived values are stale.
    #[inline]
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.needs_update.get()
    }

    #[inline]
    pub(crate) fn mark_dirty(&self) {
        self.needs_update.set(true);
    }

    /// Cached derived state, valid only when [`needs_update`](Self::needs_update) is false.
    #[inline]
    pub(crate) fn cached(&self) -> DerivedTransform {
        self.derived.get()
    }

    /// Recomputes the derived state from the parent's (already clean) state.
    pub(crate) fn refresh(&self, parent: Option<&DerivedTransform>) -> DerivedTransform {
        let derived =
            DerivedTransform::compose(&self.local, parent, self.inherit_rotation, self.inherit_scale);
        self.derived.set(derived);
        self.needs_update.set(false);
        derived
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes a rotation, mapping a degenerate quaternion to identity.
#[inline]
fn normalize_rotation(q: Quat) -> Quat {
    if q.length_squared() > f32::EPSILON {
        q.normalize()
    } else {
        Quat::IDENTITY
    }
}
