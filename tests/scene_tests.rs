//! SceneModel tests
//!
//! Tests for:
//! - Loading and validating scene descriptions
//! - Per-frame update (animation -> skinning -> cache refresh)
//! - Mesh cache validity transitions and the render boundary
//! - Index and name lookups with their error cases
//! - Rest-pose bounding box
//! - Option toggles and their serialized form

use glam::{Mat4, Quat, Vec3, Vec4};
use pose::animation::{AnimationClip, KeyframeTrack, LoopMode, NodeChannel};
use pose::assets::{MeshDescription, NodeDescription, SceneDescription};
use pose::errors::PoseError;
use pose::resources::{Bone, BoundingBox, MaterialInfo, Vertex, VertexWeight};
use pose::scene::{ModelOptions, SceneModel};
use std::f32::consts::FRAC_PI_2;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn skin_positions() -> Vec<Vec3> {
    vec![
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
        Vec3::new(1.0, 2.0, 0.0),
    ]
}

/// root
/// ├── hips (0,1,0)
/// │   └── arm (1,0,0)
/// ├── body       [mesh 0, skinned to "arm"]
/// ├── prop (10,0,0)  [mesh 1]
/// └── prop2 (-5,0,0) [mesh 1]
fn description() -> SceneDescription {
    let root = NodeDescription::new("root")
        .with_child(
            NodeDescription::new("hips")
                .with_position(Vec3::Y)
                .with_child(NodeDescription::new("arm").with_position(Vec3::X)),
        )
        .with_child(NodeDescription::new("body").with_mesh(0))
        .with_child(
            NodeDescription::new("prop")
                .with_position(Vec3::new(10.0, 0.0, 0.0))
                .with_mesh(1),
        )
        .with_child(
            NodeDescription::new("prop2")
                .with_position(Vec3::new(-5.0, 0.0, 0.0))
                .with_mesh(1),
        );

    let body = MeshDescription::new("body", skin_positions())
        .with_normals(vec![Vec3::Z; 3])
        .with_triangles(&[[0, 1, 2]])
        .with_bone(Bone::new(
            "arm",
            // Inverse of the arm's bind placement at (1,1,0)
            Mat4::from_translation(Vec3::new(-1.0, -1.0, 0.0)),
            (0..3).map(|v| VertexWeight::new(v, 1.0)).collect(),
        ));

    let mut prop = MeshDescription::new("crate", vec![Vec3::ZERO, Vec3::ONE, Vec3::X])
        .with_triangles(&[[0, 1, 2]]);
    prop.material = MaterialInfo {
        name: "wood".into(),
        diffuse: Vec4::new(0.6, 0.4, 0.2, 1.0),
        diffuse_texture: Some("wood.png".into()),
        ..MaterialInfo::default()
    };

    let raise = NodeChannel::new("arm").with_positions(KeyframeTrack::from_keys([
        (0.0, Vec3::X),
        (10.0, Vec3::new(1.0, 2.0, 0.0)),
    ]));
    let ghost = NodeChannel::new("missing").with_positions(KeyframeTrack::from_keys([(0.0, Vec3::ONE)]));

    SceneDescription::new(root)
        .with_mesh(body)
        .with_mesh(prop)
        .with_animation(AnimationClip::new("raise", 10.0, 10.0, vec![raise]))
        .with_animation(AnimationClip::new("ghost", 4.0, 0.0, vec![ghost]))
}

fn model() -> SceneModel {
    init_logger();
    SceneModel::from_description(description()).unwrap()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_builds_hierarchy_and_meshes() {
    let model = model();
    assert_eq!(model.node_names(), ["root", "hips", "arm", "body", "prop", "prop2"]);
    assert_eq!(model.num_meshes(), 2);
    assert_eq!(model.num_animations(), 2);
    assert_eq!(model.animation_index(), Some(0));
    assert_eq!(model.mesh_nodes().len(), 3);

    let arm = model.node("arm").unwrap();
    assert!(vec3_approx(
        model.tree().derived_position(arm).unwrap(),
        Vec3::new(1.0, 1.0, 0.0)
    ));
    assert_eq!(model.mesh(1).unwrap().material.diffuse_texture.as_deref(), Some("wood.png"));
    assert!(model.meshes().iter().all(|m| m.cache().is_valid()));
}

#[test]
fn load_rejects_non_triangular_faces() {
    let mut desc = description();
    desc.meshes[1].faces = vec![vec![0, 1, 2, 0]];
    let err = SceneModel::from_description(desc).unwrap_err();
    assert_eq!(
        err,
        PoseError::NonTriangularFace {
            mesh: "crate".into(),
            face: 0,
            indices: 4
        }
    );
}

#[test]
fn load_rejects_out_of_range_indices() {
    let mut desc = description();
    desc.meshes[1].faces = vec![vec![0, 1, 7]];
    assert!(matches!(
        SceneModel::from_description(desc),
        Err(PoseError::VertexIndexOutOfBounds { index: 7, count: 3, .. })
    ));

    let mut desc = description();
    desc.root.children[1].meshes.push(4);
    assert!(matches!(
        SceneModel::from_description(desc),
        Err(PoseError::MeshIndexOutOfBounds { index: 4, count: 2, .. })
    ));
}

#[test]
fn load_rejects_mismatched_attributes() {
    let mut desc = description();
    desc.meshes[0].normals.pop();
    assert!(matches!(
        SceneModel::from_description(desc),
        Err(PoseError::AttributeLengthMismatch {
            attribute: "normals",
            expected: 3,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn load_rejects_duplicate_names_and_unbound_bones() {
    let mut desc = description();
    desc.root.children.push(NodeDescription::new("arm"));
    assert_eq!(
        SceneModel::from_description(desc).unwrap_err(),
        PoseError::DuplicateNodeName("arm".into())
    );

    let mut desc = description();
    desc.meshes[0].bones[0].name = "tail".into();
    assert!(matches!(
        SceneModel::from_description(desc),
        Err(PoseError::BoneNodeNotFound { .. })
    ));
}

#[test]
fn load_decomposes_node_matrices() {
    init_logger();
    let placement = Mat4::from_scale_rotation_translation(
        Vec3::splat(2.0),
        Quat::from_rotation_z(FRAC_PI_2),
        Vec3::new(10.0, 0.0, 0.0),
    );
    let mut desc = description();
    desc.root.children[2] = NodeDescription::new("prop").with_matrix(&placement).with_mesh(1);

    let model = SceneModel::from_description(desc).unwrap();
    let prop = model.node("prop").unwrap();
    let tree = model.tree();
    assert!(vec3_approx(tree.derived_position(prop).unwrap(), Vec3::new(10.0, 0.0, 0.0)));
    assert!(vec3_approx(tree.derived_scale(prop).unwrap(), Vec3::splat(2.0)));
    assert!(
        tree.derived_rotation(prop)
            .unwrap()
            .abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2), EPSILON)
    );
    assert!(
        tree.derived_transform(prop)
            .unwrap()
            .abs_diff_eq(placement, EPSILON)
    );
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn update_without_animation_keeps_bind_pose() {
    let mut model = model();
    model.update(0.5).unwrap();

    let data = model.mesh(0).unwrap().render_data().unwrap();
    for (out, base) in data.positions.iter().zip(skin_positions()) {
        assert!(vec3_approx(*out, base));
    }
}

#[test]
fn update_animates_skins_and_refreshes() {
    let mut model = model();
    model.enable_animation(true);

    // 0.5 s at 10 ticks per second: arm halfway to (1,2,0) locally
    model.update(0.5).unwrap();
    assert!((model.time() - 0.5).abs() < f64::EPSILON);

    let arm = model.node("arm").unwrap();
    assert!(vec3_approx(
        model.tree().derived_position(arm).unwrap(),
        Vec3::new(1.0, 2.0, 0.0)
    ));

    let mesh = model.mesh(0).unwrap();
    assert!(mesh.cache().is_valid());
    let data = mesh.render_data().unwrap();
    for (out, base) in data.positions.iter().zip(skin_positions()) {
        assert!(vec3_approx(*out, base + Vec3::Y));
    }
    assert!(vec3_approx(data.normals[0], Vec3::Z));
}

#[test]
fn update_wraps_time_with_loop_mode() {
    let mut model = model();
    model.enable_animation(true);
    let arm = model.node("arm").unwrap();

    model.update(1.5).unwrap();
    assert!(vec3_approx(
        model.tree().derived_position(arm).unwrap(),
        Vec3::new(1.0, 2.0, 0.0)
    ));

    model.set_loop_mode(LoopMode::Once);
    model.update(1.5).unwrap();
    // Clamped to the last key
    assert!(vec3_approx(
        model.tree().derived_position(arm).unwrap(),
        Vec3::new(1.0, 3.0, 0.0)
    ));
}

#[test]
fn unbound_clip_leaves_pose_alone() {
    let mut model = model();
    model.enable_animation(true);
    model.set_animation(1).unwrap();
    assert_eq!(model.animation_index(), Some(1));
    assert!(model.action().unwrap().bindings().is_empty());

    model.update(2.0).unwrap();
    let arm = model.node("arm").unwrap();
    assert!(vec3_approx(
        model.tree().derived_position(arm).unwrap(),
        Vec3::new(1.0, 1.0, 0.0)
    ));
}

#[test]
fn reset_pose_returns_to_bind_pose() {
    let mut model = model();
    model.enable_animation(true);
    model.update(0.5).unwrap();

    model.reset_pose();
    let arm = model.node("arm").unwrap();
    assert!(vec3_approx(
        model.tree().derived_position(arm).unwrap(),
        Vec3::new(1.0, 1.0, 0.0)
    ));
}

// ============================================================================
// Cache Validity
// ============================================================================

#[test]
fn invalidate_reports_transition_once() {
    let mut model = model();
    let mesh = model.mesh_mut(1).unwrap();

    assert!(mesh.invalidate_cache());
    assert!(!mesh.invalidate_cache());
    assert!(mesh.render_data().is_none());

    assert!(mesh.refresh_cache(true));
    assert!(!mesh.refresh_cache(true));
    assert!(mesh.render_data().is_some());
}

#[test]
fn skinning_toggle_switches_cache_source() {
    let mut model = model();
    model.enable_animation(true);
    model.update(0.5).unwrap();

    model.enable_skinning(false);
    assert!(model.meshes().iter().all(|m| !m.cache().is_valid()));
    assert_eq!(model.draw_items().count(), 0);

    model.refresh_meshes();
    let data = model.mesh(0).unwrap().render_data().unwrap();
    assert_eq!(data.positions, skin_positions().as_slice());

    // Re-enabling serves the last skinned buffers again
    model.enable_skinning(true);
    model.refresh_meshes();
    let data = model.mesh(0).unwrap().render_data().unwrap();
    assert!(vec3_approx(data.positions[0], Vec3::new(1.0, 2.0, 0.0)));
}

#[test]
fn set_options_invalidates_only_on_skinning_change() {
    let mut model = model();
    model.set_options(ModelOptions {
        materials: false,
        ..*model.options()
    });
    assert!(model.meshes().iter().all(|m| m.cache().is_valid()));

    model.set_options(ModelOptions {
        skinning: false,
        ..*model.options()
    });
    assert!(model.meshes().iter().all(|m| !m.cache().is_valid()));
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn clip_queries_and_errors() {
    let mut model = model();
    assert!((model.animation_duration(0).unwrap() - 1.0).abs() < f64::EPSILON);
    // No tick rate: one tick per second
    assert!((model.animation_duration(1).unwrap() - 4.0).abs() < f64::EPSILON);

    assert_eq!(
        model.set_animation(5),
        Err(PoseError::ClipIndexOutOfBounds { index: 5, count: 2 })
    );
    assert_eq!(model.animation_index(), Some(0));
    assert!(model.animation_duration(2).is_err());
}

#[test]
fn mesh_queries_and_errors() {
    let model = model();
    assert!(matches!(
        model.mesh(2),
        Err(PoseError::MeshIndexOutOfBounds { index: 2, count: 2, .. })
    ));

    assert_eq!(model.node_num_meshes("prop").unwrap(), 1);
    assert_eq!(model.node_num_meshes("hips").unwrap(), 0);
    assert_eq!(model.node_mesh("prop2", 0).unwrap().name(), "crate");
    assert!(matches!(
        model.node_mesh("prop", 1),
        Err(PoseError::MeshIndexOutOfBounds { index: 1, count: 1, .. })
    ));
    assert_eq!(
        model.node_num_meshes("nobody"),
        Err(PoseError::NodeNotFound("nobody".into()))
    );
}

#[test]
fn node_orientation_round_trip() {
    let mut model = model();
    let q = Quat::from_rotation_y(FRAC_PI_2);
    model.set_node_orientation("hips", q).unwrap();
    assert!(model.node_orientation("hips").unwrap().abs_diff_eq(q, EPSILON));

    let arm = model.node("arm").unwrap();
    // (1,0,0) under a quarter turn about Y lands on -Z
    assert!(vec3_approx(
        model.tree().derived_position(arm).unwrap(),
        Vec3::new(0.0, 1.0, -1.0)
    ));

    assert!(matches!(
        model.set_node_orientation("nobody", q),
        Err(PoseError::NodeNotFound(_))
    ));
}

// ============================================================================
// Bounding Box
// ============================================================================

#[test]
fn bounding_box_covers_every_mesh_occurrence() {
    let model = model();
    let bounds = model.bounding_box().unwrap();
    assert!(vec3_approx(bounds.min, Vec3::new(-5.0, 0.0, 0.0)));
    assert!(vec3_approx(bounds.max, Vec3::new(11.0, 2.0, 1.0)));
    assert!(vec3_approx(bounds.center(), Vec3::new(3.0, 1.0, 0.5)));
    assert!(vec3_approx(bounds.size(), Vec3::new(16.0, 2.0, 1.0)));
    assert!(bounds.contains(Vec3::new(1.0, 1.0, 0.5)));
    assert!(!bounds.contains(Vec3::new(12.0, 0.0, 0.0)));

    let moved = bounds.transform(&Mat4::from_translation(Vec3::Z));
    assert!(vec3_approx(moved.min, Vec3::new(-5.0, 0.0, 1.0)));

    let merged = bounds.union(&BoundingBox::from_points([Vec3::splat(20.0)]).unwrap());
    assert!(vec3_approx(merged.max, Vec3::splat(20.0)));
    assert_eq!(BoundingBox::from_points(std::iter::empty()), None);
}

#[test]
fn bounding_box_ignores_animation() {
    let mut model = model();
    let before = model.bounding_box();

    model.enable_animation(true);
    model.update(0.5).unwrap();
    model.set_node_orientation("root", Quat::from_rotation_z(1.0)).unwrap();

    assert_eq!(model.bounding_box(), before);
    assert_eq!(model.compute_bounding_box(), before);
}

#[test]
fn empty_model_has_no_bounds() {
    let model = SceneModel::from_description(SceneDescription::new(NodeDescription::new("root"))).unwrap();
    assert_eq!(model.bounding_box(), None);
    assert_eq!(model.animation_index(), None);
    assert_eq!(model.draw_items().count(), 0);
}

// ============================================================================
// Render Boundary
// ============================================================================

#[test]
fn draw_items_follow_hierarchy_and_visibility() {
    let mut model = model();
    model.enable_textures(false);

    let items: Vec<_> = model.draw_items().collect();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].mesh_index, 0);
    assert_eq!(items[1].node, model.node("prop").unwrap());
    assert_eq!(items[2].node, model.node("prop2").unwrap());
    assert!(items.iter().all(|item| item.materials && !item.textures && !item.custom_shader));
    assert_eq!(items[1].render.triangle_count(), 1);

    model.mesh_mut(1).unwrap().visible = false;
    assert_eq!(model.draw_items().count(), 1);
}

#[test]
fn render_data_interleaves_vertices() {
    let model = model();
    let item = model.draw_items().next().unwrap();
    let vertices = item.render.vertices();
    assert_eq!(vertices.len(), 3);
    assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
    assert_eq!(vertices[0].tex_coord, [0.0, 0.0]);
    assert_eq!(vertices[0].color, [1.0, 1.0, 1.0, 1.0]);

    let bytes: &[u8] = bytemuck::cast_slice(&vertices);
    assert_eq!(bytes.len(), 3 * std::mem::size_of::<Vertex>());
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn options_defaults_and_serde() {
    let defaults = ModelOptions::default();
    assert!(defaults.skinning && defaults.materials && defaults.textures);
    assert!(!defaults.animation && !defaults.custom_shader);
    assert_eq!(defaults.loop_mode, LoopMode::Loop);

    let json = serde_json::to_string(&defaults).unwrap();
    let back: ModelOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, defaults);

    let partial: ModelOptions = serde_json::from_str(r#"{"animation": true, "loop_mode": "PingPong"}"#).unwrap();
    assert!(partial.animation);
    assert!(partial.skinning);
    assert_eq!(partial.loop_mode, LoopMode::PingPong);
}

#[test]
fn loading_with_anyhow_context() -> anyhow::Result<()> {
    init_logger();
    let mut model = SceneModel::from_description(description())?;
    model.enable_animation(true);
    model.update(0.25)?;
    anyhow::ensure!(model.mesh(0)?.cache().is_valid(), "mesh cache left stale");
    Ok(())
}
