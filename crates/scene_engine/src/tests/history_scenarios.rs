//! Undo/redo behavior through the public editing surface

use crate::assets::NullAssets;
use crate::core::EditorConfig;
use crate::foundation::math::Vec2;
use crate::history::EditHistory;
use crate::physics::{BodyKind, SimplePhysicsBackend};
use crate::scene::{ObjectKind, SceneRegistry};
use crate::EngineContext;

fn registry() -> SceneRegistry {
    SceneRegistry::with_simple_physics(Vec2::new(0.0, 9.81))
}

#[test]
fn test_position_undo_redo_round_trip() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let id = scene.instantiate_entity(BodyKind::None);
    assert_eq!(scene.get(id).unwrap().position, Vec2::new(0.0, 0.0));

    let capture = history.begin_capture(&scene, id).unwrap();
    scene.get_mut(id).unwrap().position = Vec2::new(5.0, 5.0);
    assert!(history.commit_capture(capture, &scene));

    history.undo(&mut scene);
    assert_eq!(scene.get(id).unwrap().position, Vec2::new(0.0, 0.0));
    history.redo(&mut scene);
    assert_eq!(scene.get(id).unwrap().position, Vec2::new(5.0, 5.0));
}

#[test]
fn test_new_edit_after_undo_clears_redo() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let moved = scene.instantiate_entity(BodyKind::None);
    let other = scene.instantiate_text("unrelated");

    history.edit(&mut scene, moved, |o| o.position = Vec2::new(5.0, 5.0));
    history.undo(&mut scene);
    assert!(history.can_redo());

    history.edit(&mut scene, other, |o| o.tag = "ui".to_string());
    assert!(!history.can_redo());
    assert!(!history.redo(&mut scene));
    assert_eq!(scene.get(moved).unwrap().position, Vec2::new(0.0, 0.0));
}

#[test]
fn test_no_op_edit_is_not_recorded() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let id = scene.instantiate_camera();

    let capture = history.begin_capture(&scene, id).unwrap();
    assert!(!history.commit_capture(capture, &scene));

    history.edit(&mut scene, id, |o| o.visible = true);
    assert_eq!(history.undo_depth(), 0);
}

#[test]
fn test_text_edit_undo_restores_wrapping() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let id = scene.instantiate_text("hello world");

    history.edit(&mut scene, id, |o| {
        o.as_text_mut().unwrap().set_max_width(54.0);
    });
    assert_eq!(scene.get(id).unwrap().as_text().unwrap().wrapped(), "hello\nworld");

    history.undo(&mut scene);
    assert_eq!(scene.get(id).unwrap().as_text().unwrap().wrapped(), "hello world");
}

#[test]
fn test_undo_reaches_recreated_object_by_identity() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let id = scene.instantiate_object();
    history.edit(&mut scene, id, |o| o.name = "Renamed".to_string());

    // Destroyed and brought back under the same identity
    history.destroy(&mut scene, id);
    history.undo(&mut scene);
    assert_eq!(scene.get(id).unwrap().name, "Renamed");

    history.undo(&mut scene);
    assert_eq!(scene.get(id).unwrap().name, "Object");
}

#[test]
fn test_camera_activation_is_undoable() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let first = scene.instantiate_camera();
    let second = scene.instantiate_camera();
    scene.set_active_camera(first).unwrap();

    let capture = history.begin_capture(&scene, second).unwrap();
    scene.set_active_camera(second).unwrap();
    history.commit_capture(capture, &scene);

    history.undo(&mut scene);
    assert_eq!(scene.active_camera(), None);
    assert!(!scene.get(second).unwrap().as_camera().unwrap().is_active());
    history.redo(&mut scene);
    assert_eq!(scene.active_camera(), Some(second));
}

#[test]
fn test_context_create_undo_redo() {
    let mut ctx = EngineContext::with_parts(
        EditorConfig::default(),
        Box::new(SimplePhysicsBackend),
        Box::new(NullAssets),
    )
    .unwrap();

    let id = ctx.create(ObjectKind::Entity);
    ctx.history.edit(&mut ctx.scene, id, |o| o.set_rotation(400.0));
    assert!(ctx.undo());
    assert!(ctx.undo());
    assert!(!ctx.scene.contains(id));
    assert!(ctx.redo());
    assert!(ctx.redo());
    assert!((ctx.scene.get(id).unwrap().rotation() - 40.0).abs() < 1e-4);
}
