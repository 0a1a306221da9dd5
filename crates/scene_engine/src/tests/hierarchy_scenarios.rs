//! Hierarchy and layer invariants under long edit sequences

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::math::Vec2;
use crate::history::EditHistory;
use crate::physics::BodyKind;
use crate::render::LAYER_COUNT;
use crate::scene::{ObjectId, ObjectKind, SceneRegistry};

fn registry() -> SceneRegistry {
    SceneRegistry::with_simple_physics(Vec2::new(0.0, 9.81))
}

/// B in A.children <=> B.parent == A, and every link points at a live object
fn assert_hierarchy_consistent(scene: &SceneRegistry) {
    for object in scene.objects() {
        for child in object.children() {
            let child = scene.get(*child).expect("child is live");
            assert_eq!(child.parent(), Some(object.id()));
        }
        if let Some(parent) = object.parent() {
            let parent = scene.get(parent).expect("parent is live");
            let count = parent.children().iter().filter(|c| **c == object.id()).count();
            assert_eq!(count, 1);
        }
    }
}

/// Every object sits in exactly one bucket, the one its layer names
fn assert_layers_exclusive(scene: &SceneRegistry) {
    let order = scene.renderer().paint_order();
    assert_eq!(order.len(), scene.len());
    for object in scene.objects() {
        let hits = order.iter().filter(|id| **id == object.id()).count();
        assert_eq!(hits, 1);
        assert_eq!(scene.renderer().layer_of(object.id()), Some(object.layer()));
    }
}

fn pick(rng: &mut StdRng, ids: &[ObjectId]) -> ObjectId {
    ids[rng.gen_range(0..ids.len())]
}

#[test]
fn test_random_reparents_keep_links_consistent() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut scene = registry();
    let ids: Vec<ObjectId> = (0..12)
        .map(|i| scene.instantiate(ObjectKind::ALL[i % ObjectKind::ALL.len()]))
        .collect();

    for _ in 0..300 {
        let child = pick(&mut rng, &ids);
        let parent = if rng.gen_bool(0.2) {
            None
        } else {
            Some(pick(&mut rng, &ids))
        };
        // Cycles are rejected; the invariant must hold either way
        let _ = scene.reparent(child, parent);
        assert_hierarchy_consistent(&scene);
    }
}

#[test]
fn test_random_layer_moves_keep_buckets_exclusive() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut scene = registry();
    let ids: Vec<ObjectId> = (0..20).map(|_| scene.instantiate_entity(BodyKind::None)).collect();

    for _ in 0..200 {
        let id = pick(&mut rng, &ids);
        let layer = rng.gen_range(0..LAYER_COUNT + 2);
        let result = scene.set_layer(id, layer);
        assert_eq!(result.is_ok(), layer < LAYER_COUNT);
        assert_layers_exclusive(&scene);
    }
}

#[test]
fn test_destroy_orphans_children_in_place() {
    let mut scene = registry();
    let a = scene.instantiate_object();
    let b = scene.instantiate_entity(BodyKind::Static);
    let c = scene.instantiate_text("child");
    scene.get_mut(b).unwrap().position = Vec2::new(12.0, -4.0);
    scene.reparent(b, Some(a)).unwrap();
    scene.reparent(c, Some(a)).unwrap();

    scene.destroy(a);

    assert!(!scene.contains(a));
    let b_obj = scene.get(b).unwrap();
    assert_eq!(b_obj.parent(), None);
    assert_eq!(b_obj.position, Vec2::new(12.0, -4.0));
    assert_eq!(scene.roots(), vec![b, c]);
    assert_hierarchy_consistent(&scene);
    assert_layers_exclusive(&scene);
}

#[test]
fn test_destroy_middle_of_chain() {
    let mut scene = registry();
    let top = scene.instantiate_object();
    let middle = scene.instantiate_object();
    let bottom = scene.instantiate_object();
    scene.reparent(middle, Some(top)).unwrap();
    scene.reparent(bottom, Some(middle)).unwrap();

    scene.destroy(middle);
    assert!(scene.children_of(top).unwrap().is_empty());
    assert_eq!(scene.get(bottom).unwrap().parent(), None);
    assert_hierarchy_consistent(&scene);
}

#[test]
fn test_undo_redo_of_hierarchy_edits() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let a = scene.instantiate_object();
    let b = scene.instantiate_object();
    let child = scene.instantiate_entity(BodyKind::None);

    history.reparent(&mut scene, child, Some(a)).unwrap();
    history.reparent(&mut scene, child, Some(b)).unwrap();
    history.reparent(&mut scene, child, None).unwrap();
    assert_eq!(history.undo_depth(), 3);

    history.undo(&mut scene);
    assert_eq!(scene.get(child).unwrap().parent(), Some(b));
    assert_hierarchy_consistent(&scene);
    history.undo(&mut scene);
    assert_eq!(scene.get(child).unwrap().parent(), Some(a));
    assert_hierarchy_consistent(&scene);
    history.redo(&mut scene);
    assert_eq!(scene.children_of(b).unwrap(), &[child]);
    assert!(scene.children_of(a).unwrap().is_empty());
    assert_hierarchy_consistent(&scene);
}

#[test]
fn test_undo_destroy_relinks_parent_and_children() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let root = scene.instantiate_object();
    let middle = scene.instantiate_object();
    let leaf = scene.instantiate_object();
    scene.reparent(middle, Some(root)).unwrap();
    scene.reparent(leaf, Some(middle)).unwrap();
    scene.set_layer(middle, 6).unwrap();

    history.destroy(&mut scene, middle);
    assert_eq!(scene.get(leaf).unwrap().parent(), None);

    history.undo(&mut scene);
    assert_eq!(scene.get(middle).unwrap().parent(), Some(root));
    assert_eq!(scene.children_of(middle).unwrap(), &[leaf]);
    assert_eq!(scene.renderer().layer_of(middle), Some(6));
    assert_hierarchy_consistent(&scene);
    assert_layers_exclusive(&scene);

    history.redo(&mut scene);
    assert!(!scene.contains(middle));
    assert_hierarchy_consistent(&scene);
}

#[test]
fn test_undo_destroy_keeps_sibling_order() {
    let mut scene = registry();
    let mut history = EditHistory::new();
    let parent = scene.instantiate_object();
    let siblings: Vec<ObjectId> = (0..4).map(|_| scene.instantiate_object()).collect();
    for sibling in &siblings {
        scene.reparent(*sibling, Some(parent)).unwrap();
    }

    history.destroy(&mut scene, siblings[1]);
    assert_eq!(scene.children_of(parent).unwrap(), &[siblings[0], siblings[2], siblings[3]]);

    history.undo(&mut scene);
    assert_eq!(scene.children_of(parent).unwrap(), siblings.as_slice());
    assert_hierarchy_consistent(&scene);

    history.redo(&mut scene);
    history.undo(&mut scene);
    assert_eq!(scene.children_of(parent).unwrap(), siblings.as_slice());
}

#[test]
fn test_reparent_at_clamps_index() {
    let mut scene = registry();
    let parent = scene.instantiate_object();
    let a = scene.instantiate_object();
    let b = scene.instantiate_object();
    let c = scene.instantiate_object();

    scene.reparent(a, Some(parent)).unwrap();
    scene.reparent_at(b, parent, 0).unwrap();
    scene.reparent_at(c, parent, 99).unwrap();
    assert_eq!(scene.children_of(parent).unwrap(), &[b, a, c]);
    assert!(scene.reparent_at(parent, c, 0).is_err());
    assert_hierarchy_consistent(&scene);
}
