//! Headless editor session
//!
//! Builds a small scene the way the editor UI would (create, edit, reparent,
//! undo), plays it for a couple of seconds, and saves it as JSON.
//!
//! Usage: `editor_demo [config.toml|config.ron] [output.json]`

use rand::prelude::*;
use scene_engine::foundation::logging;
use scene_engine::prelude::*;

const CRATE_COUNT: usize = 6;
const PLAY_SECONDS: f32 = 2.0;
const FRAME_TIME: f32 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EditorConfig::load_from_file(&path)?,
        None => EditorConfig::default(),
    };
    let output = args.next().unwrap_or_else(|| "demo_scene.json".to_string());

    logging::init_with_filter(&config.engine.log_level);
    log::info!("Starting editor demo");

    let mut ctx = EngineContext::new(config)?;
    let mut rng = thread_rng();

    // Level layout: a ground slab with crates grouped under one parent
    let ground = ctx.create(ObjectKind::Entity);
    ctx.history.edit(&mut ctx.scene, ground, |object| {
        object.name = "Ground".to_string();
        object.position = Vec2::new(0.0, 400.0);
        object.size = Vec2::new(1200.0, 40.0);
        if let Some(entity) = object.as_entity_mut() {
            entity.body_kind = BodyKind::Static;
        }
    });
    ctx.set_texture(ground, "textures/ground.png")?;

    let group = ctx.create(ObjectKind::Object);
    ctx.history.edit(&mut ctx.scene, group, |object| object.name = "Crates".to_string());

    let mut crates = Vec::with_capacity(CRATE_COUNT);
    for i in 0..CRATE_COUNT {
        let id = ctx.create(ObjectKind::Entity);
        let x = rng.gen_range(-500.0..500.0);
        let y = rng.gen_range(-300.0..0.0);
        ctx.history.edit(&mut ctx.scene, id, |object| {
            object.name = format!("Crate {}", i + 1);
            object.tag = "crate".to_string();
            object.position = Vec2::new(x, y);
            object.set_rotation(rng.gen_range(-45.0..45.0));
            if let Some(entity) = object.as_entity_mut() {
                entity.body_kind = BodyKind::Dynamic;
            }
        });
        ctx.history.set_layer(&mut ctx.scene, id, 2)?;
        ctx.history.reparent(&mut ctx.scene, id, Some(group))?;
        crates.push(id);
    }

    let title = ctx.scene.instantiate_text("Scene editor demo: crates falling onto the ground");
    ctx.history.record_created(&ctx.scene, title);
    ctx.history.edit(&mut ctx.scene, title, |object| {
        object.position = Vec2::new(-560.0, -320.0);
        if let Some(text) = object.as_text_mut() {
            text.set_max_width(300.0);
        }
    });
    ctx.history.set_layer(&mut ctx.scene, title, LAYER_COUNT - 1)?;

    let camera = ctx.create(ObjectKind::Camera);
    ctx.history.edit(&mut ctx.scene, camera, |object| {
        if let Some(view) = object.as_camera_mut() {
            view.zoom = 0.75;
            view.follow = crates.first().copied();
        }
    });
    ctx.scene.set_active_camera(camera)?;

    // A mistaken delete, then undo
    ctx.destroy(ground);
    ctx.undo();
    log::info!(
        "Scene has {} objects, {} undoable edits",
        ctx.scene.len(),
        ctx.history.undo_depth()
    );

    let mut frame = DrawList::new();
    ctx.draw(&mut frame);
    log::info!("Edit view draws {} commands", frame.len());

    ctx.begin_play();
    let mut elapsed = 0.0;
    while elapsed < PLAY_SECONDS && ctx.is_playing() {
        ctx.update(FRAME_TIME)?;
        elapsed += FRAME_TIME;
    }
    if let Some(first) = crates.first().and_then(|id| ctx.scene.get(*id)) {
        log::info!("{} fell to y = {:.1}", first.name, first.position.y);
    }
    ctx.end_play()?;

    ctx.save_scene(&output)?;
    log::info!("Editor demo finished, scene written to {}", output);
    Ok(())
}
