//! Editor engine context
//!
//! [`EngineContext`] bundles everything an editor frame needs (scene
//! registry, edit history, asset provider and script host) and is passed
//! explicitly instead of living in globals. It also owns the edit/play
//! switch: entering play snapshots the scene, and leaving play restores it.

use std::path::Path;

use thiserror::Error;

use crate::assets::{AssetProvider, DirectoryAssets};
use crate::core::{ConfigError, EditorConfig};
use crate::history::EditHistory;
use crate::persistence::{self, PersistenceError, SceneFile};
use crate::physics::{PhysicsBackend, SimplePhysicsBackend};
use crate::render::{DrawTarget, View};
use crate::scene::{ObjectId, ObjectKind, SceneError, SceneRegistry};
use crate::scripting::{ScriptError, ScriptHost, UPDATE_FUNCTION};

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Loading or saving failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A script failed
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
}

/// Whether the editor is editing or playing the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    /// Editor fields are authoritative, physics is idle
    #[default]
    Edit,
    /// Physics and scripts run; the scene is restored on exit
    Play,
}

/// Explicit bundle of editor state
pub struct EngineContext {
    /// Live scene
    pub scene: SceneRegistry,

    /// Undo/redo stacks
    pub history: EditHistory,

    config: EditorConfig,
    assets: Box<dyn AssetProvider>,
    scripts: Option<Box<dyn ScriptHost>>,
    mode: EngineMode,
    play_snapshot: Option<SceneFile>,
    /// Time not yet consumed by fixed physics steps
    accumulator: f32,
}

impl EngineContext {
    /// Create a context with the built-in physics world and directory assets
    pub fn new(config: EditorConfig) -> Result<Self, EngineError> {
        let assets = Box::new(DirectoryAssets::from_config(&config.assets));
        Self::with_parts(config, Box::new(SimplePhysicsBackend), assets)
    }

    /// Create a context from explicit collaborators
    pub fn with_parts(
        config: EditorConfig,
        physics: Box<dyn PhysicsBackend>,
        assets: Box<dyn AssetProvider>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing editor context...");

        let scene = SceneRegistry::new(physics, config.physics.gravity_vec());
        let history = EditHistory::with_config(&config.history);

        Ok(Self {
            scene,
            history,
            config,
            assets,
            scripts: None,
            mode: EngineMode::Edit,
            play_snapshot: None,
            accumulator: 0.0,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current mode
    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    /// Whether the scene is playing
    pub fn is_playing(&self) -> bool {
        self.mode == EngineMode::Play
    }

    /// Asset provider
    pub fn assets_mut(&mut self) -> &mut dyn AssetProvider {
        self.assets.as_mut()
    }

    /// Bind a script host
    pub fn set_script_host(&mut self, host: Box<dyn ScriptHost>) {
        self.scripts = Some(host);
    }

    /// Release the script host
    pub fn release_script_host(&mut self) {
        self.scripts = None;
    }

    /// Whether a script host is bound
    pub fn has_script_host(&self) -> bool {
        self.scripts.is_some()
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Undo the last edit; refused while playing
    pub fn undo(&mut self) -> bool {
        if self.is_playing() {
            log::warn!("Undo is unavailable while playing");
            return false;
        }
        self.history.undo(&mut self.scene)
    }

    /// Redo the last undone edit; refused while playing
    pub fn redo(&mut self) -> bool {
        if self.is_playing() {
            log::warn!("Redo is unavailable while playing");
            return false;
        }
        self.history.redo(&mut self.scene)
    }

    /// Create an object of `kind` and record the creation
    pub fn create(&mut self, kind: ObjectKind) -> ObjectId {
        let id = self.scene.instantiate(kind);
        self.history.record_created(&self.scene, id);
        id
    }

    /// Destroy an object and record it
    pub fn destroy(&mut self, id: ObjectId) -> bool {
        self.history.destroy(&mut self.scene, id)
    }

    /// Assign an entity texture through the asset provider
    pub fn set_texture(&mut self, id: ObjectId, path: &str) -> Result<(), EngineError> {
        let assets = self.assets.as_mut();
        let object = self.scene.get_kind_mut(id, ObjectKind::Entity)?;
        if let Some(entity) = object.as_entity_mut() {
            entity.set_texture(path, assets);
        }
        Ok(())
    }

    /// Assign a text label font through the asset provider
    pub fn set_font(&mut self, id: ObjectId, path: &str) -> Result<(), EngineError> {
        let assets = self.assets.as_mut();
        let object = self.scene.get_kind_mut(id, ObjectKind::Text)?;
        if let Some(text) = object.as_text_mut() {
            text.set_font(path, assets);
        }
        Ok(())
    }

    /// Empty scene, empty history, edit mode, no script host
    pub fn new_project(&mut self) {
        self.scene.set_gravity(self.config.physics.gravity_vec());
        self.scene.reset();
        self.history.clear();
        self.scripts = None;
        self.mode = EngineMode::Edit;
        self.play_snapshot = None;
        self.accumulator = 0.0;
        log::info!("New project");
    }

    // ========================================================================
    // Play mode
    // ========================================================================

    /// Snapshot the scene, attach physics bodies and start playing
    pub fn begin_play(&mut self) {
        if self.is_playing() {
            log::warn!("Already playing");
            return;
        }
        self.play_snapshot = Some(SceneFile::capture(&self.scene));
        let bodies = self.scene.create_physics_bodies();
        self.mode = EngineMode::Play;
        self.accumulator = 0.0;
        log::info!("Play started ({} bodies)", bodies);
    }

    /// Advance one frame of play
    ///
    /// Runs each scripted entity's update function, then steps physics in
    /// fixed slices. `dt` is clamped to the configured frame limit, the step
    /// count is capped, and non-finite frame times are ignored.
    /// A script failure is logged with the entity's identity and ends play.
    pub fn update(&mut self, dt: f32) -> Result<(), EngineError> {
        if !self.is_playing() {
            return Ok(());
        }

        if let Err((id, e)) = self.run_scripts() {
            log::error!("Script on {} failed, ending play: {}", id, e);
            return self.end_play();
        }

        let physics = &self.config.physics;
        let frame = if dt.is_finite() {
            dt.clamp(0.0, physics.max_frame_time)
        } else {
            log::warn!("Ignoring non-finite frame time {}", dt);
            0.0
        };
        self.accumulator += frame;

        let mut steps = 0;
        while self.accumulator >= physics.fixed_timestep {
            if steps == physics.max_steps_per_frame {
                log::debug!("Dropping {:.4}s of simulation time", self.accumulator);
                self.accumulator = 0.0;
                break;
            }
            self.scene.simulation_step(physics.fixed_timestep, physics.iterations);
            self.accumulator -= physics.fixed_timestep;
            steps += 1;
        }
        Ok(())
    }

    fn run_scripts(&mut self) -> Result<(), (ObjectId, ScriptError)> {
        let Some(host) = self.scripts.as_mut() else {
            return Ok(());
        };
        let scripted: Vec<ObjectId> = self
            .scene
            .objects_of_kind(ObjectKind::Entity)
            .filter(|object| object.as_entity().map_or(false, |e| e.script_path.is_some()))
            .map(|object| object.id())
            .collect();
        for id in scripted {
            if let Some(object) = self.scene.get(id) {
                host.invoke(object, UPDATE_FUNCTION).map_err(|e| (id, e))?;
            }
        }
        Ok(())
    }

    /// Stop playing and restore the scene as it was when play began
    pub fn end_play(&mut self) -> Result<(), EngineError> {
        if !self.is_playing() {
            return Ok(());
        }
        self.scene.destroy_physics_bodies();
        self.mode = EngineMode::Edit;
        self.accumulator = 0.0;
        if let Some(snapshot) = self.play_snapshot.take() {
            snapshot.restore(&mut self.scene, self.assets.as_mut())?;
        }
        log::info!("Play ended");
        Ok(())
    }

    // ========================================================================
    // Files and drawing
    // ========================================================================

    /// Save the scene
    pub fn save_scene(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        persistence::save_scene(&self.scene, path)?;
        Ok(())
    }

    /// Load a scene, leaving play mode and clearing history
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        self.end_play()?;
        let count = persistence::load_scene(&mut self.scene, self.assets.as_mut(), path)?;
        self.history.clear();
        Ok(count)
    }

    /// View for the next frame: the active camera, with gizmos while
    /// editing in debug mode
    pub fn view(&self) -> View {
        self.scene
            .active_view(View::default().viewport)
            .with_gizmos(self.config.engine.debug_mode && !self.is_playing())
    }

    /// Draw the scene through the active view
    pub fn draw(&self, target: &mut dyn DrawTarget) {
        self.scene.draw(&self.view(), target);
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("scene", &self.scene)
            .field("mode", &self.mode)
            .field("undo_depth", &self.history.undo_depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NullAssets;
    use crate::physics::BodyKind;
    use crate::scene::SceneObject;
    use approx::assert_relative_eq;

    fn context() -> EngineContext {
        EngineContext::with_parts(
            EditorConfig::default(),
            Box::new(SimplePhysicsBackend),
            Box::new(NullAssets),
        )
        .unwrap()
    }

    struct FailingScripts;

    impl ScriptHost for FailingScripts {
        fn invoke(&mut self, object: &SceneObject, _function: &str) -> Result<(), ScriptError> {
            Err(ScriptError::Runtime {
                id: object.id(),
                message: "boom".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct CountingScripts(std::rc::Rc<std::cell::Cell<usize>>);

    impl ScriptHost for CountingScripts {
        fn invoke(&mut self, _object: &SceneObject, function: &str) -> Result<(), ScriptError> {
            assert_eq!(function, UPDATE_FUNCTION);
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    fn scripted_entity(ctx: &mut EngineContext) -> ObjectId {
        let id = ctx.scene.instantiate_entity(BodyKind::Dynamic);
        ctx.scene.get_mut(id).unwrap().as_entity_mut().unwrap().script_path = Some("player.lua".to_string());
        id
    }

    #[test]
    fn test_play_restores_scene_on_exit() {
        let mut ctx = context();
        let id = ctx.scene.instantiate_entity(BodyKind::Dynamic);

        ctx.begin_play();
        assert_eq!(ctx.scene.body_count(), 1);
        for _ in 0..60 {
            ctx.update(1.0 / 60.0).unwrap();
        }
        assert!(ctx.scene.get(id).unwrap().position.y > 0.0);

        ctx.end_play().unwrap();
        assert_eq!(ctx.mode(), EngineMode::Edit);
        assert_relative_eq!(ctx.scene.get(id).unwrap().position.y, 0.0);
        assert_eq!(ctx.scene.body_count(), 0);
    }

    #[test]
    fn test_huge_frame_time_is_clamped() {
        let mut ctx = context();
        let id = ctx.scene.instantiate_entity(BodyKind::Dynamic);
        ctx.begin_play();

        ctx.update(1.0e6).unwrap();
        ctx.update(f32::INFINITY).unwrap();
        ctx.update(f32::NAN).unwrap();
        ctx.update(-5.0).unwrap();

        // One clamped frame of free fall, nothing more
        let y = ctx.scene.get(id).unwrap().position.y;
        assert!(y.is_finite());
        assert!(y > 0.0 && y < 1.0, "fell {y}");
        assert!(ctx.is_playing());
    }

    #[test]
    fn test_step_cap_drops_leftover_time() {
        let mut config = EditorConfig::default();
        config.physics.max_steps_per_frame = 1;
        let mut capped = EngineContext::with_parts(config, Box::new(SimplePhysicsBackend), Box::new(NullAssets)).unwrap();
        let mut free = context();
        let a = capped.scene.instantiate_entity(BodyKind::Dynamic);
        let b = free.scene.instantiate_entity(BodyKind::Dynamic);
        capped.begin_play();
        free.begin_play();

        capped.update(0.2).unwrap();
        capped.update(0.0).unwrap();
        free.update(0.2).unwrap();
        let capped_y = capped.scene.get(a).unwrap().position.y;
        let free_y = free.scene.get(b).unwrap().position.y;
        assert!(capped_y > 0.0);
        assert!(capped_y < free_y);
    }

    #[test]
    fn test_gizmos_follow_debug_mode() {
        let mut config = EditorConfig::default();
        config.engine.debug_mode = true;
        let mut ctx = EngineContext::with_parts(config.clone(), Box::new(SimplePhysicsBackend), Box::new(NullAssets)).unwrap();
        assert!(ctx.view().show_gizmos);
        ctx.begin_play();
        assert!(!ctx.view().show_gizmos);

        config.engine.debug_mode = false;
        let ctx = EngineContext::with_parts(config, Box::new(SimplePhysicsBackend), Box::new(NullAssets)).unwrap();
        assert!(!ctx.view().show_gizmos);
    }

    #[test]
    fn test_failed_load_keeps_scene_and_history() {
        let mut ctx = context();
        let id = ctx.create(ObjectKind::Entity);
        let path = std::env::temp_dir().join(format!("scene_engine_bad_{}.json", std::process::id()));
        let mut other = context();
        other.create(ObjectKind::Object);
        let json = persistence::to_json(&other.scene).unwrap().replace("\"layer\": 0", "\"layer\": 40");
        std::fs::write(&path, json).unwrap();

        let result = ctx.load_scene(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(EngineError::Persistence(_))));
        assert!(ctx.scene.contains(id));
        assert!(ctx.undo());
        assert!(!ctx.scene.contains(id));
    }

    #[test]
    fn test_script_failure_ends_play() {
        let mut ctx = context();
        scripted_entity(&mut ctx);
        ctx.set_script_host(Box::new(FailingScripts));

        ctx.begin_play();
        ctx.update(0.1).unwrap();
        assert_eq!(ctx.mode(), EngineMode::Edit);
    }

    #[test]
    fn test_scripts_run_once_per_frame() {
        let mut ctx = context();
        scripted_entity(&mut ctx);
        ctx.scene.instantiate_entity(BodyKind::None);
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        ctx.set_script_host(Box::new(CountingScripts(calls.clone())));

        ctx.update(0.1).unwrap();
        assert_eq!(calls.get(), 0);
        ctx.begin_play();
        ctx.update(0.1).unwrap();
        ctx.update(0.1).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_undo_refused_while_playing() {
        let mut ctx = context();
        let id = ctx.create(ObjectKind::Text);
        ctx.begin_play();
        assert!(!ctx.undo());
        assert!(ctx.scene.contains(id));
        ctx.end_play().unwrap();
        assert!(ctx.undo());
        assert!(!ctx.scene.contains(id));
    }

    #[test]
    fn test_new_project_resets_everything() {
        let mut ctx = context();
        ctx.create(ObjectKind::Camera);
        ctx.set_script_host(Box::new(FailingScripts));
        ctx.begin_play();

        ctx.new_project();
        assert!(ctx.scene.is_empty());
        assert!(!ctx.history.can_undo());
        assert!(!ctx.has_script_host());
        assert!(!ctx.is_playing());
    }

    #[test]
    fn test_texture_requires_entity() {
        let mut ctx = context();
        let text = ctx.create(ObjectKind::Text);
        assert!(matches!(
            ctx.set_texture(text, "ship.png"),
            Err(EngineError::Scene(SceneError::KindMismatch { .. }))
        ));
        let entity = ctx.create(ObjectKind::Entity);
        ctx.set_texture(entity, "ship.png").unwrap();
        let object = ctx.scene.get(entity).unwrap();
        assert_eq!(object.as_entity().unwrap().texture_path(), "ship.png");
        assert!(object.as_entity().unwrap().texture().is_placeholder());
    }
}
