//! Minimal built-in physics world
//!
//! Integrates dynamic bodies under gravity with semi-implicit Euler and
//! moves kinematic bodies by their velocity. There is no collision
//! response; it exists so the editor can play scenes without an external
//! simulator attached.

use super::{BodyDesc, BodyHandle, BodyKind, PhysicsBackend, PhysicsError, PhysicsWorld};
use crate::foundation::math::{normalize_rotation, Vec2};
use slotmap::{DefaultKey, Key, KeyData, SlotMap};

#[derive(Debug, Clone)]
struct SimpleBody {
    kind: BodyKind,
    position: Vec2,
    rotation: f32,
    velocity: Vec2,
    angular_velocity: f32,
    _half_extents: Vec2,
}

/// Slot-map backed world used by [`SimplePhysicsBackend`]
#[derive(Debug)]
pub struct SimplePhysicsWorld {
    gravity: Vec2,
    bodies: SlotMap<DefaultKey, SimpleBody>,
}

impl SimplePhysicsWorld {
    /// Create an empty world
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: SlotMap::new(),
        }
    }

    fn key(handle: BodyHandle) -> DefaultKey {
        KeyData::from_ffi(handle.raw()).into()
    }

    /// Set the linear and angular velocity of a body
    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2, angular_velocity: f32) -> bool {
        match self.bodies.get_mut(Self::key(handle)) {
            Some(body) if body.kind != BodyKind::Static => {
                body.velocity = velocity;
                body.angular_velocity = angular_velocity;
                true
            }
            _ => false,
        }
    }

    /// World gravity
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }
}

impl PhysicsWorld for SimplePhysicsWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        if !desc.kind.wants_body() {
            return Err(PhysicsError::BodyCreation(
                "body kind `none` cannot be simulated".to_string(),
            ));
        }
        let key = self.bodies.insert(SimpleBody {
            kind: desc.kind,
            position: desc.position,
            rotation: desc.rotation,
            velocity: Vec2::zeros(),
            angular_velocity: 0.0,
            _half_extents: desc.half_extents,
        });
        Ok(BodyHandle::from_raw(key.data().as_ffi()))
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(Self::key(handle)).is_some()
    }

    fn step(&mut self, dt: f32, iterations: u32) {
        if dt <= 0.0 {
            return;
        }
        let iterations = iterations.max(1);
        let h = dt / iterations as f32;
        for _ in 0..iterations {
            for body in self.bodies.values_mut() {
                match body.kind {
                    BodyKind::Dynamic => body.velocity += self.gravity * h,
                    BodyKind::Kinematic => {}
                    BodyKind::Static | BodyKind::None => continue,
                }
                body.position += body.velocity * h;
                body.rotation = normalize_rotation(body.rotation + body.angular_velocity * h);
            }
        }
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(Self::key(handle)).map(|body| body.position)
    }

    fn body_rotation(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(Self::key(handle)).map(|body| body.rotation)
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

/// Backend producing [`SimplePhysicsWorld`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplePhysicsBackend;

impl PhysicsBackend for SimplePhysicsBackend {
    fn create_world(&self, gravity: Vec2) -> Result<Box<dyn PhysicsWorld>, PhysicsError> {
        Ok(Box::new(SimplePhysicsWorld::new(gravity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn desc(kind: BodyKind) -> BodyDesc {
        BodyDesc {
            kind,
            position: Vec2::new(1.0, 2.0),
            rotation: 0.0,
            half_extents: Vec2::new(0.5, 0.5),
        }
    }

    #[test]
    fn test_dynamic_body_falls_static_stays() {
        let mut world = SimplePhysicsWorld::new(Vec2::new(0.0, 10.0));
        let dynamic = world.create_body(&desc(BodyKind::Dynamic)).unwrap();
        let fixed = world.create_body(&desc(BodyKind::Static)).unwrap();

        world.step(1.0, 4);

        let fallen = world.body_position(dynamic).unwrap();
        assert!(fallen.y > 2.0);
        assert_relative_eq!(fallen.x, 1.0);
        assert_eq!(world.body_position(fixed), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_kinematic_moves_by_velocity_only() {
        let mut world = SimplePhysicsWorld::new(Vec2::new(0.0, 10.0));
        let body = world.create_body(&desc(BodyKind::Kinematic)).unwrap();
        assert!(world.set_velocity(body, Vec2::new(2.0, 0.0), 90.0));

        world.step(0.5, 8);

        let position = world.body_position(body).unwrap();
        assert_relative_eq!(position.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(position.y, 2.0, epsilon = 1e-4);
        assert_relative_eq!(world.body_rotation(body).unwrap(), 45.0, epsilon = 1e-3);
    }

    #[test]
    fn test_destroyed_handle_is_stale() {
        let mut world = SimplePhysicsWorld::new(Vec2::zeros());
        let body = world.create_body(&desc(BodyKind::Dynamic)).unwrap();
        assert!(world.destroy_body(body));
        assert!(!world.destroy_body(body));
        assert_eq!(world.body_position(body), None);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_none_kind_rejected() {
        let mut world = SimplePhysicsWorld::new(Vec2::zeros());
        assert!(world.create_body(&desc(BodyKind::None)).is_err());
    }
}
