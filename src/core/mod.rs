pub mod world;
pub mod config;
pub mod storage;
pub mod events;

pub use self::world::PhysicsWorld;
pub use self::config::{SimulationConfig, ContactSettings};
pub use self::storage::{BodyStorage, ConstraintStorage, Storage};
pub use self::events::{EventQueue, CollisionEvent, CollisionEventType};

use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A unique identifier for a body in the physics world.
///
/// Handles are issued in increasing order and never reused, so they double as
/// the stable, totally ordered body identifier used to canonicalize pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// Builds a handle from a raw identifier, for callers that keep their own body registry
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier
    pub fn id(self) -> u32 {
        self.0
    }
}

/// A unique identifier for a constraint in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle(pub(crate) u32);

slotmap::new_key_type! {
    /// Handle to a contact manifold in a [`ContactManifoldTable`](crate::collision::ContactManifoldTable).
    ///
    /// The key carries the slot's version, so a handle to a removed manifold
    /// never resolves to a newer manifold that reuses the slot.
    pub struct ManifoldHandle;
}

/// A snapshot of one contact point, as published in collision events
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// The position of the contact point on body A in world space
    pub position: Vector3,

    /// The normal of the contact surface, pointing from A to B
    pub normal: Vector3,

    /// The penetration depth of the contact
    pub penetration: f32,

    /// The normal impulse accumulated during the last step
    pub normal_impulse: f32,
}

/// The gravity to apply to the physics world
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum GravityType {
    /// No gravity
    None,

    /// Constant gravity in a direction (typically downward along y-axis)
    Constant(Vector3),
}

impl Default for GravityType {
    fn default() -> Self {
        Self::Constant(Vector3::new(0.0, -9.81, 0.0))
    }
}
