//! Constraint-resolution core for rigid-body simulation.
//!
//! Two solvers share the same two-phase protocol: an `update`/`prep` pass that
//! caches effective masses and warm-starts from last step's impulses, followed
//! by repeated `resolve` passes that each apply one round of sequential
//! impulses. [`constraints::DistanceConstraint`] models a soft rest-length link;
//! [`collision::ContactManifoldTable`] keeps up to four persistent contact
//! points per colliding body pair and resolves non-penetration with friction.
//!
//! The solvers are single-threaded: every call takes exclusive access to the
//! body storage and runs to completion.

pub mod math;
pub mod core;
pub mod bodies;
pub mod collision;
pub mod constraints;

/// Re-export common types for easier usage
pub use crate::core::{PhysicsWorld, SimulationConfig, ContactSettings, BodyHandle, ManifoldHandle};
pub use crate::bodies::{RigidBody, RigidBodyType, RigidBodyHandle, Material};
pub use crate::collision::{CollisionData, ContactManifoldTable};
pub use crate::constraints::{Constraint, DistanceConstraint, DistanceConstraintConfig};
pub use crate::math::Vector3;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Capacity exhausted: {resource} is limited to {capacity} entries")]
        CapacityExhausted {
            resource: &'static str,
            capacity: usize,
        },
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
