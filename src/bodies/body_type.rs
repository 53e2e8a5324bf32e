#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// How a body responds to impulses from contacts and constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum RigidBodyType {
    /// Finite mass; velocities change in response to impulses
    Dynamic,

    /// Driven by user-set velocities; infinite mass as far as the solver is concerned
    Kinematic,

    /// Never moves
    Static,
}

impl RigidBodyType {
    /// Returns true when impulses change this body's velocity
    #[inline]
    pub fn is_dynamic(self) -> bool {
        self == RigidBodyType::Dynamic
    }
}
