#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Surface response coefficients of a body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Material {
    /// Coefficient of restitution (bounciness), 0-1
    pub restitution: f32,

    /// Coefficient of friction
    pub friction: f32,
}

impl Material {
    /// Creates a new material with the specified properties
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }

    /// Restitution used for a contact between two materials: the less bouncy one wins
    #[inline]
    pub fn combine_restitution(a: &Material, b: &Material) -> f32 {
        a.restitution.min(b.restitution)
    }

    /// Friction used for a contact between two materials
    #[inline]
    pub fn combine_friction(a: &Material, b: &Material) -> f32 {
        a.friction * b.friction
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.5,    // Medium friction
            restitution: 0.3, // Slight bounce
        }
    }
}
