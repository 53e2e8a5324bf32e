use crate::core::GravityType;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Tuning for contact resolution and manifold persistence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ContactSettings {
    /// Fraction of the penetration corrected per step (Baumgarte stabilization)
    pub baumgarte: f32,

    /// Penetration depth tolerated without positional correction
    pub penetration_slop: f32,

    /// Approach speeds below this bounce with zero restitution
    pub restitution_velocity_threshold: f32,

    /// Fraction of last step's accumulated impulse reapplied when a step begins
    pub warm_start_factor: f32,

    /// Distance within which two contact points are considered the same point,
    /// and beyond which a cached point is considered to have drifted
    pub manifold_threshold: f32,

    /// Maximum number of simultaneously live manifolds; `None` for unbounded
    pub max_manifolds: Option<usize>,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            baumgarte: 0.2,
            penetration_slop: 0.005,
            restitution_velocity_threshold: 0.5,
            warm_start_factor: 0.25,
            manifold_threshold: 0.02,
            max_manifolds: None,
        }
    }
}

/// Configuration parameters for the physics simulation
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The fixed time step for the simulation
    pub time_step: f32,

    /// The maximum number of substeps for variable time step simulation
    pub max_substeps: u32,

    /// The type of gravity in the simulation
    pub gravity: GravityType,

    /// Sequential-impulse passes per step over every constraint and contact
    pub velocity_iterations: u32,

    /// Global damping factor for linear velocity
    pub linear_damping: f32,

    /// Global damping factor for angular velocity
    pub angular_damping: f32,

    /// Contact solver tuning
    pub contact: ContactSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            max_substeps: 10,
            gravity: GravityType::default(),
            velocity_iterations: 8,
            linear_damping: 0.0,
            angular_damping: 0.0,
            contact: ContactSettings::default(),
        }
    }
}
