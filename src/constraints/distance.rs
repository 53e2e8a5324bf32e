use crate::constraints::Constraint;
use crate::core::{BodyHandle, BodyStorage, Storage};
use crate::bodies::RigidBody;
use crate::math::{Vector3, EPSILON};
use crate::Result;
use std::any::Any;
use std::f32::consts::PI;

/// Oscillation period used when none is configured
pub const DEFAULT_PERIOD: f32 = 0.2;

/// Damping ratio used when none is configured
pub const DEFAULT_DAMPING_RATIO: f32 = 0.5;

/// Optional tuning for a [`DistanceConstraint`].
///
/// Only `None` falls back to a default. An explicit `Some(0.0)` is kept as
/// zero: `period: Some(0.0)` selects the rigid link and `length: Some(0.0)`
/// pulls both centers together.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceConstraintConfig {
    /// Rest length; defaults to the bodies' separation at [`Constraint::init`]
    pub length: Option<f32>,

    /// Violations smaller than this are left alone; defaults to 0
    pub min_length: Option<f32>,

    /// Oscillation period of the spring; 0 makes the link rigid
    pub period: Option<f32>,

    /// Damping ratio of the spring; 1 is critically damped
    pub damping_ratio: Option<f32>,
}

/// A soft link that pulls two body centers towards a rest length.
///
/// The spring is described by its oscillation period and damping ratio rather
/// than raw coefficients, which keeps its behaviour independent of the masses
/// involved.
#[derive(Debug, Clone)]
pub struct DistanceConstraint {
    /// The first body in the constraint
    body_a: BodyHandle,

    /// The second body in the constraint
    body_b: BodyHandle,

    /// The bodies involved in the constraint (cached for quick lookup)
    bodies: [BodyHandle; 2],

    /// Resolved on init, or on the first update if init was skipped
    length: Option<f32>,

    /// Violations smaller than this in magnitude are not resolved
    min_length: f32,

    /// Oscillation period of the spring in seconds (0 for a rigid link)
    period: f32,

    /// Damping ratio of the spring
    damping_ratio: f32,

    /// Stiffness per unit effective mass, derived from the period
    stiffness: f32,

    /// Damping per unit effective mass, derived from the period and damping ratio
    damping: f32,

    /// Unit direction from A to B
    normal: Vector3,

    /// Separation minus rest length
    dist: f32,

    /// Velocity target that drives the violation back towards zero
    velocity_bias: f32,

    /// Softness term plus the inverse mass sum
    divisor: f32,

    /// The impulse accumulated during the current step
    accumulated_impulse: f32,

    /// False while the separation is degenerate or both bodies are immovable
    active: bool,
}

impl DistanceConstraint {
    /// Creates a new distance constraint between the centers of two bodies
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, config: DistanceConstraintConfig) -> Self {
        let mut constraint = Self {
            body_a,
            body_b,
            bodies: [body_a, body_b],
            length: config.length.map(|length| length.max(0.0)),
            min_length: config.min_length.unwrap_or(0.0).max(0.0),
            period: config.period.unwrap_or(DEFAULT_PERIOD).max(0.0),
            damping_ratio: config.damping_ratio.unwrap_or(DEFAULT_DAMPING_RATIO).max(0.0),
            stiffness: 0.0,
            damping: 0.0,
            normal: Vector3::zero(),
            dist: 0.0,
            velocity_bias: 0.0,
            divisor: 0.0,
            accumulated_impulse: 0.0,
            active: false,
        };

        constraint.derive_coefficients();
        constraint
    }

    /// stiffness = 4π²/T², damping = 4πζ/T. A zero period leaves both at zero
    /// and the constraint is solved rigidly.
    fn derive_coefficients(&mut self) {
        if self.period == 0.0 {
            self.stiffness = 0.0;
            self.damping = 0.0;
        } else {
            self.stiffness = 4.0 * PI * PI / (self.period * self.period);
            self.damping = 4.0 * PI * self.damping_ratio / self.period;
        }
    }

    /// The rest length, once resolved
    pub fn get_length(&self) -> Option<f32> {
        self.length
    }

    /// Sets the rest length. Negative lengths are clamped to zero.
    pub fn set_length(&mut self, length: f32) {
        self.length = Some(length.max(0.0));
    }

    /// Returns the slack below which violations are ignored
    pub fn get_min_length(&self) -> f32 {
        self.min_length
    }

    /// Sets the slack below which violations are ignored
    pub fn set_min_length(&mut self, min_length: f32) {
        self.min_length = min_length.max(0.0);
    }

    /// Returns the oscillation period of the spring
    pub fn get_period(&self) -> f32 {
        self.period
    }

    /// Sets the oscillation period and re-derives the spring coefficients
    pub fn set_period(&mut self, period: f32) {
        self.period = period.max(0.0);
        self.derive_coefficients();
    }

    /// Returns the damping ratio of the spring
    pub fn get_damping_ratio(&self) -> f32 {
        self.damping_ratio
    }

    /// Sets the damping ratio and re-derives the spring coefficients
    pub fn set_damping_ratio(&mut self, damping_ratio: f32) {
        self.damping_ratio = damping_ratio.max(0.0);
        self.derive_coefficients();
    }

    /// Returns the stiffness derived from the period
    pub fn get_stiffness(&self) -> f32 {
        self.stiffness
    }

    /// Returns the damping coefficient derived from the period and damping ratio
    pub fn get_damping(&self) -> f32 {
        self.damping
    }

    /// Impulse accumulated by `resolve` since the last `update`
    pub fn get_accumulated_impulse(&self) -> f32 {
        self.accumulated_impulse
    }

    /// Separation minus rest length, as of the last `update`
    pub fn get_violation(&self) -> f32 {
        self.dist
    }

    /// Unit direction from A to B, as of the last `update`
    pub fn get_normal(&self) -> Vector3 {
        self.normal
    }

    /// Velocity bias computed by the last `update`
    pub fn get_velocity_bias(&self) -> f32 {
        self.velocity_bias
    }

    /// Whether the last `update` left the constraint solvable
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn apply_impulse(&self, magnitude: f32, bodies: &mut BodyStorage<RigidBody>) {
        let impulse = self.normal * magnitude;

        if let Some(body_a) = bodies.get_mut(self.body_a) {
            body_a.apply_impulse(-impulse);
        }
        if let Some(body_b) = bodies.get_mut(self.body_b) {
            body_b.apply_impulse(impulse);
        }
    }
}

impl Constraint for DistanceConstraint {
    fn constraint_type(&self) -> &'static str {
        "Distance"
    }

    fn get_bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    fn init(&mut self, bodies: &BodyStorage<RigidBody>) -> Result<()> {
        let body_a = bodies.get_body(self.body_a)?;
        let body_b = bodies.get_body(self.body_b)?;

        if self.length.is_none() {
            self.length = Some(body_a.get_position().distance(&body_b.get_position()));
        }

        self.accumulated_impulse = 0.0;
        Ok(())
    }

    fn update(&mut self, _time: f32, dt: f32, bodies: &mut BodyStorage<RigidBody>) {
        let Some((body_a, body_b)) = bodies.get_pair(self.body_a, self.body_b) else {
            self.active = false;
            return;
        };

        let separation = body_b.get_position() - body_a.get_position();
        let length = separation.length();
        let inv_mass_sum = body_a.get_inverse_mass() + body_b.get_inverse_mass();
        let rest_length = *self.length.get_or_insert(length);

        if length <= EPSILON || inv_mass_sum <= EPSILON || dt <= 0.0 {
            if length <= EPSILON {
                tracing::warn!(
                    body_a = ?self.body_a,
                    body_b = ?self.body_b,
                    "Distance constraint bodies coincide, skipping"
                );
            }
            self.active = false;
            self.accumulated_impulse = 0.0;
            return;
        }

        self.normal = separation / length;
        self.dist = length - rest_length;

        let (gamma, beta) = if self.period == 0.0 {
            (0.0, 1.0)
        } else {
            let effective_mass = 1.0 / inv_mass_sum;
            let c = self.damping * effective_mass;
            let k = self.stiffness * effective_mass;
            let denominator = c + dt * k;
            (1.0 / (dt * denominator), dt * k / denominator)
        };

        self.velocity_bias = beta * self.dist / dt;
        self.divisor = gamma + inv_mass_sum;
        self.active = true;

        // Half of last step's impulse goes to each body.
        let warm_start = self.accumulated_impulse * 0.5;
        if warm_start != 0.0 {
            self.apply_impulse(warm_start, bodies);
        }
        self.accumulated_impulse = 0.0;
    }

    fn resolve(&mut self, bodies: &mut BodyStorage<RigidBody>) {
        if !self.active || self.dist.abs() < self.min_length {
            return;
        }

        let Some((body_a, body_b)) = bodies.get_pair(self.body_a, self.body_b) else {
            return;
        };

        let relative_velocity = body_b.get_linear_velocity() - body_a.get_linear_velocity();
        let lambda = -(self.normal.dot(&relative_velocity) + self.velocity_bias) / self.divisor;

        self.apply_impulse(lambda, bodies);
        self.accumulated_impulse += lambda;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_constraint(&self) -> Box<dyn Constraint> {
        Box::new(self.clone())
    }
}
