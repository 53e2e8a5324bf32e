use crate::bodies::{body_flags::BodyFlags, Material, RigidBodyType};
use crate::core::BodyHandle;
use crate::math::{Vector3, Matrix3};

/// Type alias for a handle to a rigid body
pub type RigidBodyHandle = BodyHandle;

/// A rigid body as seen by the contact and constraint solvers.
///
/// Orientation is not tracked: the inverse inertia tensor is taken to be
/// world-aligned and lever arms are world-space offsets from the body's center.
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// The body's position (center of mass) in world space
    position: Vector3,

    /// The body's linear velocity
    linear_velocity: Vector3,

    /// The body's angular velocity
    angular_velocity: Vector3,

    /// The body's material properties
    material: Material,

    /// The body's type (dynamic, kinematic, or static)
    body_type: RigidBodyType,

    /// The body's mass
    mass: f32,

    /// Inverse of the body's mass (zero for non-dynamic bodies)
    inv_mass: f32,

    /// The body's inertia tensor
    inertia_tensor: Matrix3,

    /// Inverse of the body's inertia tensor (zero for non-dynamic bodies)
    inv_inertia_tensor: Matrix3,

    /// The body's linear damping
    linear_damping: f32,

    /// The body's angular damping
    angular_damping: f32,

    /// The body's flags
    flags: BodyFlags,

    /// Forces at the center of mass to be applied in the next integration step
    forces: Vec<Vector3>,
}

impl RigidBody {
    /// Creates a new rigid body with the given mass at a position.
    ///
    /// The inertia tensor defaults to that of a solid unit-diameter sphere of
    /// the same mass.
    pub fn new(position: Vector3, mass: f32, body_type: RigidBodyType) -> Self {
        let mut body = Self {
            position,
            linear_velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            material: Material::default(),
            body_type,
            mass: 0.0,
            inv_mass: 0.0,
            inertia_tensor: Matrix3::identity(),
            inv_inertia_tensor: Matrix3::zero(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            flags: BodyFlags::AFFECTED_BY_GRAVITY | BodyFlags::GENERATE_COLLISION_EVENTS,
            forces: Vec::new(),
        };

        body.set_mass(mass);
        // 2/5 m r^2 with r = 0.5
        let i = 0.1 * mass.max(0.0);
        body.set_inertia_tensor(Matrix3::from_diagonal(Vector3::new(i, i, i)));

        body
    }

    /// Creates a new dynamic rigid body
    pub fn new_dynamic(position: Vector3, mass: f32) -> Self {
        Self::new(position, mass, RigidBodyType::Dynamic)
    }

    /// Creates a new static rigid body
    pub fn new_static(position: Vector3) -> Self {
        Self::new(position, 0.0, RigidBodyType::Static)
    }

    /// Builder-style material override
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Builder-style linear velocity override
    pub fn with_linear_velocity(mut self, velocity: Vector3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Returns the body's position
    pub fn get_position(&self) -> Vector3 {
        self.position
    }

    /// Sets the body's position
    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    /// Returns the body's linear velocity
    pub fn get_linear_velocity(&self) -> Vector3 {
        self.linear_velocity
    }

    /// Sets the body's linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vector3) {
        self.linear_velocity = velocity;
    }

    /// Returns the body's angular velocity
    pub fn get_angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    /// Sets the body's angular velocity
    pub fn set_angular_velocity(&mut self, velocity: Vector3) {
        self.angular_velocity = velocity;
    }

    /// Velocity of a point attached to the body at world-space offset `r` from its center
    #[inline]
    pub fn velocity_at(&self, r: Vector3) -> Vector3 {
        self.linear_velocity + self.angular_velocity.cross(&r)
    }

    /// Returns the body's material
    pub fn get_material(&self) -> &Material {
        &self.material
    }

    /// Returns the body's restitution coefficient
    pub fn get_restitution(&self) -> f32 {
        self.material.restitution
    }

    /// Returns the body's friction coefficient
    pub fn get_friction(&self) -> f32 {
        self.material.friction
    }

    /// Returns the body's mass
    pub fn get_mass(&self) -> f32 {
        self.mass
    }

    /// Sets the body's mass (and inverse mass)
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;

        if self.body_type.is_dynamic() && mass > 0.0 {
            self.inv_mass = 1.0 / mass;
        } else {
            self.inv_mass = 0.0;
        }
    }

    /// Returns the body's inverse mass
    pub fn get_inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Returns the body's inertia tensor
    pub fn get_inertia_tensor(&self) -> &Matrix3 {
        &self.inertia_tensor
    }

    /// Sets the body's inertia tensor and recomputes its inverse.
    ///
    /// Singular tensors leave the body rotationally locked.
    pub fn set_inertia_tensor(&mut self, tensor: Matrix3) {
        self.inertia_tensor = tensor;

        self.inv_inertia_tensor = if self.body_type.is_dynamic() {
            tensor.inverse().unwrap_or_else(Matrix3::zero)
        } else {
            Matrix3::zero()
        };
    }

    /// Returns the body's inverse inertia tensor
    pub fn get_inverse_inertia_tensor(&self) -> &Matrix3 {
        &self.inv_inertia_tensor
    }

    /// Returns the body type
    pub fn get_body_type(&self) -> RigidBodyType {
        self.body_type
    }

    /// Sets the body's linear damping
    pub fn set_linear_damping(&mut self, damping: f32) {
        self.linear_damping = damping.max(0.0);
    }

    /// Returns the body's linear damping
    pub fn get_linear_damping(&self) -> f32 {
        self.linear_damping
    }

    /// Sets the body's angular damping
    pub fn set_angular_damping(&mut self, damping: f32) {
        self.angular_damping = damping.max(0.0);
    }

    /// Returns the body's angular damping
    pub fn get_angular_damping(&self) -> f32 {
        self.angular_damping
    }

    /// Returns whether the body is affected by gravity
    pub fn is_affected_by_gravity(&self) -> bool {
        self.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY)
    }

    /// Sets whether the body is affected by gravity
    pub fn set_affected_by_gravity(&mut self, affected: bool) {
        self.flags.set(BodyFlags::AFFECTED_BY_GRAVITY, affected);
    }

    /// Returns whether the body generates collision events
    pub fn generates_collision_events(&self) -> bool {
        self.flags.contains(BodyFlags::GENERATE_COLLISION_EVENTS)
    }

    /// Sets whether the body generates collision events
    pub fn set_generates_collision_events(&mut self, generates: bool) {
        self.flags.set(BodyFlags::GENERATE_COLLISION_EVENTS, generates);
    }

    /// Applies a linear impulse, changing the velocity immediately
    pub fn apply_impulse(&mut self, impulse: Vector3) {
        self.linear_velocity += impulse * self.inv_mass;
    }

    /// Applies an angular impulse, changing the angular velocity immediately
    pub fn apply_angular_impulse(&mut self, impulse: Vector3) {
        self.angular_velocity += self.inv_inertia_tensor.multiply_vector(impulse);
    }

    /// Queues a force for the next call to [`integrate_forces`](Self::integrate_forces)
    pub fn apply_force(&mut self, force: Vector3) {
        if self.body_type.is_dynamic() {
            self.forces.push(force);
        }
    }

    /// Applies damping to the body's velocities
    pub fn apply_damping(&mut self, linear_damping: f32, angular_damping: f32) {
        if !self.body_type.is_dynamic() {
            return;
        }

        let linear_damping_factor = 1.0 - (self.linear_damping + linear_damping).clamp(0.0, 1.0);
        self.linear_velocity *= linear_damping_factor;

        let angular_damping_factor = 1.0 - (self.angular_damping + angular_damping).clamp(0.0, 1.0);
        self.angular_velocity *= angular_damping_factor;
    }

    /// Integrates queued forces to update velocities
    pub fn integrate_forces(&mut self, dt: f32) {
        if !self.body_type.is_dynamic() {
            self.forces.clear();
            return;
        }

        for force in self.forces.drain(..) {
            self.linear_velocity += force * (self.inv_mass * dt);
        }
    }

    /// Integrates velocity to update position. Static bodies never move.
    pub fn integrate_velocity(&mut self, dt: f32) {
        if self.body_type == RigidBodyType::Static {
            return;
        }

        self.position += self.linear_velocity * dt;
    }
}
