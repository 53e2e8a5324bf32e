use crate::core::{
    BodyHandle, ConstraintHandle, SimulationConfig, GravityType,
    EventQueue, BodyStorage, ConstraintStorage, ManifoldHandle,
};
use crate::core::storage::Storage;
use crate::bodies::RigidBody;
use crate::collision::{CollisionData, ContactManifoldTable};
use crate::constraints::Constraint;
use crate::error::PhysicsError;
use crate::math::EPSILON;
use crate::Result;

/// Owns the bodies, constraints and contact manifolds of one simulation and
/// drives the per-step solver protocol.
///
/// Collision detection happens outside the world: feed each detected contact
/// point through [`register_contact`](Self::register_contact) between steps.
/// Collision events accumulate in the event queue until drained.
pub struct PhysicsWorld {
    /// All rigid bodies in the world
    bodies: BodyStorage<RigidBody>,

    /// All constraints in the world
    constraints: ConstraintStorage<Box<dyn Constraint>>,

    /// Persistent contacts between colliding pairs
    manifolds: ContactManifoldTable,

    /// Configuration for the simulation
    config: SimulationConfig,

    /// Queue of physics events
    events: EventQueue,

    /// The total elapsed simulation time
    time: f32,
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            bodies: BodyStorage::new(),
            constraints: ConstraintStorage::new(),
            manifolds: ContactManifoldTable::new(config.contact),
            config,
            events: EventQueue::new(),
            time: 0.0,
        }
    }

    /// Returns the current simulation time
    pub fn get_time(&self) -> f32 {
        self.time
    }

    /// Sets the gravity for the simulation
    pub fn set_gravity(&mut self, gravity: GravityType) {
        self.config.gravity = gravity;
    }

    /// Gets the current gravity
    pub fn get_gravity(&self) -> GravityType {
        self.config.gravity
    }

    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Sets the number of solver passes per step
    pub fn set_velocity_iterations(&mut self, iterations: u32) {
        self.config.velocity_iterations = iterations;
    }

    /// Adds a rigid body to the world and returns its handle
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.add(body)
    }

    /// Removes a rigid body together with its constraints and contact manifolds.
    ///
    /// Manifolds touching the body emit end events before the body goes away.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        self.bodies.get_body(handle)?;

        let constraint_handles: Vec<ConstraintHandle> = self.constraints
            .iter()
            .filter(|(_, constraint)| constraint.involves_body(handle))
            .map(|(c_handle, _)| c_handle)
            .collect();

        for c_handle in constraint_handles {
            self.constraints.remove(c_handle);
        }

        self.manifolds.remove_body(handle, &self.bodies, &mut self.events);

        self.bodies
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))
    }

    /// Gets a reference to a rigid body by its handle
    pub fn get_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies.get_body(handle)
    }

    /// Gets a mutable reference to a rigid body by its handle
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies.get_body_mut(handle)
    }

    /// Read access to every body, in handle order
    pub fn bodies(&self) -> &BodyStorage<RigidBody> {
        &self.bodies
    }

    /// Initializes a constraint against the current body state and adds it to the world
    pub fn add_constraint(&mut self, mut constraint: Box<dyn Constraint>) -> Result<ConstraintHandle> {
        constraint.init(&self.bodies)?;
        Ok(self.constraints.add(constraint))
    }

    /// Removes a constraint from the world
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Result<Box<dyn Constraint>> {
        self.constraints
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Constraint with handle {:?} not found", handle)))
    }

    /// Gets a reference to a constraint by its handle
    pub fn get_constraint(&self, handle: ConstraintHandle) -> Result<&dyn Constraint> {
        self.constraints.get_constraint(handle).map(|constraint| &**constraint)
    }

    /// Gets a mutable reference to a constraint by its handle
    pub fn get_constraint_mut(&mut self, handle: ConstraintHandle) -> Result<&mut Box<dyn Constraint>> {
        self.constraints.get_constraint_mut(handle)
    }

    /// Records a detected contact point between two bodies
    pub fn register_contact(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        data: CollisionData,
    ) -> Result<ManifoldHandle> {
        self.manifolds.register_contact(body_a, body_b, data, &self.bodies, &mut self.events)
    }

    /// The contact manifolds currently alive
    pub fn contact_manifolds(&self) -> &ContactManifoldTable {
        &self.manifolds
    }

    /// Advances the simulation by `time_step`, split into fixed sub-steps
    pub fn step(&mut self, time_step: f32) {
        let fixed_step = self.config.time_step;
        let max_steps = self.config.max_substeps;

        let mut remaining_time = time_step;
        let mut steps = 0;

        while remaining_time > EPSILON && steps < max_steps {
            let dt = fixed_step.min(remaining_time);

            self.step_simulation(dt);

            remaining_time -= dt;
            steps += 1;
        }

        tracing::trace!(
            substeps = steps,
            manifolds = self.manifolds.len(),
            contacts = self.manifolds.contact_count(),
            "Stepped physics world"
        );
    }

    /// Performs a single step of the physics simulation
    fn step_simulation(&mut self, dt: f32) {
        for (_, body) in self.bodies.iter_mut() {
            if !body.get_body_type().is_dynamic() {
                continue;
            }

            if let GravityType::Constant(gravity) = self.config.gravity {
                if body.is_affected_by_gravity() {
                    body.apply_force(gravity * body.get_mass());
                }
            }

            body.apply_damping(self.config.linear_damping, self.config.angular_damping);
            body.integrate_forces(dt);
        }

        // Prep: cache solver terms and warm-start
        for (_, constraint) in self.constraints.iter_mut() {
            constraint.update(self.time, dt, &mut self.bodies);
        }
        self.manifolds.prep_contacts(dt, &mut self.bodies);

        for _ in 0..self.config.velocity_iterations {
            for (_, constraint) in self.constraints.iter_mut() {
                constraint.resolve(&mut self.bodies);
            }
            self.manifolds.resolve_manifolds(&mut self.bodies);
        }

        for (_, body) in self.bodies.iter_mut() {
            body.integrate_velocity(dt);
        }

        self.manifolds.update(&self.bodies, &mut self.events);
        self.time += dt;
    }

    /// Returns a reference to the event queue
    pub fn get_events(&self) -> &EventQueue {
        &self.events
    }

    /// Returns a mutable reference to the event queue
    pub fn get_events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Clears the world of all bodies, constraints and manifolds
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.constraints.clear();
        self.manifolds.clear();
        self.events.clear();
        self.time = 0.0;
    }

    /// Returns the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns the number of constraints in the world
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Returns the number of live contact manifolds
    pub fn manifold_count(&self) -> usize {
        self.manifolds.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{DistanceConstraint, DistanceConstraintConfig};
    use crate::core::CollisionEventType;
    use crate::math::Vector3;
    use approx::assert_relative_eq;

    #[test]
    fn test_gravity_accelerates_dynamic_bodies_only() {
        let mut world = PhysicsWorld::new();
        let ground = world.add_body(RigidBody::new_static(Vector3::zero()));
        let ball = world.add_body(RigidBody::new_dynamic(Vector3::new(0.0, 10.0, 0.0), 1.0));

        world.step(1.0 / 60.0);

        assert_eq!(world.get_body(ground).unwrap().get_position(), Vector3::zero());
        let velocity = world.get_body(ball).unwrap().get_linear_velocity();
        assert_relative_eq!(velocity.y, -9.81 / 60.0, epsilon = 1e-5);
        assert_relative_eq!(world.get_time(), 1.0 / 60.0, epsilon = 1e-6);
    }

    #[test]
    fn test_step_is_split_into_substeps() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(GravityType::None);
        let ball = world.add_body(
            RigidBody::new_dynamic(Vector3::zero(), 1.0).with_linear_velocity(Vector3::new(1.0, 0.0, 0.0)),
        );

        world.step(0.05);

        assert_relative_eq!(world.get_time(), 0.05, epsilon = 1e-5);
        assert_relative_eq!(world.get_body(ball).unwrap().get_position().x, 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_remove_body_cleans_up_links_and_contacts() {
        let mut world = PhysicsWorld::new();
        let a = world.add_body(RigidBody::new_static(Vector3::zero()));
        let b = world.add_body(RigidBody::new_dynamic(Vector3::new(0.0, 0.99, 0.0), 1.0));

        let link = DistanceConstraint::new(a, b, DistanceConstraintConfig::default());
        world.add_constraint(Box::new(link)).unwrap();

        let (body_a, body_b) = world.bodies().get_pair(a, b).unwrap();
        let data = CollisionData::from_world_points(
            body_a,
            body_b,
            Vector3::new(0.0, 0.5, 0.0),
            Vector3::new(0.0, 0.49, 0.0),
            Vector3::unit_y(),
        );
        world.register_contact(a, b, data).unwrap();
        world.get_events_mut().clear();

        world.remove_body(b).unwrap();

        assert_eq!(world.body_count(), 1);
        assert_eq!(world.constraint_count(), 0);
        assert_eq!(world.manifold_count(), 0);
        assert_eq!(world.get_events().get_collision_events_of_type(CollisionEventType::End).len(), 2);
        assert!(world.remove_body(b).is_err());
    }

    #[test]
    fn test_constraint_with_missing_body_is_rejected() {
        let mut world = PhysicsWorld::new();
        let a = world.add_body(RigidBody::new_dynamic(Vector3::zero(), 1.0));
        let link = DistanceConstraint::new(a, BodyHandle(77), DistanceConstraintConfig::default());

        assert!(world.add_constraint(Box::new(link)).is_err());
        assert_eq!(world.constraint_count(), 0);
    }
}
