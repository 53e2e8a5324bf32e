use crate::core::{BodyHandle, BodyStorage};
use crate::bodies::RigidBody;
use crate::Result;
use std::any::Any;

/// A velocity-level constraint solved with sequential impulses.
///
/// Each step runs [`update`](Constraint::update) once, then
/// [`resolve`](Constraint::resolve) as many times as the solver iterates.
pub trait Constraint: Send + Sync + 'static {
    /// Returns the type name of the constraint
    fn constraint_type(&self) -> &'static str;

    /// Returns the bodies involved in the constraint
    fn get_bodies(&self) -> &[BodyHandle];

    /// Checks if the constraint involves a specific body
    fn involves_body(&self, body: BodyHandle) -> bool {
        self.get_bodies().contains(&body)
    }

    /// Resolves defaults that depend on the bodies' initial state
    fn init(&mut self, bodies: &BodyStorage<RigidBody>) -> Result<()>;

    /// Per-step preparation: caches the solver terms and warm-starts
    fn update(&mut self, time: f32, dt: f32, bodies: &mut BodyStorage<RigidBody>);

    /// One sequential-impulse pass
    fn resolve(&mut self, bodies: &mut BodyStorage<RigidBody>);

    /// Returns a dynamic reference to any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Returns a dynamic mutable reference to any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clone the constraint to create a new box
    fn clone_constraint(&self) -> Box<dyn Constraint>;
}
