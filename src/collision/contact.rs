use crate::bodies::{Material, RigidBody};
use crate::collision::CollisionData;
use crate::core::{BodyHandle, BodyStorage, ContactPoint, ContactSettings, Storage};
use crate::math::{Matrix3, Vector3, EPSILON};
use crate::Result;

/// One persistent contact point between two bodies.
///
/// Holds the detection-time geometry, a tangent basis fixed at creation, the
/// effective masses along the three contact axes and the impulses accumulated
/// during the current step.
#[derive(Debug, Clone)]
pub struct Contact {
    body_a: BodyHandle,
    body_b: BodyHandle,
    data: CollisionData,

    tangent1: Vector3,
    tangent2: Vector3,

    normal_mass: f32,
    tangent_mass1: f32,
    tangent_mass2: f32,

    normal_impulse: f32,
    tangent_impulse1: f32,
    tangent_impulse2: f32,

    restitution: f32,
    friction: f32,
    velocity_bias: f32,
}

/// Reciprocal of the mass seen along `axis` when pushing at lever arms `r_a`/`r_b`
fn effective_mass(
    axis: Vector3,
    r_a: Vector3,
    r_b: Vector3,
    inv_mass_sum: f32,
    inv_inertia_a: &Matrix3,
    inv_inertia_b: &Matrix3,
) -> f32 {
    let ra_cross = r_a.cross(&axis);
    let rb_cross = r_b.cross(&axis);

    let k = inv_mass_sum
        + ra_cross.dot(&inv_inertia_a.multiply_vector(ra_cross))
        + rb_cross.dot(&inv_inertia_b.multiply_vector(rb_cross));

    if k > EPSILON {
        1.0 / k
    } else {
        0.0
    }
}

impl Contact {
    /// Creates a contact between two stored bodies
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        data: CollisionData,
        bodies: &BodyStorage<RigidBody>,
    ) -> Result<Self> {
        let mut contact = Self {
            body_a,
            body_b,
            data,
            tangent1: Vector3::zero(),
            tangent2: Vector3::zero(),
            normal_mass: 0.0,
            tangent_mass1: 0.0,
            tangent_mass2: 0.0,
            normal_impulse: 0.0,
            tangent_impulse1: 0.0,
            tangent_impulse2: 0.0,
            restitution: 0.0,
            friction: 0.0,
            velocity_bias: 0.0,
        };

        contact.reset(body_a, body_b, data, bodies)?;
        Ok(contact)
    }

    /// Reinitializes this contact for new geometry, discarding every cached value
    pub fn reset(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        data: CollisionData,
        bodies: &BodyStorage<RigidBody>,
    ) -> Result<()> {
        let a = bodies.get_body(body_a)?;
        let b = bodies.get_body(body_b)?;

        self.body_a = body_a;
        self.body_b = body_b;
        self.data = data;
        self.normal_impulse = 0.0;
        self.tangent_impulse1 = 0.0;
        self.tangent_impulse2 = 0.0;
        self.velocity_bias = 0.0;
        self.init(a, b);

        Ok(())
    }

    fn init(&mut self, a: &RigidBody, b: &RigidBody) {
        let normal = self.data.normal;
        let (tangent1, tangent2) = normal.orthonormal_basis();
        self.tangent1 = tangent1;
        self.tangent2 = tangent2;

        let inv_mass_sum = a.get_inverse_mass() + b.get_inverse_mass();
        let inv_inertia_a = a.get_inverse_inertia_tensor();
        let inv_inertia_b = b.get_inverse_inertia_tensor();
        let (r_a, r_b) = (self.data.local_a, self.data.local_b);

        self.normal_mass = effective_mass(normal, r_a, r_b, inv_mass_sum, inv_inertia_a, inv_inertia_b);
        self.tangent_mass1 = effective_mass(tangent1, r_a, r_b, inv_mass_sum, inv_inertia_a, inv_inertia_b);
        self.tangent_mass2 = effective_mass(tangent2, r_a, r_b, inv_mass_sum, inv_inertia_a, inv_inertia_b);

        self.restitution = Material::combine_restitution(a.get_material(), b.get_material());
        self.friction = Material::combine_friction(a.get_material(), b.get_material());
    }

    /// Relative velocity of B's contact point with respect to A's
    fn relative_velocity(&self, bodies: &BodyStorage<RigidBody>) -> Option<Vector3> {
        let (a, b) = bodies.get_pair(self.body_a, self.body_b)?;
        Some(b.velocity_at(self.data.local_b) - a.velocity_at(self.data.local_a))
    }

    /// Applies `impulse` to B and its negation to A, with matching angular parts
    fn apply_impulse(&self, impulse: Vector3, bodies: &mut BodyStorage<RigidBody>) {
        if let Some(a) = bodies.get_mut(self.body_a) {
            a.apply_impulse(-impulse);
            a.apply_angular_impulse(-self.data.local_a.cross(&impulse));
        }
        if let Some(b) = bodies.get_mut(self.body_b) {
            b.apply_impulse(impulse);
            b.apply_angular_impulse(self.data.local_b.cross(&impulse));
        }
    }

    /// Prepares the contact for a new step: computes the velocity bias and
    /// warm-starts from a fraction of last step's accumulated impulse.
    pub fn update(&mut self, dt: f32, settings: &ContactSettings, bodies: &mut BodyStorage<RigidBody>) {
        let Some(relative_velocity) = self.relative_velocity(bodies) else {
            return;
        };

        let normal_velocity = relative_velocity.dot(&self.data.normal);

        // Slow approaches do not bounce; this keeps resting stacks from jittering.
        let restitution = if -normal_velocity < settings.restitution_velocity_threshold {
            0.0
        } else {
            self.restitution
        };

        let position_bias = if dt > 0.0 {
            -settings.baumgarte * (self.data.penetration - settings.penetration_slop).max(0.0) / dt
        } else {
            0.0
        };
        self.velocity_bias = position_bias + restitution * normal_velocity.min(0.0);

        let warm_start = (self.data.normal * self.normal_impulse
            + self.tangent1 * self.tangent_impulse1
            + self.tangent2 * self.tangent_impulse2)
            * settings.warm_start_factor;
        if warm_start != Vector3::ZERO {
            self.apply_impulse(warm_start, bodies);
        }

        self.normal_impulse = 0.0;
        self.tangent_impulse1 = 0.0;
        self.tangent_impulse2 = 0.0;
    }

    /// Runs one sequential-impulse pass for the normal and both friction directions
    pub fn resolve(&mut self, bodies: &mut BodyStorage<RigidBody>) {
        let Some(relative_velocity) = self.relative_velocity(bodies) else {
            return;
        };
        let normal = self.data.normal;

        let normal_velocity = relative_velocity.dot(&normal);
        let delta = -(normal_velocity + self.velocity_bias) * self.normal_mass;
        let previous = self.normal_impulse;
        self.normal_impulse = (previous + delta).max(0.0);
        let normal_delta = self.normal_impulse - previous;

        // Box approximation of the friction cone, sized by this pass's normal impulse.
        let max_friction = (self.friction * self.normal_impulse).max(0.0);

        let delta = -relative_velocity.dot(&self.tangent1) * self.tangent_mass1;
        let previous = self.tangent_impulse1;
        self.tangent_impulse1 = (previous + delta).clamp(-max_friction, max_friction);
        let tangent_delta1 = self.tangent_impulse1 - previous;

        let delta = -relative_velocity.dot(&self.tangent2) * self.tangent_mass2;
        let previous = self.tangent_impulse2;
        self.tangent_impulse2 = (previous + delta).clamp(-max_friction, max_friction);
        let tangent_delta2 = self.tangent_impulse2 - previous;

        let impulse = normal * normal_delta
            + self.tangent1 * tangent_delta1
            + self.tangent2 * tangent_delta2;
        self.apply_impulse(impulse, bodies);
    }

    /// Checks the contact against the bodies' current positions.
    ///
    /// Returns false once either contact point has drifted more than
    /// `threshold` from where it was detected, or the points have separated
    /// along the normal.
    pub fn is_valid(&self, position_a: Vector3, position_b: Vector3, threshold: f32) -> bool {
        let current_a = position_a + self.data.local_a;
        let current_b = position_b + self.data.local_b;
        let threshold_sq = threshold * threshold;

        if current_a.distance_squared(&self.data.world_a) > threshold_sq
            || current_b.distance_squared(&self.data.world_b) > threshold_sq
        {
            return false;
        }

        (current_b - current_a).dot(&self.data.normal) <= 0.0
    }

    /// Returns whether this contact sits within `threshold` of the candidate's world points
    pub fn is_near(&self, data: &CollisionData, threshold: f32) -> bool {
        let threshold_sq = threshold * threshold;
        self.data.world_a.distance_squared(&data.world_a) < threshold_sq
            && self.data.world_b.distance_squared(&data.world_b) < threshold_sq
    }

    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    pub fn data(&self) -> &CollisionData {
        &self.data
    }

    pub fn tangents(&self) -> (Vector3, Vector3) {
        (self.tangent1, self.tangent2)
    }

    pub fn normal_impulse(&self) -> f32 {
        self.normal_impulse
    }

    pub fn tangent_impulses(&self) -> (f32, f32) {
        (self.tangent_impulse1, self.tangent_impulse2)
    }

    pub fn effective_masses(&self) -> (f32, f32, f32) {
        (self.normal_mass, self.tangent_mass1, self.tangent_mass2)
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn velocity_bias(&self) -> f32 {
        self.velocity_bias
    }

    /// Snapshot used for collision events
    pub fn to_contact_point(&self) -> ContactPoint {
        ContactPoint {
            position: self.data.world_a,
            normal: self.data.normal,
            penetration: self.data.penetration,
            normal_impulse: self.normal_impulse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sliding_pair() -> (BodyStorage<RigidBody>, BodyHandle, BodyHandle, CollisionData) {
        let mut bodies = BodyStorage::default();
        let ground = bodies.add(RigidBody::new_static(Vector3::new(0.0, -0.5, 0.0)));
        let cube = bodies.add(
            RigidBody::new_dynamic(Vector3::new(0.0, 0.49, 0.0), 1.0)
                .with_linear_velocity(Vector3::new(3.0, -1.0, 0.0)),
        );

        let data = CollisionData::new(
            Vector3::unit_y(),
            Vector3::new(0.0, 0.5, 0.0),
            Vector3::new(0.0, -0.5, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, -0.01, 0.0),
            0.01,
        );

        (bodies, ground, cube, data)
    }

    #[test]
    fn test_init_caches_material_and_masses() {
        let (bodies, ground, cube, data) = sliding_pair();
        let contact = Contact::new(ground, cube, data, &bodies).unwrap();

        let (normal_mass, tangent_mass1, tangent_mass2) = contact.effective_masses();
        // Lever arm is parallel to the normal, so only linear mass contributes.
        assert!((normal_mass - 1.0).abs() < 1e-5);
        assert!(tangent_mass1 > 0.0 && tangent_mass1 < 1.0);
        assert!(tangent_mass2 > 0.0 && tangent_mass2 < 1.0);

        let material = Material::default();
        assert_eq!(contact.restitution(), material.restitution);
        assert_eq!(contact.friction(), material.friction * material.friction);
    }

    #[test]
    fn test_missing_body_is_an_error() {
        let (bodies, ground, _, data) = sliding_pair();
        assert!(Contact::new(ground, BodyHandle(99), data, &bodies).is_err());
    }

    #[test]
    fn test_friction_stays_inside_cone() {
        let (mut bodies, ground, cube, data) = sliding_pair();
        let settings = ContactSettings::default();
        let mut contact = Contact::new(ground, cube, data, &bodies).unwrap();

        contact.update(1.0 / 60.0, &settings, &mut bodies);
        for _ in 0..10 {
            contact.resolve(&mut bodies);

            let limit = contact.friction() * contact.normal_impulse() + 1e-6;
            let (t1, t2) = contact.tangent_impulses();
            assert!(contact.normal_impulse() >= 0.0);
            assert!(t1.abs() <= limit);
            assert!(t2.abs() <= limit);
        }
    }

    #[test]
    fn test_separating_contact_applies_nothing() {
        let (mut bodies, ground, cube, mut data) = sliding_pair();
        data.penetration = 0.0;
        bodies.get_mut(cube).unwrap().set_linear_velocity(Vector3::new(0.0, 2.0, 0.0));

        let mut contact = Contact::new(ground, cube, data, &bodies).unwrap();
        contact.update(1.0 / 60.0, &ContactSettings::default(), &mut bodies);
        contact.resolve(&mut bodies);

        assert_eq!(contact.normal_impulse(), 0.0);
        assert_eq!(contact.tangent_impulses(), (0.0, 0.0));
        assert_eq!(bodies.get(cube).unwrap().get_linear_velocity(), Vector3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_friction_collapses_with_normal_impulse() {
        let (mut bodies, ground, cube, data) = sliding_pair();
        let mut contact = Contact::new(ground, cube, data, &bodies).unwrap();

        contact.update(1.0 / 60.0, &ContactSettings::default(), &mut bodies);
        contact.resolve(&mut bodies);

        let (t1, t2) = contact.tangent_impulses();
        assert!(contact.normal_impulse() > 0.0);
        assert!(t1 != 0.0 || t2 != 0.0);

        // A sudden separating velocity clamps the normal impulse to zero in the
        // next pass, and the friction bound shrinks with it.
        let body = bodies.get_mut(cube).unwrap();
        body.set_linear_velocity(Vector3::new(3.0, 10.0, 0.0));
        body.set_angular_velocity(Vector3::zero());
        contact.resolve(&mut bodies);

        assert_eq!(contact.normal_impulse(), 0.0);
        assert_eq!(contact.tangent_impulses(), (0.0, 0.0));
    }
}
