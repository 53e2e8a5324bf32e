use crate::bodies::RigidBody;
use crate::collision::{CollisionData, CollisionPair, Contact};
use crate::core::{BodyHandle, BodyStorage, ContactPoint, ContactSettings};

/// Maximum number of contact points to store in a manifold
pub const MAX_CONTACT_POINTS: usize = 4;

/// Up to four persistent contact points between one pair of bodies.
///
/// New points are written round-robin, so once the manifold is full the
/// oldest slot is the one overwritten.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    /// The collision pair this manifold belongs to
    pair: CollisionPair,

    /// Contact slots, indexed by write order modulo the capacity
    contacts: [Option<Contact>; MAX_CONTACT_POINTS],

    /// The slot the next contact is written to
    cursor: usize,

    /// Number of occupied slots
    count: usize,
}

impl ContactManifold {
    /// Creates an empty manifold for the given collision pair
    pub fn new(pair: CollisionPair) -> Self {
        Self {
            pair,
            contacts: Default::default(),
            cursor: 0,
            count: 0,
        }
    }

    pub fn pair(&self) -> CollisionPair {
        self.pair
    }

    pub fn body_a(&self) -> BodyHandle {
        self.pair.body_a
    }

    pub fn body_b(&self) -> BodyHandle {
        self.pair.body_b
    }

    /// Writes a contact into the current cursor slot and advances the cursor.
    ///
    /// Returns the contact previously held in that slot, if any.
    pub fn add_contact(&mut self, contact: Contact) -> Option<Contact> {
        let evicted = self.contacts[self.cursor].replace(contact);
        if evicted.is_none() {
            self.count += 1;
        }

        self.cursor = (self.cursor + 1) % MAX_CONTACT_POINTS;
        evicted
    }

    /// Near-duplicate replacement: if an existing contact lies within
    /// `threshold` of the candidate's world points, it is dropped so the caller
    /// can register the candidate in its place. Its accumulated impulses are
    /// not carried over.
    ///
    /// Returns whether a contact was dropped.
    pub fn contains(&mut self, data: &CollisionData, threshold: f32) -> bool {
        let found = self
            .contacts
            .iter()
            .position(|slot| slot.as_ref().map_or(false, |c| c.is_near(data, threshold)));

        match found {
            Some(index) => {
                self.contacts[index] = None;
                self.count -= 1;
                true
            }
            None => false,
        }
    }

    /// Drift eviction: drops every contact whose points moved more than
    /// `threshold` since detection, or that stopped penetrating.
    ///
    /// Returns whether any contact remains. A manifold whose bodies no longer
    /// exist keeps nothing.
    pub fn update(&mut self, bodies: &BodyStorage<RigidBody>, threshold: f32) -> bool {
        let positions = bodies
            .get_pair(self.pair.body_a, self.pair.body_b)
            .map(|(a, b)| (a.get_position(), b.get_position()));

        for slot in self.contacts.iter_mut() {
            let keep = match (slot.as_ref(), positions) {
                (Some(contact), Some((position_a, position_b))) => {
                    contact.is_valid(position_a, position_b, threshold)
                }
                (Some(_), None) => false,
                (None, _) => continue,
            };

            if !keep {
                *slot = None;
                self.count -= 1;
            }
        }

        self.count > 0
    }

    /// Runs the prep phase of every live contact
    pub fn prep_contacts(&mut self, dt: f32, settings: &ContactSettings, bodies: &mut BodyStorage<RigidBody>) {
        for contact in self.contacts.iter_mut().flatten() {
            contact.update(dt, settings, bodies);
        }
    }

    /// Runs one resolve pass over every live contact
    pub fn resolve_contacts(&mut self, bodies: &mut BodyStorage<RigidBody>) {
        for contact in self.contacts.iter_mut().flatten() {
            contact.resolve(bodies);
        }
    }

    /// Returns the number of live contacts
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns whether the manifold holds no contacts
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates live contacts in slot order
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().flatten()
    }

    /// Snapshot of the live contact points
    pub fn contact_points(&self) -> Vec<ContactPoint> {
        self.contacts().map(Contact::to_contact_point).collect()
    }

    /// Drops every contact
    pub fn clear(&mut self) {
        self.contacts = Default::default();
        self.cursor = 0;
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Storage;
    use crate::math::Vector3;

    fn setup() -> (BodyStorage<RigidBody>, BodyHandle, BodyHandle) {
        let mut bodies = BodyStorage::default();
        let a = bodies.add(RigidBody::new_static(Vector3::new(0.0, -0.5, 0.0)));
        let b = bodies.add(RigidBody::new_dynamic(Vector3::new(0.0, 0.49, 0.0), 1.0));
        (bodies, a, b)
    }

    fn corner(bodies: &BodyStorage<RigidBody>, a: BodyHandle, b: BodyHandle, x: f32) -> CollisionData {
        let (body_a, body_b) = bodies.get_pair(a, b).unwrap();
        CollisionData::from_world_points(
            body_a,
            body_b,
            Vector3::new(x, 0.0, 0.0),
            Vector3::new(x, -0.01, 0.0),
            Vector3::unit_y(),
        )
    }

    #[test]
    fn test_fifth_contact_evicts_oldest() {
        let (bodies, a, b) = setup();
        let mut manifold = ContactManifold::new(CollisionPair::new(a, b));

        for i in 0..MAX_CONTACT_POINTS {
            let data = corner(&bodies, a, b, i as f32 * 0.1);
            assert!(manifold.add_contact(Contact::new(a, b, data, &bodies).unwrap()).is_none());
        }
        assert_eq!(manifold.len(), MAX_CONTACT_POINTS);

        let data = corner(&bodies, a, b, 0.9);
        let evicted = manifold.add_contact(Contact::new(a, b, data, &bodies).unwrap()).unwrap();

        assert_eq!(evicted.data().world_a.x, 0.0);
        assert_eq!(manifold.len(), MAX_CONTACT_POINTS);
    }

    #[test]
    fn test_contains_drops_near_duplicate_only() {
        let (bodies, a, b) = setup();
        let mut manifold = ContactManifold::new(CollisionPair::new(a, b));
        let data = corner(&bodies, a, b, 0.0);
        manifold.add_contact(Contact::new(a, b, data, &bodies).unwrap());

        let far = corner(&bodies, a, b, 0.5);
        assert!(!manifold.contains(&far, 0.02));
        assert_eq!(manifold.len(), 1);

        let near = corner(&bodies, a, b, 0.001);
        assert!(manifold.contains(&near, 0.02));
        assert!(manifold.is_empty());
    }

    #[test]
    fn test_drifted_contact_is_removed() {
        let (mut bodies, a, b) = setup();
        let mut manifold = ContactManifold::new(CollisionPair::new(a, b));
        let data = corner(&bodies, a, b, 0.0);
        manifold.add_contact(Contact::new(a, b, data, &bodies).unwrap());

        assert!(manifold.update(&bodies, 0.02));

        bodies.get_mut(b).unwrap().set_position(Vector3::new(0.5, 0.49, 0.0));
        assert!(!manifold.update(&bodies, 0.02));
        assert!(manifold.is_empty());
    }

    #[test]
    fn test_separated_contact_is_removed() {
        let (mut bodies, a, b) = setup();
        let mut manifold = ContactManifold::new(CollisionPair::new(a, b));
        let data = corner(&bodies, a, b, 0.0);
        manifold.add_contact(Contact::new(a, b, data, &bodies).unwrap());

        // Lift the cube by less than the drift threshold but enough to separate.
        bodies.get_mut(b).unwrap().set_position(Vector3::new(0.0, 0.505, 0.0));
        assert!(!manifold.update(&bodies, 0.02));
    }
}
