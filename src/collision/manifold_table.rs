use std::collections::HashMap;

use slotmap::SlotMap;

use crate::bodies::RigidBody;
use crate::collision::{CollisionData, CollisionPair, Contact, ContactManifold};
use crate::core::{
    BodyHandle, BodyStorage, CollisionEvent, CollisionEventType, ContactPoint, ContactSettings,
    EventQueue, ManifoldHandle, Storage,
};
use crate::error::PhysicsError;
use crate::Result;

/// Every live contact manifold of a simulation, keyed by body pair.
///
/// Manifolds live in a [`SlotMap`], so iteration (and therefore the order
/// impulses are applied in) follows slot index order. The pair map is only
/// used for lookup.
#[derive(Debug)]
pub struct ContactManifoldTable {
    manifolds: SlotMap<ManifoldHandle, ContactManifold>,
    pairs: HashMap<CollisionPair, ManifoldHandle>,
    settings: ContactSettings,
}

impl ContactManifoldTable {
    /// Creates an empty table. `settings.max_manifolds` bounds the number of live manifolds.
    pub fn new(settings: ContactSettings) -> Self {
        let manifolds = match settings.max_manifolds {
            Some(limit) => SlotMap::with_capacity_and_key(limit),
            None => SlotMap::with_key(),
        };

        Self {
            manifolds,
            pairs: HashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ContactSettings {
        &self.settings
    }

    /// Records one contact point between `body_a` and `body_b`.
    ///
    /// The pair is stored in canonical order; if the caller passed the bodies
    /// the other way round, `data` is flipped to match. The first contact of a
    /// pair creates its manifold and emits [`CollisionEventType::Begin`] to both
    /// bodies. Later contacts replace any existing point near the same spot and
    /// are then written at the manifold's LRU cursor.
    pub fn register_contact(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        data: CollisionData,
        bodies: &BodyStorage<RigidBody>,
        events: &mut EventQueue,
    ) -> Result<ManifoldHandle> {
        if body_a == body_b {
            return Err(PhysicsError::InvalidParameter(format!(
                "Body {:?} cannot collide with itself",
                body_a
            )));
        }

        let pair = CollisionPair::new(body_a, body_b);
        let data = if pair.is_ordered_as(body_a) { data } else { data.flipped() };
        let contact = Contact::new(pair.body_a, pair.body_b, data, bodies)?;

        if let Some(&handle) = self.pairs.get(&pair) {
            if let Some(manifold) = self.manifolds.get_mut(handle) {
                manifold.contains(&data, self.settings.manifold_threshold);
                manifold.add_contact(contact);
                return Ok(handle);
            }

            self.pairs.remove(&pair);
        }

        if let Some(limit) = self.settings.max_manifolds {
            if self.manifolds.len() >= limit {
                tracing::warn!(?pair, limit, "Contact manifold table is full, dropping contact");
                return Err(PhysicsError::CapacityExhausted { resource: "contact manifold table", capacity: limit });
            }
        }

        let mut manifold = ContactManifold::new(pair);
        manifold.add_contact(contact);
        let contacts = manifold.contact_points();

        let handle = self.manifolds.insert(manifold);
        self.pairs.insert(pair, handle);

        tracing::debug!(?pair, ?handle, "Created contact manifold");
        notify_pair(CollisionEventType::Begin, pair, handle, contacts, bodies, events);

        Ok(handle)
    }

    /// Prunes drifted and separated contacts. Manifolds left without contacts
    /// are removed and emit [`CollisionEventType::End`] to both bodies.
    ///
    /// Returns the number of manifolds removed.
    pub fn update(&mut self, bodies: &BodyStorage<RigidBody>, events: &mut EventQueue) -> usize {
        let threshold = self.settings.manifold_threshold;
        let expired: Vec<ManifoldHandle> = self
            .manifolds
            .iter_mut()
            .filter_map(|(handle, manifold)| (!manifold.update(bodies, threshold)).then_some(handle))
            .collect();

        for &handle in &expired {
            self.remove_manifold(handle, bodies, events);
        }

        if !expired.is_empty() {
            tracing::trace!(removed = expired.len(), live = self.manifolds.len(), "Pruned contact manifolds");
        }

        expired.len()
    }

    /// Prep phase for every live contact: velocity bias and warm start
    pub fn prep_contacts(&mut self, dt: f32, bodies: &mut BodyStorage<RigidBody>) {
        let settings = self.settings;
        for (_, manifold) in self.manifolds.iter_mut() {
            manifold.prep_contacts(dt, &settings, bodies);
        }
    }

    /// One sequential-impulse pass over every live contact
    pub fn resolve_manifolds(&mut self, bodies: &mut BodyStorage<RigidBody>) {
        for (_, manifold) in self.manifolds.iter_mut() {
            manifold.resolve_contacts(bodies);
        }
    }

    /// Drops every manifold involving `body`, emitting end events.
    ///
    /// Call before the body leaves `bodies` so its event flag can still be read.
    pub fn remove_body(&mut self, body: BodyHandle, bodies: &BodyStorage<RigidBody>, events: &mut EventQueue) {
        let touching: Vec<ManifoldHandle> = self
            .manifolds
            .iter()
            .filter(|(_, manifold)| manifold.pair().contains(body))
            .map(|(handle, _)| handle)
            .collect();

        for handle in touching {
            self.remove_manifold(handle, bodies, events);
        }
    }

    fn remove_manifold(&mut self, handle: ManifoldHandle, bodies: &BodyStorage<RigidBody>, events: &mut EventQueue) {
        if let Some(manifold) = self.manifolds.remove(handle) {
            let pair = manifold.pair();
            self.pairs.remove(&pair);

            tracing::debug!(?pair, ?handle, "Removed contact manifold");
            notify_pair(CollisionEventType::End, pair, handle, Vec::new(), bodies, events);
        }
    }

    /// Looks up the manifold for a pair, in either argument order
    pub fn manifold_for(&self, body_a: BodyHandle, body_b: BodyHandle) -> Option<ManifoldHandle> {
        self.pairs.get(&CollisionPair::new(body_a, body_b)).copied()
    }

    pub fn get(&self, handle: ManifoldHandle) -> Option<&ContactManifold> {
        self.manifolds.get(handle)
    }

    /// Number of live manifolds
    pub fn len(&self) -> usize {
        self.manifolds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifolds.is_empty()
    }

    /// Total number of live contact points across all manifolds
    pub fn contact_count(&self) -> usize {
        self.manifolds.iter().map(|(_, manifold)| manifold.len()).sum()
    }

    /// Iterates live manifolds in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ManifoldHandle, &ContactManifold)> + '_ {
        self.manifolds.iter()
    }

    /// Drops every manifold without emitting events
    pub fn clear(&mut self) {
        self.manifolds.clear();
        self.pairs.clear();
    }
}

impl Default for ContactManifoldTable {
    fn default() -> Self {
        Self::new(ContactSettings::default())
    }
}

/// Queues one event per body of the pair that asked for collision notifications
fn notify_pair(
    event_type: CollisionEventType,
    pair: CollisionPair,
    manifold: ManifoldHandle,
    contacts: Vec<ContactPoint>,
    bodies: &BodyStorage<RigidBody>,
    events: &mut EventQueue,
) {
    for (body, other) in [(pair.body_a, pair.body_b), (pair.body_b, pair.body_a)] {
        let wants_events = bodies
            .get(body)
            .map_or(false, RigidBody::generates_collision_events);

        if wants_events {
            events.add_collision_event(CollisionEvent {
                event_type,
                body,
                other,
                manifold,
                contacts: contacts.clone(),
            });
        }
    }
}
