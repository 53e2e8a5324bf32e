use crate::core::{BodyHandle, ContactPoint, ManifoldHandle};
use std::collections::VecDeque;

/// Types of collision events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// The first contact between a pair was registered
    Begin,

    /// The last contact between a pair was invalidated
    End,
}

impl CollisionEventType {
    /// The conventional event name
    pub fn name(self) -> &'static str {
        match self {
            CollisionEventType::Begin => "collision:start",
            CollisionEventType::End => "collision:end",
        }
    }
}

/// A collision notification addressed to one body of a colliding pair
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// The type of collision event
    pub event_type: CollisionEventType,

    /// The body receiving the notification
    pub body: BodyHandle,

    /// The other body in the collision
    pub other: BodyHandle,

    /// The manifold describing the contact patch. Stale once an `End` event is emitted.
    pub manifold: ManifoldHandle,

    /// Snapshot of the manifold's contact points (empty for End events)
    pub contacts: Vec<ContactPoint>,
}

/// A queue of physics events
#[derive(Debug, Default)]
pub struct EventQueue {
    collision_events: VecDeque<CollisionEvent>,
}

impl EventQueue {
    /// Creates a new empty event queue
    pub fn new() -> Self {
        Self {
            collision_events: VecDeque::new(),
        }
    }

    /// Adds a collision event to the queue
    pub fn add_collision_event(&mut self, event: CollisionEvent) {
        self.collision_events.push_back(event);
    }

    /// Drains every queued collision event in emission order
    pub fn drain_collision_events(&mut self) -> impl Iterator<Item = CollisionEvent> + '_ {
        self.collision_events.drain(..)
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.collision_events.is_empty()
    }

    /// Returns the number of queued events
    pub fn len(&self) -> usize {
        self.collision_events.len()
    }

    /// Clears all events from the queue
    pub fn clear(&mut self) {
        self.collision_events.clear();
    }

    /// Gets all collision events of a specific type
    pub fn get_collision_events_of_type(&self, event_type: CollisionEventType) -> Vec<&CollisionEvent> {
        self.collision_events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}
