use crate::core::{BodyHandle, ShapeHandle};

/// What happened between two shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Shapes have just started touching
    Begin,

    /// Shapes have just stopped touching, or one of them was removed
    Separate,
}

/// A contact starting or ending between two shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub event_type: CollisionEventType,

    /// The shapes in arbiter order
    pub shape_a: ShapeHandle,
    pub shape_b: ShapeHandle,

    /// The bodies owning `shape_a` and `shape_b`
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
}

impl CollisionEvent {
    /// Returns true if either shape belongs to `body`
    pub fn involves_body(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// Returns true if `shape` is one of the pair
    pub fn involves_shape(&self, shape: ShapeHandle) -> bool {
        self.shape_a == shape || self.shape_b == shape
    }
}

/// Lifecycle and sleep transitions of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEventType {
    Added,
    Removed,

    /// The body's island fell asleep
    Sleep,

    /// The body's island was woken
    Awake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyEvent {
    pub event_type: BodyEventType,
    pub body: BodyHandle,
}

/// Events recorded by a space.
///
/// The space clears the queue at the start of every step, so after `step`
/// returns it holds what happened during that step plus anything recorded by
/// mutations made since. Use the `drain_*` methods to consume events early.
#[derive(Debug, Default)]
pub struct EventQueue {
    collisions: Vec<CollisionEvent>,
    bodies: Vec<BodyEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_collision_event(&mut self, event: CollisionEvent) {
        self.collisions.push(event);
    }

    pub(crate) fn add_body_event(&mut self, event_type: BodyEventType, body: BodyHandle) {
        self.bodies.push(BodyEvent { event_type, body });
    }

    /// Returns the collision events in the order they happened
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.collisions
    }

    /// Returns the body events in the order they happened
    pub fn body_events(&self) -> &[BodyEvent] {
        &self.bodies
    }

    /// Removes and returns every collision event
    pub fn drain_collision_events(&mut self) -> impl Iterator<Item = CollisionEvent> + '_ {
        self.collisions.drain(..)
    }

    /// Removes and returns every body event
    pub fn drain_body_events(&mut self) -> impl Iterator<Item = BodyEvent> + '_ {
        self.bodies.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty() && self.bodies.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.collisions.clear();
        self.bodies.clear();
    }

    /// Gets all collision events of a specific type
    pub fn get_collision_events_of_type(&self, event_type: CollisionEventType) -> Vec<&CollisionEvent> {
        self.collisions.iter().filter(|e| e.event_type == event_type).collect()
    }

    /// Gets all body events of a specific type
    pub fn get_body_events_of_type(&self, event_type: BodyEventType) -> Vec<&BodyEvent> {
        self.bodies.iter().filter(|e| e.event_type == event_type).collect()
    }

    /// Gets all collision events involving a specific body
    pub fn get_collision_events_for_body(&self, body: BodyHandle) -> Vec<&CollisionEvent> {
        self.collisions.iter().filter(|e| e.involves_body(body)).collect()
    }

    /// Gets all body events for a specific body
    pub fn get_body_events_for_body(&self, body: BodyHandle) -> Vec<&BodyEvent> {
        self.bodies.iter().filter(|e| e.body == body).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Handle;

    #[test]
    fn drain_empties_the_queue() {
        let mut queue = EventQueue::new();
        let body = BodyHandle::from_raw_parts(1, 0);
        queue.add_body_event(BodyEventType::Added, body);
        queue.add_body_event(BodyEventType::Sleep, body);

        let drained: Vec<_> = queue.drain_body_events().map(|e| e.event_type).collect();
        assert_eq!(drained, vec![BodyEventType::Added, BodyEventType::Sleep]);
        assert!(queue.is_empty());
    }
}
