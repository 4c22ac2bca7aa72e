//! Queue of lifecycle events awaiting the host

use crate::event::GameEvent;

/// Events in the order they were raised. Players keep a private bus that the
/// owning system folds into its own once per tick.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    /// Move everything queued on `other` to the back of this bus
    pub fn append(&mut self, other: &mut EventBus) {
        self.queue.append(&mut other.queue);
    }

    /// Take the queued events, leaving the bus empty
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn pending(&self) -> &[GameEvent] {
        &self.queue
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::EntityId;

    #[test]
    fn drain_returns_events_in_order() {
        let mut bus = EventBus::new();
        assert!(bus.is_empty());

        let id = EntityId::from_raw(7);
        bus.push(GameEvent::ParticlePlayerStopped(id));
        bus.push(GameEvent::ParticlePlayerDeleted(id));
        assert_eq!(bus.len(), 2);

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                GameEvent::ParticlePlayerStopped(id),
                GameEvent::ParticlePlayerDeleted(id)
            ]
        );
        assert!(bus.is_empty());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn append_moves_events() {
        let mut outbox = EventBus::new();
        outbox.push(GameEvent::ParticlePlayerStopped(EntityId::from_raw(1)));

        let mut bus = EventBus::new();
        bus.push(GameEvent::ParticlePlayerDeleted(EntityId::from_raw(2)));
        bus.append(&mut outbox);
        assert!(outbox.is_empty());
        assert_eq!(bus.pending()[1].entity(), EntityId::from_raw(1));
    }
}
