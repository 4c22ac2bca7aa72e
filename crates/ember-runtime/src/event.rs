//! Lifecycle events raised by simulation systems

use ember_core::EntityId;

/// Events pushed onto the [`EventBus`](crate::EventBus) by runtime systems
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A particle player finished stopping and freed all of its particles
    ParticlePlayerStopped(EntityId),
    /// A particle player asked to be deleted and is safe to remove
    ParticlePlayerDeleted(EntityId),
}

impl GameEvent {
    /// The scene object the event refers to
    pub fn entity(&self) -> EntityId {
        match self {
            GameEvent::ParticlePlayerStopped(id) | GameEvent::ParticlePlayerDeleted(id) => *id,
        }
    }
}
