//! Ember Runtime - Game loop infrastructure
//!
//! Provides the tick-driven building blocks the particle core runs inside:
//! - `GameClock`: fixed-timestep accumulator with an interpolation alpha
//! - `GameEvent` / `EventBus`: typed event queue for lifecycle notifications
//! - `RuntimeSystem`: trait for systems ticked by the game loop
//! - `run_frame`: drives one frame of fixed steps plus a variable update

mod clock;
mod event;
mod event_bus;
mod system;

pub use clock::{GameClock, MAX_FRAME_TIME};
pub use event::GameEvent;
pub use event_bus::EventBus;
pub use system::{run_frame, RuntimeSystem};
