//! Runtime system trait and frame driver

use crate::clock::GameClock;
use ember_core::Result;

/// A system that can be ticked by the game loop
///
/// Fixed update runs at a constant rate (simulation ticks), while update runs
/// once per rendered frame with the interpolation alpha of the clock.
pub trait RuntimeSystem {
    /// Called once when the system is first registered
    fn initialize(&mut self) -> Result<()>;

    /// Called at a fixed rate (e.g. 60Hz) for the simulation tick
    fn fixed_update(&mut self, dt: f64) -> Result<()>;

    /// Called once per frame; `alpha` is the fraction of a fixed step since the last tick
    fn update(&mut self, dt: f64, alpha: f64) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}

/// Run every pending fixed step, then one variable update, for each system.
///
/// Returns the number of fixed steps taken.
pub fn run_frame(clock: &mut GameClock, systems: &mut [&mut dyn RuntimeSystem]) -> Result<u32> {
    let mut steps = 0;
    while clock.should_fixed_update() {
        for system in systems.iter_mut() {
            system.fixed_update(clock.fixed_timestep())?;
        }
        clock.consume_fixed_step();
        steps += 1;
    }
    if steps > 1 {
        log::trace!("run_frame caught up {steps} fixed steps");
    }

    let alpha = clock.interpolation_alpha();
    for system in systems.iter_mut() {
        system.update(clock.frame_time(), alpha)?;
    }
    Ok(steps)
}
