//! Collaborator traits for everything the engine does not own.
//!
//! The balance store, the hazard registry, and the host world are external
//! systems. The [`Env`] aggregate bundles them so the engine can reach each
//! one without hard coupling to a concrete implementation.
mod balance;
mod hazard;
mod task;
mod world;

pub use balance::{BalanceError, BalanceStore};
pub use hazard::{Hazard, HazardRegistry};
pub(crate) use hazard::nearest_in_zone;
pub use task::{Clock, CuePlan, CueScheduler, TaskHandle};
pub use world::WorldHost;

/// Borrowed collaborators for one engine call.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    pub balance: &'a dyn BalanceStore,
    pub hazards: &'a dyn HazardRegistry,
    pub world: &'a dyn WorldHost,
    pub cues: &'a dyn CueScheduler,
}

impl<'a> Env<'a> {
    pub fn new(
        balance: &'a dyn BalanceStore,
        hazards: &'a dyn HazardRegistry,
        world: &'a dyn WorldHost,
        cues: &'a dyn CueScheduler,
    ) -> Self {
        Self {
            balance,
            hazards,
            world,
            cues,
        }
    }
}

impl core::fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Env").finish_non_exhaustive()
    }
}
