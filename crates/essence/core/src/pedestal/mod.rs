//! Infusion pedestals.
//!
//! A pedestal is anchored to one block and bound to the player who placed it.
//! Items left on it gain protection over wall-clock time, up to a ceiling set
//! by the owner's level when the pedestal was placed.
mod error;
mod item;
mod progress;
mod registry;

pub use error::PedestalError;
pub use item::{Infusion, Item, is_infusable};
pub use progress::{
    FIRST_PHASE_SHARE, ONE_DAY, TIER_THRESHOLDS, average_protection, level_cap, progress,
    protection_percent, tier_for_progress, time_to_next_tier,
};
pub use registry::{InfusionPedestal, PedestalInfo, PedestalRegistry, Retrieval};
