//! Storm essence economy and timed-ability rules.
//!
//! `essence-core` defines the canonical rules for the essence economy: the
//! ability catalog, progression levels, the passive drain, active ability
//! dispatch, and the infusion pedestal. Everything is synchronous and free of
//! I/O. Hosts reach the outside world only through the collaborator traits in
//! [`env`], and all state mutation flows through [`engine::EssenceEngine`].
pub mod ability;
pub mod active;
pub mod config;
pub mod drain;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod passive;
pub mod pedestal;
pub mod progression;
pub mod record;
pub mod timer;
pub mod types;

#[cfg(test)]
mod testing;

pub use ability::{
    AbilityCatalog, AbilityDefinition, AbilityId, AbilityKind, ActiveEffect, ActiveTerms,
};
pub use active::{AbilityActivation, AbilityError, AbilityOutcome};
pub use config::{
    AbilityConfig, DrainConfig, EssenceConfig, EyeOfTheStormConfig, InfusionConfig,
    LightningReflexesConfig, StormResistanceConfig, StormSenseConfig, StormbornConfig,
    StormcallerConfig, StormclearConfig, StormriderConfig,
};
pub use drain::{DrainOutcome, DrainPolicy};
pub use effect::{CUE_POINTS, EffectCommand, GuideCue, MovementDirective, MovementSample, guide_cue};
pub use engine::{EssenceAward, EssenceEngine, PlayerStatus};
pub use env::{
    BalanceError, BalanceStore, Clock, CuePlan, CueScheduler, Env, Hazard, HazardRegistry,
    TaskHandle, WorldHost,
};
pub use error::{ErrorSeverity, EssenceError};
pub use passive::{PassiveEffects, PassiveError, PassiveToggle};
pub use pedestal::{
    Infusion, InfusionPedestal, Item, PedestalError, PedestalInfo, PedestalRegistry, Retrieval,
    average_protection, is_infusable, level_cap, protection_percent, tier_for_progress,
    time_to_next_tier,
};
pub use progression::{is_unlocked, level_for_total};
pub use record::{PersistedRecord, PlayerRecord};
pub use timer::{ExpiryTable, Timestamp, format_remaining};
pub use types::{BlockPos, HazardId, Location, ParsePlayerIdError, PlayerId, Position, ZoneId};
