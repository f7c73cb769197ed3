//! Passive ability effects and toggling.
//!
//! Effect strength grows with the levels a player has gained past the
//! passive's unlock level, up to a configured cap.
use std::time::Duration;

use crate::ability::AbilityId;
use crate::config::{AbilityConfig, LightningReflexesConfig, StormResistanceConfig, StormbornConfig};
use crate::error::{ErrorSeverity, EssenceError};

/// Level-scaled passive formulas.
#[derive(Clone, Debug, PartialEq)]
pub struct PassiveEffects {
    resistance: StormResistanceConfig,
    reflexes: LightningReflexesConfig,
    stormborn: StormbornConfig,
}

impl PassiveEffects {
    pub fn from_config(config: &AbilityConfig) -> Self {
        Self {
            resistance: config.storm_resistance.clone(),
            reflexes: config.lightning_reflexes.clone(),
            stormborn: config.stormborn.clone(),
        }
    }

    /// Damage reduction in percent.
    pub fn resistance_percent(&self, level: u32) -> f64 {
        let c = &self.resistance;
        let above = level.saturating_sub(c.unlock_level) as f64;
        (c.base_reduction_percent + above * c.per_level_bonus).min(c.max_reduction_percent)
    }

    pub fn reflexes_amplifier(&self, level: u32) -> u32 {
        let c = &self.reflexes;
        let above = level.saturating_sub(c.unlock_level);
        c.base_speed_amplifier
            .saturating_add((above / 10).saturating_mul(c.per_10_levels_bonus))
            .min(c.max_speed_amplifier)
    }

    /// One exposure interval plus 500 ms.
    pub fn reflexes_duration(&self, exposure_interval: Duration) -> Duration {
        exposure_interval + Duration::from_millis(500)
    }

    pub fn stormborn_regen(&self, level: u32) -> f64 {
        let c = &self.stormborn;
        let above = level.saturating_sub(c.unlock_level) / 5;
        (c.base_regen + above as f64 * c.per_5_levels_bonus).min(c.max_regen)
    }

    /// Applies storm resistance to a damage amount.
    pub fn reduce_damage(&self, level: u32, damage: f64) -> f64 {
        damage * (1.0 - self.resistance_percent(level) / 100.0)
    }
}

impl Default for PassiveEffects {
    fn default() -> Self {
        Self::from_config(&AbilityConfig::default())
    }
}

/// Result of toggling a passive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassiveToggle {
    pub ability: AbilityId,
    pub enabled: bool,
    /// Drain rate per second after the toggle.
    pub drain_rate: f64,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PassiveError {
    #[error("{} is not a passive ability", .ability.label())]
    NotPassive { ability: AbilityId },

    #[error("{} unlocks at level {required} (current level {current})", .ability.label())]
    Locked {
        ability: AbilityId,
        required: u32,
        current: u32,
    },
}

impl EssenceError for PassiveError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotPassive { .. } => "PASSIVE_NOT_PASSIVE",
            Self::Locked { .. } => "PASSIVE_LOCKED",
        }
    }
}
