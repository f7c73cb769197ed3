//! Tunable parameters for the essence economy.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it overrides.
use std::time::Duration;

/// Root configuration consumed by [`crate::EssenceEngine`].
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EssenceConfig {
    pub abilities: AbilityConfig,
    pub drain: DrainConfig,
    pub infusion: InfusionConfig,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilityConfig {
    pub storm_resistance: StormResistanceConfig,
    pub lightning_reflexes: LightningReflexesConfig,
    pub stormborn: StormbornConfig,
    pub storm_sense: StormSenseConfig,
    pub eye_of_the_storm: EyeOfTheStormConfig,
    pub stormcaller: StormcallerConfig,
    pub stormclear: StormclearConfig,
    pub stormrider: StormriderConfig,
}

/// Damage reduction while exposed. Percent values, capped at `max_reduction_percent`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StormResistanceConfig {
    pub unlock_level: u32,
    pub base_reduction_percent: f64,
    pub per_level_bonus: f64,
    pub max_reduction_percent: f64,
}

impl Default for StormResistanceConfig {
    fn default() -> Self {
        Self {
            unlock_level: 10,
            base_reduction_percent: 5.0,
            per_level_bonus: 0.5,
            max_reduction_percent: 50.0,
        }
    }
}

/// Speed effect applied on every exposure tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LightningReflexesConfig {
    pub unlock_level: u32,
    pub base_speed_amplifier: u32,
    pub per_10_levels_bonus: u32,
    pub max_speed_amplifier: u32,
}

impl Default for LightningReflexesConfig {
    fn default() -> Self {
        Self {
            unlock_level: 15,
            base_speed_amplifier: 0,
            per_10_levels_bonus: 1,
            max_speed_amplifier: 3,
        }
    }
}

/// Health regained on every exposure tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StormbornConfig {
    pub unlock_level: u32,
    pub base_regen: f64,
    pub per_5_levels_bonus: f64,
    pub max_regen: f64,
}

impl Default for StormbornConfig {
    fn default() -> Self {
        Self {
            unlock_level: 20,
            base_regen: 0.5,
            per_5_levels_bonus: 0.1,
            max_regen: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StormSenseConfig {
    pub unlock_level: u32,
    pub cost: f64,
    pub cooldown_secs: u64,
    /// Total lifetime of the guiding cue task.
    pub cue_duration_ms: u64,
    /// Delay between two cue emissions.
    pub cue_interval_ms: u64,
    /// Distance between consecutive cue points.
    pub cue_spacing: f64,
}

impl StormSenseConfig {
    pub fn cue_duration(&self) -> Duration {
        Duration::from_millis(self.cue_duration_ms)
    }

    pub fn cue_interval(&self) -> Duration {
        Duration::from_millis(self.cue_interval_ms.max(1))
    }
}

impl Default for StormSenseConfig {
    fn default() -> Self {
        Self {
            unlock_level: 10,
            cost: 1.0,
            cooldown_secs: 60,
            cue_duration_ms: 30_000,
            cue_interval_ms: 250,
            cue_spacing: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EyeOfTheStormConfig {
    pub unlock_level: u32,
    pub cost: f64,
    pub cooldown_secs: u64,
    pub immunity_secs: u64,
}

impl EyeOfTheStormConfig {
    pub fn immunity(&self) -> Duration {
        Duration::from_secs(self.immunity_secs)
    }
}

impl Default for EyeOfTheStormConfig {
    fn default() -> Self {
        Self {
            unlock_level: 25,
            cost: 500.0,
            cooldown_secs: 1200,
            immunity_secs: 600,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StormcallerConfig {
    pub unlock_level: u32,
    pub cost: f64,
    pub cooldown_secs: u64,
    pub strike_damage: f64,
    pub max_range: f64,
}

impl Default for StormcallerConfig {
    fn default() -> Self {
        Self {
            unlock_level: 40,
            cost: 100.0,
            cooldown_secs: 30,
            strike_damage: 5.0,
            max_range: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StormclearConfig {
    pub unlock_level: u32,
    pub cost: f64,
    pub cooldown_secs: u64,
    /// Scan radius around the player; hazards are pushed three times this far.
    pub push_distance: f64,
    pub speed_multiplier: f64,
    pub speed_duration_secs: u64,
}

impl StormclearConfig {
    pub fn speed_duration(&self) -> Duration {
        Duration::from_secs(self.speed_duration_secs)
    }
}

impl Default for StormclearConfig {
    fn default() -> Self {
        Self {
            unlock_level: 50,
            cost: 2000.0,
            cooldown_secs: 3600,
            push_distance: 1000.0,
            speed_multiplier: 3.0,
            speed_duration_secs: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StormriderConfig {
    pub unlock_level: u32,
    pub cost: f64,
    pub cooldown_secs: u64,
}

impl Default for StormriderConfig {
    fn default() -> Self {
        Self {
            unlock_level: 100,
            cost: 0.0,
            cooldown_secs: 0,
        }
    }
}

/// Passive drain settings.
///
/// `rate = base * count * (1 + level/10 * per_ten_levels) * multiplier^(count-1)`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DrainConfig {
    pub base_drain_per_second: f64,
    pub sel_scaling_enabled: bool,
    pub per_ten_levels: f64,
    pub multi_passive_multiplier: f64,
    pub interval_ms: u64,
}

impl DrainConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            base_drain_per_second: 1.0,
            sel_scaling_enabled: true,
            per_ten_levels: 0.1,
            multi_passive_multiplier: 1.5,
            interval_ms: 1_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InfusionConfig {
    /// How often pedestal progress displays are pushed to the host.
    pub display_refresh_secs: u64,
}

impl InfusionConfig {
    pub fn display_refresh(&self) -> Duration {
        Duration::from_secs(self.display_refresh_secs.max(1))
    }
}

impl Default for InfusionConfig {
    fn default() -> Self {
        Self {
            display_refresh_secs: 10,
        }
    }
}
