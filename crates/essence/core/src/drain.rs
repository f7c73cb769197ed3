//! Periodic passive drain.
use std::time::Duration;

use crate::ability::AbilityId;
use crate::config::DrainConfig;

/// Drain formula resolved from configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrainPolicy {
    base_per_second: f64,
    scaling_enabled: bool,
    per_ten_levels: f64,
    multi_passive_multiplier: f64,
    interval: Duration,
}

impl DrainPolicy {
    pub fn from_config(config: &DrainConfig) -> Self {
        Self {
            base_per_second: config.base_drain_per_second,
            scaling_enabled: config.sel_scaling_enabled,
            per_ten_levels: config.per_ten_levels,
            multi_passive_multiplier: config.multi_passive_multiplier,
            interval: config.interval(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Essence per second for `active_count` passives at `level`.
    pub fn rate_per_second(&self, level: u32, active_count: usize) -> f64 {
        if active_count == 0 {
            return 0.0;
        }
        let level_multiplier = if self.scaling_enabled {
            1.0 + (level as f64 / 10.0) * self.per_ten_levels
        } else {
            1.0
        };
        let exponent = i32::try_from(active_count - 1).unwrap_or(i32::MAX);
        let stacking = self.multi_passive_multiplier.powi(exponent);

        self.base_per_second * active_count as f64 * level_multiplier * stacking
    }

    /// Amount charged on one tick.
    pub fn amount_per_tick(&self, level: u32, active_count: usize) -> f64 {
        self.rate_per_second(level, active_count) * self.interval.as_secs_f64()
    }
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self::from_config(&DrainConfig::default())
    }
}

/// Result of one drain tick for one player.
#[derive(Clone, Debug, PartialEq)]
pub enum DrainOutcome {
    Charged { amount: f64 },
    /// Funds were short, so every passive was disabled.
    Disabled {
        disabled: Vec<AbilityId>,
        rate: f64,
        balance: f64,
    },
}
