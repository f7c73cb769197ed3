//! Engine configuration loader.

use std::path::Path;

use anyhow::ensure;
use essence_core::{AbilityId, EssenceConfig};

use crate::loaders::{LoadResult, read_file};

/// Loader for [`EssenceConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<EssenceConfig> {
        let content = read_file(path)?;
        let config = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "Loaded essence config");
        Ok(config)
    }

    /// Parse and validate TOML text. Missing tables and fields keep their defaults.
    pub fn parse(content: &str) -> LoadResult<EssenceConfig> {
        let config: EssenceConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(config: &EssenceConfig) -> LoadResult<()> {
        let abilities = &config.abilities;
        let costs = [
            (AbilityId::StormSense, abilities.storm_sense.cost),
            (AbilityId::EyeOfTheStorm, abilities.eye_of_the_storm.cost),
            (AbilityId::Stormcaller, abilities.stormcaller.cost),
            (AbilityId::Stormclear, abilities.stormclear.cost),
            (AbilityId::Stormrider, abilities.stormrider.cost),
        ];
        for (ability, cost) in costs {
            ensure!(
                cost.is_finite() && cost >= 0.0,
                "{ability} cost must be a non-negative number, got {cost}"
            );
        }

        let drain = &config.drain;
        ensure!(drain.interval_ms > 0, "drain.interval_ms must be positive");
        ensure!(
            drain.base_drain_per_second.is_finite() && drain.base_drain_per_second >= 0.0,
            "drain.base_drain_per_second must be a non-negative number"
        );
        ensure!(
            drain.multi_passive_multiplier.is_finite() && drain.multi_passive_multiplier >= 1.0,
            "drain.multi_passive_multiplier must be at least 1.0"
        );

        let sense = &abilities.storm_sense;
        ensure!(
            sense.cue_interval_ms > 0,
            "abilities.storm_sense.cue_interval_ms must be positive"
        );
        ensure!(
            sense.cue_spacing.is_finite() && sense.cue_spacing > 0.0,
            "abilities.storm_sense.cue_spacing must be positive"
        );
        ensure!(
            config.infusion.display_refresh_secs > 0,
            "infusion.display_refresh_secs must be positive"
        );
        Ok(())
    }
}
