//! Ability catalog.
//!
//! # Design
//!
//! - **AbilityId**: every ability variant, tagged passive or active
//! - **Passive** abilities are toggled on and paid for by the periodic drain
//! - **Active** abilities are triggered, charge a flat cost, and start a cooldown
//! - **AbilityCatalog**: unlock levels and terms resolved from configuration

use std::time::Duration;

use strum::IntoEnumIterator;

use crate::config::EssenceConfig;

// ============================================================================
// Ability identifiers
// ============================================================================

/// Every ability in the catalog, in catalog order.
///
/// The `SCREAMING_SNAKE_CASE` names are the persisted and parsed form.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AbilityId {
    StormResistance,
    LightningReflexes,
    Stormborn,
    StormSense,
    EyeOfTheStorm,
    Stormcaller,
    Stormclear,
    Stormrider,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbilityKind {
    Passive,
    Active,
}

/// Effect executed by an active ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActiveEffect {
    /// Guide the player away from the nearest hazard with a repeating cue.
    LocateHazard,
    /// Time-limited immunity to hazard damage.
    TemporaryImmunity,
    /// Single lightning strike at the aimed block.
    DirectedStrike,
    /// Push every nearby hazard away from the player.
    AreaDisruption,
    /// Flip the traversal (flight inside hazards) flag.
    ToggleTraversal,
}

impl AbilityId {
    pub const fn kind(&self) -> AbilityKind {
        match self {
            Self::StormResistance | Self::LightningReflexes | Self::Stormborn => {
                AbilityKind::Passive
            }
            _ => AbilityKind::Active,
        }
    }

    pub const fn is_passive(&self) -> bool {
        matches!(self.kind(), AbilityKind::Passive)
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.kind(), AbilityKind::Active)
    }

    pub const fn effect(&self) -> Option<ActiveEffect> {
        match self {
            Self::StormSense => Some(ActiveEffect::LocateHazard),
            Self::EyeOfTheStorm => Some(ActiveEffect::TemporaryImmunity),
            Self::Stormcaller => Some(ActiveEffect::DirectedStrike),
            Self::Stormclear => Some(ActiveEffect::AreaDisruption),
            Self::Stormrider => Some(ActiveEffect::ToggleTraversal),
            Self::StormResistance | Self::LightningReflexes | Self::Stormborn => None,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::StormResistance => "Storm Resistance",
            Self::LightningReflexes => "Lightning Reflexes",
            Self::Stormborn => "Stormborn",
            Self::StormSense => "Storm Sense",
            Self::EyeOfTheStorm => "Eye of the Storm",
            Self::Stormcaller => "Stormcaller",
            Self::Stormclear => "Stormclear",
            Self::Stormrider => "Stormrider",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::StormResistance => "Reduces storm damage taken",
            Self::LightningReflexes => "Grants speed while exposed to storms",
            Self::Stormborn => "Regenerates health while exposed to storms",
            Self::StormSense => "Points the way out of the nearest storm",
            Self::EyeOfTheStorm => "Temporary immunity to storm damage",
            Self::Stormcaller => "Calls lightning down on the targeted block",
            Self::Stormclear => "Pushes nearby storms away",
            Self::Stormrider => "Fly inside storms and glide outside them",
        }
    }

    /// Active abilities in catalog order.
    pub fn actives() -> impl Iterator<Item = AbilityId> {
        Self::iter().filter(AbilityId::is_active)
    }

    pub fn passives() -> impl Iterator<Item = AbilityId> {
        Self::iter().filter(AbilityId::is_passive)
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// Cost and cooldown of an active ability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveTerms {
    pub cost: f64,
    pub cooldown: Duration,
}

/// Immutable catalog entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub unlock_level: u32,
    /// `Some` exactly for active abilities.
    pub terms: Option<ActiveTerms>,
}

impl AbilityDefinition {
    pub const fn passive(id: AbilityId, unlock_level: u32) -> Self {
        Self {
            id,
            unlock_level,
            terms: None,
        }
    }

    pub const fn active(id: AbilityId, unlock_level: u32, cost: f64, cooldown: Duration) -> Self {
        Self {
            id,
            unlock_level,
            terms: Some(ActiveTerms { cost, cooldown }),
        }
    }

    pub fn cost(&self) -> f64 {
        self.terms.map_or(0.0, |t| t.cost)
    }

    pub fn cooldown(&self) -> Duration {
        self.terms.map_or(Duration::ZERO, |t| t.cooldown)
    }
}

/// Catalog of every ability, read-only after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilityCatalog {
    // Indexed by `AbilityId as usize`.
    definitions: Vec<AbilityDefinition>,
}

impl AbilityCatalog {
    pub fn from_config(config: &EssenceConfig) -> Self {
        let a = &config.abilities;
        let secs = Duration::from_secs;
        let definitions = AbilityId::iter()
            .map(|id| match id {
                AbilityId::StormResistance => {
                    AbilityDefinition::passive(id, a.storm_resistance.unlock_level)
                }
                AbilityId::LightningReflexes => {
                    AbilityDefinition::passive(id, a.lightning_reflexes.unlock_level)
                }
                AbilityId::Stormborn => AbilityDefinition::passive(id, a.stormborn.unlock_level),
                AbilityId::StormSense => AbilityDefinition::active(
                    id,
                    a.storm_sense.unlock_level,
                    a.storm_sense.cost,
                    secs(a.storm_sense.cooldown_secs),
                ),
                AbilityId::EyeOfTheStorm => AbilityDefinition::active(
                    id,
                    a.eye_of_the_storm.unlock_level,
                    a.eye_of_the_storm.cost,
                    secs(a.eye_of_the_storm.cooldown_secs),
                ),
                AbilityId::Stormcaller => AbilityDefinition::active(
                    id,
                    a.stormcaller.unlock_level,
                    a.stormcaller.cost,
                    secs(a.stormcaller.cooldown_secs),
                ),
                AbilityId::Stormclear => AbilityDefinition::active(
                    id,
                    a.stormclear.unlock_level,
                    a.stormclear.cost,
                    secs(a.stormclear.cooldown_secs),
                ),
                AbilityId::Stormrider => AbilityDefinition::active(
                    id,
                    a.stormrider.unlock_level,
                    a.stormrider.cost,
                    secs(a.stormrider.cooldown_secs),
                ),
            })
            .collect();

        Self { definitions }
    }

    pub fn get(&self, id: AbilityId) -> &AbilityDefinition {
        &self.definitions[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.definitions.iter()
    }

    /// Active abilities unlocked at `level`, in catalog order.
    pub fn unlocked_actives(&self, level: u32) -> impl Iterator<Item = AbilityId> + '_ {
        self.definitions
            .iter()
            .filter(move |def| def.id.is_active() && level >= def.unlock_level)
            .map(|def| def.id)
    }
}

impl Default for AbilityCatalog {
    fn default() -> Self {
        Self::from_config(&EssenceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_default_unlock_table() {
        let catalog = AbilityCatalog::default();
        let unlocks: Vec<_> = AbilityId::iter()
            .map(|id| catalog.get(id).unlock_level)
            .collect();
        assert_eq!(unlocks, vec![10, 15, 20, 10, 25, 40, 50, 100]);
    }

    #[test]
    fn only_actives_carry_terms() {
        let catalog = AbilityCatalog::default();
        for def in catalog.iter() {
            assert_eq!(def.terms.is_some(), def.id.is_active(), "{:?}", def.id);
            assert_eq!(def.id.effect().is_some(), def.id.is_active());
        }
        assert_eq!(catalog.get(AbilityId::Stormclear).cost(), 2000.0);
        assert_eq!(
            catalog.get(AbilityId::EyeOfTheStorm).cooldown(),
            Duration::from_secs(1200)
        );
    }

    #[test]
    fn names_parse_in_persisted_form() {
        assert_eq!(
            "EYE_OF_THE_STORM".parse::<AbilityId>().unwrap(),
            AbilityId::EyeOfTheStorm
        );
        assert_eq!(AbilityId::StormResistance.to_string(), "STORM_RESISTANCE");
        assert!("THUNDER".parse::<AbilityId>().is_err());
    }

    #[test]
    fn unlocked_actives_follow_catalog_order() {
        let catalog = AbilityCatalog::default();
        let at_40: Vec<_> = catalog.unlocked_actives(40).collect();
        assert_eq!(
            at_40,
            vec![
                AbilityId::StormSense,
                AbilityId::EyeOfTheStorm,
                AbilityId::Stormcaller
            ]
        );
        assert_eq!(catalog.unlocked_actives(9).count(), 0);
    }
}
