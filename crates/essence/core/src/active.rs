//! Active ability dispatch.
//!
//! Validation runs in a fixed order: kind, unlock, cooldown, effect
//! pre-flight, funds. Nothing is charged unless every check passes, and the
//! cooldown starts only after the effect has run.
use std::time::Duration;

use crate::ability::{AbilityCatalog, AbilityId, ActiveEffect};
use crate::config::AbilityConfig;
use crate::effect::EffectCommand;
use crate::env::{CuePlan, Env, Hazard};
use crate::error::{ErrorSeverity, EssenceError};
use crate::record::PlayerRecord;
use crate::timer::{Timestamp, format_remaining};
use crate::types::{HazardId, Location};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AbilityError {
    #[error("{} is not an active ability", .ability.label())]
    NotActive { ability: AbilityId },

    #[error("{} unlocks at level {required} (current level {current})", .ability.label())]
    Locked {
        ability: AbilityId,
        required: u32,
        current: u32,
    },

    #[error("{} is on cooldown ({} remaining)", .ability.label(), format_remaining(.remaining))]
    OnCooldown {
        ability: AbilityId,
        remaining: Duration,
    },

    #[error("{} costs {cost:.1} essence but the balance is {balance:.1}", .ability.label())]
    InsufficientEssence {
        ability: AbilityId,
        cost: f64,
        balance: f64,
    },

    #[error("no storms nearby")]
    NoHazardNearby,

    #[error("no target block within {range} blocks")]
    NoTarget { range: f64 },

    #[error("player location is unknown")]
    LocationUnavailable,

    #[error("no active ability is unlocked yet")]
    NothingUnlocked,
}

impl EssenceError for AbilityError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotActive { .. } | Self::Locked { .. } | Self::NothingUnlocked => {
                ErrorSeverity::Validation
            }
            Self::OnCooldown { .. }
            | Self::InsufficientEssence { .. }
            | Self::NoHazardNearby
            | Self::NoTarget { .. } => ErrorSeverity::Recoverable,
            Self::LocationUnavailable => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotActive { .. } => "ABILITY_NOT_ACTIVE",
            Self::Locked { .. } => "ABILITY_LOCKED",
            Self::OnCooldown { .. } => "ABILITY_ON_COOLDOWN",
            Self::InsufficientEssence { .. } => "ABILITY_INSUFFICIENT_ESSENCE",
            Self::NoHazardNearby => "ABILITY_NO_HAZARD_NEARBY",
            Self::NoTarget { .. } => "ABILITY_NO_TARGET",
            Self::LocationUnavailable => "ABILITY_LOCATION_UNAVAILABLE",
            Self::NothingUnlocked => "ABILITY_NOTHING_UNLOCKED",
        }
    }
}

/// What an ability did once it ran.
#[derive(Clone, Debug, PartialEq)]
pub enum AbilityOutcome {
    HazardTracked {
        hazard: HazardId,
        distance_to_edge: f64,
    },
    ImmunityGranted { until: Timestamp },
    StrikeCalled { target: Location },
    HazardsDispersed { count: usize },
    TraversalToggled { enabled: bool },
}

/// A successful ability use.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilityActivation {
    pub ability: AbilityId,
    pub cost: f64,
    pub cooldown_until: Timestamp,
    pub outcome: AbilityOutcome,
}

/// Effect inputs resolved before anything is charged.
enum Prepared {
    Locate { hazard: Hazard, location: Location },
    Immunity,
    Strike { target: Location },
    Disrupt { origin: Location },
    Toggle,
}

pub(crate) fn use_ability(
    record: &mut PlayerRecord,
    catalog: &AbilityCatalog,
    config: &AbilityConfig,
    env: &Env<'_>,
    now: Timestamp,
    ability: AbilityId,
) -> Result<AbilityActivation, AbilityError> {
    let definition = catalog.get(ability);
    let (Some(effect), Some(terms)) = (ability.effect(), definition.terms) else {
        return Err(AbilityError::NotActive { ability });
    };

    let level = record.level();
    if level < definition.unlock_level {
        return Err(AbilityError::Locked {
            ability,
            required: definition.unlock_level,
            current: level,
        });
    }

    if let Some(remaining) = record.cooldowns_mut().remaining(ability, now) {
        return Err(AbilityError::OnCooldown { ability, remaining });
    }

    let prepared = prepare(record, config, env, effect)?;

    let player = record.id();
    let balance = env.balance.balance(player);
    if terms.cost > 0.0 {
        if balance < terms.cost {
            return Err(AbilityError::InsufficientEssence {
                ability,
                cost: terms.cost,
                balance,
            });
        }
        env.balance
            .withdraw(player, terms.cost)
            .map_err(|_| AbilityError::InsufficientEssence {
                ability,
                cost: terms.cost,
                balance,
            })?;
    }

    let outcome = execute(record, config, env, now, prepared);
    let cooldown_until = record.cooldowns_mut().start(ability, now, terms.cooldown);

    Ok(AbilityActivation {
        ability,
        cost: terms.cost,
        cooldown_until,
        outcome,
    })
}

fn prepare(
    record: &PlayerRecord,
    config: &AbilityConfig,
    env: &Env<'_>,
    effect: ActiveEffect,
) -> Result<Prepared, AbilityError> {
    let player = record.id();
    match effect {
        ActiveEffect::LocateHazard => {
            let location = env
                .world
                .location(player)
                .ok_or(AbilityError::LocationUnavailable)?;
            let hazard = env
                .hazards
                .nearest(&location)
                .ok_or(AbilityError::NoHazardNearby)?;
            Ok(Prepared::Locate { hazard, location })
        }
        ActiveEffect::TemporaryImmunity => Ok(Prepared::Immunity),
        ActiveEffect::DirectedStrike => {
            let range = config.stormcaller.max_range;
            let target = env
                .world
                .aim_target(player, range)
                .ok_or(AbilityError::NoTarget { range })?;
            Ok(Prepared::Strike { target })
        }
        ActiveEffect::AreaDisruption => {
            let origin = env
                .world
                .location(player)
                .ok_or(AbilityError::LocationUnavailable)?;
            Ok(Prepared::Disrupt { origin })
        }
        ActiveEffect::ToggleTraversal => Ok(Prepared::Toggle),
    }
}

fn execute(
    record: &mut PlayerRecord,
    config: &AbilityConfig,
    env: &Env<'_>,
    now: Timestamp,
    prepared: Prepared,
) -> AbilityOutcome {
    let player = record.id();
    match prepared {
        Prepared::Locate { hazard, location } => {
            let sense = &config.storm_sense;
            let plan = CuePlan {
                interval: sense.cue_interval(),
                duration: sense.cue_duration(),
                spacing: sense.cue_spacing,
            };
            record.replace_cue_task(env.cues.start(player, plan));
            AbilityOutcome::HazardTracked {
                hazard: hazard.id,
                distance_to_edge: hazard.distance_to_edge(&location.position),
            }
        }
        Prepared::Immunity => {
            let until = now.saturating_add(config.eye_of_the_storm.immunity());
            record.grant_immunity(until);
            AbilityOutcome::ImmunityGranted { until }
        }
        Prepared::Strike { target } => {
            env.world.dispatch(EffectCommand::Strike {
                location: target,
                damage: config.stormcaller.strike_damage,
            });
            AbilityOutcome::StrikeCalled { target }
        }
        Prepared::Disrupt { origin } => {
            let count = disperse(&config.stormclear, env, now, &origin);
            AbilityOutcome::HazardsDispersed { count }
        }
        Prepared::Toggle => {
            let enabled = record.toggle_traversal();
            if !enabled {
                env.world.dispatch(EffectCommand::Movement {
                    player,
                    directive: crate::effect::MovementDirective::RELEASED,
                });
            }
            AbilityOutcome::TraversalToggled { enabled }
        }
    }
}

/// Pushes every hazard within `push_distance` to three times that distance.
fn disperse(
    config: &crate::config::StormclearConfig,
    env: &Env<'_>,
    now: Timestamp,
    origin: &Location,
) -> usize {
    let until = now.saturating_add(config.speed_duration());
    let mut count = 0;
    for hazard in env.hazards.active_hazards() {
        if hazard.zone != origin.zone
            || hazard.center.distance(&origin.position) > config.push_distance
        {
            continue;
        }
        let direction = origin
            .position
            .offset_to(&hazard.center)
            .normalized()
            .unwrap_or(crate::types::Position::new(1.0, 0.0, 0.0));
        let target = hazard
            .center
            .translated(&direction.scaled(config.push_distance * 3.0));
        env.hazards.retarget(hazard.id, target);
        env.hazards
            .boost_speed(hazard.id, config.speed_multiplier, until);
        count += 1;
    }
    count
}
