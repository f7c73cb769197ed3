//! Engine owning every player record and pedestal.
//!
//! The host delivers events and timer ticks; the engine mutates records,
//! talks to the balance store, and emits [`EffectCommand`]s. Persistence is
//! left to the caller: methods that change persisted fields say so.
use std::collections::{BTreeSet, HashMap};

use crate::ability::{AbilityCatalog, AbilityId};
use crate::active::{self, AbilityActivation, AbilityError};
use crate::config::EssenceConfig;
use crate::drain::{DrainOutcome, DrainPolicy};
use crate::effect::{EffectCommand, MovementDirective, MovementSample};
use crate::env::{BalanceError, Env};
use crate::passive::{PassiveEffects, PassiveError, PassiveToggle};
use crate::pedestal::{
    Item, PedestalError, PedestalInfo, PedestalRegistry, Retrieval, average_protection,
};
use crate::record::{PersistedRecord, PlayerRecord};
use crate::timer::Timestamp;
use crate::types::{BlockPos, PlayerId};

/// Result of a resource grant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EssenceAward {
    pub amount: f64,
    /// False while passives are enabled: the balance grows, the lifetime total does not.
    pub accrued: bool,
    pub level_before: u32,
    pub level_after: u32,
}

impl EssenceAward {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Snapshot for status queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStatus {
    pub player: PlayerId,
    pub level: u32,
    pub lifetime_total: f64,
    pub balance: f64,
    pub active_passives: Vec<AbilityId>,
    pub selected_active: Option<AbilityId>,
    pub drain_rate: f64,
    pub immune: bool,
    pub traversal_enabled: bool,
}

pub struct EssenceEngine {
    config: EssenceConfig,
    catalog: AbilityCatalog,
    drain: DrainPolicy,
    passives: PassiveEffects,
    players: HashMap<PlayerId, PlayerRecord>,
    connected: BTreeSet<PlayerId>,
    pedestals: PedestalRegistry,
}

impl EssenceEngine {
    pub fn new(config: EssenceConfig) -> Self {
        Self {
            catalog: AbilityCatalog::from_config(&config),
            drain: DrainPolicy::from_config(&config.drain),
            passives: PassiveEffects::from_config(&config.abilities),
            config,
            players: HashMap::new(),
            connected: BTreeSet::new(),
            pedestals: PedestalRegistry::new(),
        }
    }

    pub fn config(&self) -> &EssenceConfig {
        &self.config
    }

    pub fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    pub fn drain_policy(&self) -> &DrainPolicy {
        &self.drain
    }

    // ========================================================================
    // Records
    // ========================================================================

    pub fn is_loaded(&self, player: PlayerId) -> bool {
        self.players.contains_key(&player)
    }

    /// Installs a record loaded by the caller, replacing any in-memory one.
    pub fn insert_record(&mut self, record: PlayerRecord) {
        if let Some(mut previous) = self.players.insert(record.id(), record) {
            previous.clear_transient();
        }
    }

    pub fn record(&self, player: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&player)
    }

    /// Record for `player`, created with defaults on first reference.
    pub fn record_mut(&mut self, player: PlayerId) -> &mut PlayerRecord {
        self.players
            .entry(player)
            .or_insert_with(|| PlayerRecord::new(player))
    }

    pub fn persisted(&self, player: PlayerId) -> Option<PersistedRecord> {
        self.players.get(&player).map(PlayerRecord::persisted)
    }

    pub fn connect(&mut self, player: PlayerId) {
        self.record_mut(player);
        self.connected.insert(player);
    }

    pub fn is_connected(&self, player: PlayerId) -> bool {
        self.connected.contains(&player)
    }

    pub fn connected_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.connected.iter().copied()
    }

    /// Evicts a player, returning the persisted form to flush.
    ///
    /// The cue task is cancelled and transient state dropped.
    pub fn disconnect(&mut self, player: PlayerId) -> Option<PersistedRecord> {
        self.connected.remove(&player);
        let mut record = self.players.remove(&player)?;
        record.clear_transient();
        Some(record.persisted())
    }

    /// Cancels every cue task and clears transient state, returning every
    /// record to flush. Records stay in memory.
    pub fn shutdown(&mut self) -> Vec<(PlayerId, PersistedRecord)> {
        let mut flushed: Vec<_> = self
            .players
            .values_mut()
            .map(|record| {
                record.clear_transient();
                (record.id(), record.persisted())
            })
            .collect();
        flushed.sort_by_key(|(player, _)| *player);
        self.connected.clear();
        flushed
    }

    // ========================================================================
    // Economy
    // ========================================================================

    /// Deposits a grant into the balance store, then accrues it to the
    /// lifetime total unless a passive is enabled.
    ///
    /// Nothing is accrued when the deposit fails.
    pub fn award_essence(
        &mut self,
        env: &Env<'_>,
        player: PlayerId,
        amount: f64,
    ) -> Result<EssenceAward, BalanceError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(BalanceError::InvalidAmount(amount));
        }
        env.balance.deposit(player, amount)?;

        let record = self.record_mut(player);
        let level_before = record.level();
        let accrued = record.accrue(amount);
        Ok(EssenceAward {
            amount,
            accrued,
            level_before,
            level_after: record.level(),
        })
    }

    pub fn drain_rate(&self, player: PlayerId) -> f64 {
        self.players.get(&player).map_or(0.0, |record| {
            self.drain
                .rate_per_second(record.level(), record.active_passives().len())
        })
    }

    /// Charges every connected player with enabled passives.
    ///
    /// Players whose balance cannot cover the tick lose all passives; their
    /// records must be persisted by the caller.
    pub fn drain_tick(&mut self, env: &Env<'_>) -> Vec<(PlayerId, DrainOutcome)> {
        let mut outcomes = Vec::new();
        for player in &self.connected {
            let Some(record) = self.players.get_mut(player) else {
                continue;
            };
            let count = record.active_passives().len();
            if count == 0 {
                continue;
            }

            let level = record.level();
            let amount = self.drain.amount_per_tick(level, count);
            let balance = env.balance.balance(*player);
            let charged = balance >= amount && env.balance.withdraw(*player, amount).is_ok();

            let outcome = if charged {
                DrainOutcome::Charged { amount }
            } else {
                let rate = self.drain.rate_per_second(level, count);
                let disabled = record.clear_passives();
                env.world.dispatch(EffectCommand::Notify {
                    player: *player,
                    message: format!(
                        "Not enough storm essence ({rate:.1}/s). All passive abilities disabled."
                    ),
                });
                DrainOutcome::Disabled {
                    disabled,
                    rate,
                    balance,
                }
            };
            outcomes.push((*player, outcome));
        }
        outcomes
    }

    // ========================================================================
    // Passives
    // ========================================================================

    /// Flips a passive. The record must be persisted afterwards.
    pub fn toggle_passive(
        &mut self,
        player: PlayerId,
        ability: AbilityId,
    ) -> Result<PassiveToggle, PassiveError> {
        if !ability.is_passive() {
            return Err(PassiveError::NotPassive { ability });
        }
        let required = self.catalog.get(ability).unlock_level;
        let record = self.record_mut(player);
        let current = record.level();
        if current < required {
            return Err(PassiveError::Locked {
                ability,
                required,
                current,
            });
        }

        let enabled = !record.is_passive_enabled(ability);
        record.set_passive(ability, enabled);
        Ok(PassiveToggle {
            ability,
            enabled,
            drain_rate: self.drain_rate(player),
        })
    }

    /// Disables a passive without unlock checks. Returns whether it was enabled.
    pub fn disable_passive(&mut self, player: PlayerId, ability: AbilityId) -> bool {
        let record = self.record_mut(player);
        let was_enabled = record.is_passive_enabled(ability);
        record.set_passive(ability, false);
        was_enabled
    }

    /// Adjusts incoming hazard damage.
    ///
    /// Immunity cancels it. Otherwise storm resistance applies first, then
    /// the average protection of infused armor.
    pub fn on_damage_check(
        &mut self,
        env: &Env<'_>,
        now: Timestamp,
        player: PlayerId,
        damage: f64,
    ) -> f64 {
        let record = self
            .players
            .entry(player)
            .or_insert_with(|| PlayerRecord::new(player));
        if record.has_immunity(now) {
            return 0.0;
        }

        let mut damage = damage;
        if record.is_passive_enabled(AbilityId::StormResistance) {
            damage = self.passives.reduce_damage(record.level(), damage);
        }

        let protection = average_protection(&env.world.equipped_infusion_tiers(player));
        if protection > 0 {
            damage -= damage * protection as f64 / 100.0;
        }
        damage.max(0.0)
    }

    /// Applies exposure-tick passives to every exposed player.
    pub fn on_exposure_tick(&mut self, env: &Env<'_>, exposed: &[PlayerId]) {
        let interval = self.drain.interval();
        for player in exposed {
            let Some(record) = self.players.get(player) else {
                continue;
            };
            let level = record.level();
            if record.is_passive_enabled(AbilityId::LightningReflexes) {
                env.world.dispatch(EffectCommand::Speed {
                    player: *player,
                    amplifier: self.passives.reflexes_amplifier(level),
                    duration: self.passives.reflexes_duration(interval),
                });
            }
            if record.is_passive_enabled(AbilityId::Stormborn) {
                env.world.dispatch(EffectCommand::Heal {
                    player: *player,
                    amount: self.passives.stormborn_regen(level),
                });
            }
        }
    }

    /// Fall damage is cancelled while traversal mode is on.
    pub fn on_fall_damage(&self, player: PlayerId) -> bool {
        self.is_traversal_enabled(player)
    }

    /// Flight inside hazards, glide while falling outside them.
    pub fn on_movement(
        &self,
        env: &Env<'_>,
        player: PlayerId,
        sample: &MovementSample,
    ) -> Option<MovementDirective> {
        if !self.is_traversal_enabled(player) {
            return None;
        }
        let directive = if env.hazards.contains(&sample.location) {
            MovementDirective {
                allow_flight: true,
                flying: None,
                gliding: false,
            }
        } else if sample.on_ground {
            MovementDirective::RELEASED
        } else {
            MovementDirective {
                allow_flight: false,
                flying: sample.flying.then_some(false),
                gliding: sample.falling,
            }
        };
        env.world.dispatch(EffectCommand::Movement { player, directive });
        Some(directive)
    }

    // ========================================================================
    // Actives
    // ========================================================================

    pub fn use_ability(
        &mut self,
        env: &Env<'_>,
        now: Timestamp,
        player: PlayerId,
        ability: AbilityId,
    ) -> Result<AbilityActivation, AbilityError> {
        let record = self
            .players
            .entry(player)
            .or_insert_with(|| PlayerRecord::new(player));
        active::use_ability(
            record,
            &self.catalog,
            &self.config.abilities,
            env,
            now,
            ability,
        )
    }

    /// Uses the selected ability, selecting the first unlocked one if none is.
    pub fn use_selected(
        &mut self,
        env: &Env<'_>,
        now: Timestamp,
        player: PlayerId,
    ) -> Result<AbilityActivation, AbilityError> {
        let ability = match self.record_mut(player).selected_active() {
            Some(ability) => ability,
            None => self.cycle_active(player)?,
        };
        self.use_ability(env, now, player, ability)
    }

    pub fn select_active(
        &mut self,
        player: PlayerId,
        ability: AbilityId,
    ) -> Result<(), AbilityError> {
        if !ability.is_active() {
            return Err(AbilityError::NotActive { ability });
        }
        self.record_mut(player).select(ability);
        Ok(())
    }

    /// Advances the selection to the next unlocked active ability, wrapping.
    pub fn cycle_active(&mut self, player: PlayerId) -> Result<AbilityId, AbilityError> {
        let record = self
            .players
            .entry(player)
            .or_insert_with(|| PlayerRecord::new(player));
        let unlocked: Vec<_> = self.catalog.unlocked_actives(record.level()).collect();
        let Some(first) = unlocked.first().copied() else {
            return Err(AbilityError::NothingUnlocked);
        };

        let next = record
            .selected_active()
            .and_then(|current| unlocked.iter().position(|a| *a == current))
            .and_then(|index| unlocked.get(index + 1).copied())
            .unwrap_or(first);
        record.select(next);
        Ok(next)
    }

    pub fn has_immunity(&mut self, now: Timestamp, player: PlayerId) -> bool {
        self.players
            .get_mut(&player)
            .is_some_and(|record| record.has_immunity(now))
    }

    pub fn is_traversal_enabled(&self, player: PlayerId) -> bool {
        self.players
            .get(&player)
            .is_some_and(PlayerRecord::is_traversal_enabled)
    }

    pub fn status(&mut self, env: &Env<'_>, now: Timestamp, player: PlayerId) -> PlayerStatus {
        let drain_rate = self.drain_rate(player);
        let record = self.record_mut(player);
        PlayerStatus {
            player,
            level: record.level(),
            lifetime_total: record.lifetime_total(),
            balance: env.balance.balance(player),
            active_passives: record.active_passives().iter().copied().collect(),
            selected_active: record.selected_active(),
            drain_rate,
            immune: record.has_immunity(now),
            traversal_enabled: record.is_traversal_enabled(),
        }
    }

    // ========================================================================
    // Pedestals
    // ========================================================================

    pub fn pedestals(&self) -> &PedestalRegistry {
        &self.pedestals
    }

    /// Places a pedestal, snapshotting the owner's current level.
    pub fn place_pedestal(
        &mut self,
        env: &Env<'_>,
        now: Timestamp,
        owner: PlayerId,
        block: BlockPos,
    ) -> Result<PedestalInfo, PedestalError> {
        if self.pedestals.contains(&block) {
            return Err(PedestalError::AlreadyExists { block });
        }
        if !env.world.is_block_empty(&block) {
            return Err(PedestalError::LocationOccupied { block });
        }
        let level = self.record_mut(owner).level();
        let info = self.pedestals.place(owner, level, block, now)?.info(now);
        env.world.dispatch(EffectCommand::PlacePedestal { block });
        Ok(info)
    }

    pub fn add_pedestal_item(
        &mut self,
        owner: PlayerId,
        block: BlockPos,
        item: Item,
    ) -> Result<usize, PedestalError> {
        self.pedestals.add_item(owner, block, item)
    }

    /// Hands infused items back to the owner and clears the pedestal.
    pub fn retrieve_pedestal_items(
        &mut self,
        env: &Env<'_>,
        now: Timestamp,
        owner: PlayerId,
        block: BlockPos,
    ) -> Result<Retrieval, PedestalError> {
        let retrieval = self.pedestals.retrieve(owner, block, now)?;
        env.world.dispatch(EffectCommand::ClearPedestal { block });
        env.world.dispatch(EffectCommand::ReturnItems {
            player: owner,
            items: retrieval.items.clone(),
        });
        Ok(retrieval)
    }

    /// Explicit removal. Stored items are returned to the owner uninfused.
    pub fn remove_pedestal(&mut self, env: &Env<'_>, block: BlockPos) -> bool {
        let Some(pedestal) = self.pedestals.remove(&block) else {
            return false;
        };
        env.world.dispatch(EffectCommand::ClearPedestal { block });
        if !pedestal.items.is_empty() {
            env.world.dispatch(EffectCommand::ReturnItems {
                player: pedestal.owner,
                items: pedestal.items,
            });
        }
        true
    }

    pub fn pedestal_info(&self, now: Timestamp, block: &BlockPos) -> Option<PedestalInfo> {
        self.pedestals.get(block).map(|pedestal| pedestal.info(now))
    }

    /// Whether a block break must be cancelled.
    pub fn is_pedestal_protected(&self, block: &BlockPos) -> bool {
        self.pedestals.contains(block)
    }

    /// Pushes a progress display for every pedestal. Returns how many were sent.
    pub fn refresh_pedestal_displays(&self, env: &Env<'_>, now: Timestamp) -> usize {
        for pedestal in self.pedestals.iter() {
            let info = pedestal.info(now);
            env.world.dispatch(EffectCommand::PedestalDisplay {
                block: info.block,
                progress_percent: info.progress_percent(),
                tier: info.tier,
            });
        }
        self.pedestals.len()
    }
}

impl Default for EssenceEngine {
    fn default() -> Self {
        Self::new(EssenceConfig::default())
    }
}
