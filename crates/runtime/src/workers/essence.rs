//! Essence worker that owns the authoritative [`EssenceEngine`].
//!
//! Receives commands from [`crate::RuntimeHandle`], runs the drain and
//! pedestal display loops, and publishes events on the [`EventBus`]. Every
//! engine mutation happens on this task, so records are never shared.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use essence_core::{
    AbilityActivation, AbilityId, BalanceStore, BlockPos, Clock, DrainOutcome, EssenceAward,
    EssenceEngine, EssenceError, Env, HazardRegistry, Item, MovementDirective, MovementSample,
    PassiveToggle, PedestalInfo, PlayerId, PlayerRecord, PlayerStatus, Retrieval, WorldHost,
};

use crate::api::Result;
use crate::events::{AbilityEvent, EconomyEvent, EventBus, PedestalEvent, PersistenceEvent};
use crate::providers::TokioCueScheduler;
use crate::repository::PlayerRepository;

/// Commands that can be sent to the essence worker
pub enum Command {
    /// Loads the player's record (if needed) and marks them online.
    Connect {
        player: PlayerId,
        reply: oneshot::Sender<PlayerStatus>,
    },
    /// Flushes and evicts the player. Replies whether a record was loaded.
    Disconnect {
        player: PlayerId,
        reply: oneshot::Sender<bool>,
    },
    AwardEssence {
        player: PlayerId,
        amount: f64,
        reply: oneshot::Sender<Result<EssenceAward>>,
    },
    DamageCheck {
        player: PlayerId,
        damage: f64,
        reply: oneshot::Sender<f64>,
    },
    /// Replies whether the fall damage must be cancelled.
    FallDamage {
        player: PlayerId,
        reply: oneshot::Sender<bool>,
    },
    ExposureTick {
        players: Vec<PlayerId>,
        reply: oneshot::Sender<()>,
    },
    Movement {
        player: PlayerId,
        sample: MovementSample,
        reply: oneshot::Sender<Option<MovementDirective>>,
    },
    TogglePassive {
        player: PlayerId,
        ability: AbilityId,
        reply: oneshot::Sender<Result<PassiveToggle>>,
    },
    /// Replies whether the passive was enabled.
    DisablePassive {
        player: PlayerId,
        ability: AbilityId,
        reply: oneshot::Sender<bool>,
    },
    SelectActive {
        player: PlayerId,
        ability: AbilityId,
        reply: oneshot::Sender<Result<()>>,
    },
    CycleActive {
        player: PlayerId,
        reply: oneshot::Sender<Result<AbilityId>>,
    },
    /// `ability: None` uses the selected ability.
    UseAbility {
        player: PlayerId,
        ability: Option<AbilityId>,
        reply: oneshot::Sender<Result<AbilityActivation>>,
    },
    HasImmunity {
        player: PlayerId,
        reply: oneshot::Sender<bool>,
    },
    TraversalEnabled {
        player: PlayerId,
        reply: oneshot::Sender<bool>,
    },
    DrainRate {
        player: PlayerId,
        reply: oneshot::Sender<f64>,
    },
    Status {
        player: PlayerId,
        reply: oneshot::Sender<PlayerStatus>,
    },
    PlacePedestal {
        owner: PlayerId,
        block: BlockPos,
        reply: oneshot::Sender<Result<PedestalInfo>>,
    },
    AddPedestalItem {
        owner: PlayerId,
        block: BlockPos,
        item: Item,
        reply: oneshot::Sender<Result<usize>>,
    },
    RetrievePedestalItems {
        owner: PlayerId,
        block: BlockPos,
        reply: oneshot::Sender<Result<Retrieval>>,
    },
    RemovePedestal {
        block: BlockPos,
        reply: oneshot::Sender<bool>,
    },
    PedestalInfo {
        block: BlockPos,
        reply: oneshot::Sender<Option<PedestalInfo>>,
    },
    /// Replies whether the break must be cancelled.
    BlockBreak {
        block: BlockPos,
        reply: oneshot::Sender<bool>,
    },
    /// Runs one drain tick immediately, outside the periodic loop.
    RunDrainTick { reply: oneshot::Sender<()> },
}

/// External systems the engine reaches through [`Env`].
pub struct Collaborators {
    pub balance: Arc<dyn BalanceStore>,
    pub hazards: Arc<dyn HazardRegistry>,
    pub world: Arc<dyn WorldHost>,
    pub clock: Arc<dyn Clock>,
    pub cues: TokioCueScheduler,
}

impl Collaborators {
    fn env(&self) -> Env<'_> {
        Env::new(&*self.balance, &*self.hazards, &*self.world, &self.cues)
    }
}

/// Periods of the two background loops.
#[derive(Debug, Clone, Copy)]
pub struct WorkerIntervals {
    pub drain: Duration,
    pub display_refresh: Duration,
}

/// Background task that processes essence commands.
pub struct EssenceWorker {
    engine: EssenceEngine,
    host: Collaborators,
    repository: Arc<dyn PlayerRepository>,
    command_rx: mpsc::Receiver<Command>,
    shutdown_rx: oneshot::Receiver<()>,
    event_bus: EventBus,
    intervals: WorkerIntervals,
}

impl EssenceWorker {
    pub fn new(
        engine: EssenceEngine,
        host: Collaborators,
        repository: Arc<dyn PlayerRepository>,
        command_rx: mpsc::Receiver<Command>,
        shutdown_rx: oneshot::Receiver<()>,
        event_bus: EventBus,
        intervals: WorkerIntervals,
    ) -> Self {
        Self {
            engine,
            host,
            repository,
            command_rx,
            shutdown_rx,
            event_bus,
            intervals,
        }
    }

    /// Main worker loop.
    ///
    /// Ends on the shutdown signal or when every command sender is gone, then
    /// flushes all loaded records.
    pub async fn run(mut self) {
        let mut drain = time::interval_at(
            time::Instant::now() + self.intervals.drain,
            self.intervals.drain,
        );
        drain.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut display = time::interval_at(
            time::Instant::now() + self.intervals.display_refresh,
            self.intervals.display_refresh,
        );
        display.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = &mut self.shutdown_rx => break,
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = drain.tick() => self.drain_tick(),
                _ = display.tick() => self.refresh_displays(),
            }
        }

        self.flush_all();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { player, reply } => {
                self.ensure_loaded(player);
                self.engine.connect(player);
                info!(target: "runtime::worker", %player, "Player connected");
                let status = self.status(player);
                Self::send(reply, status);
            }
            Command::Disconnect { player, reply } => {
                let flushed = self.engine.disconnect(player);
                if let Some(record) = &flushed {
                    self.save(player, record);
                    info!(target: "runtime::worker", %player, "Player disconnected");
                }
                Self::send(reply, flushed.is_some());
            }
            Command::AwardEssence {
                player,
                amount,
                reply,
            } => {
                let result = self.award_essence(player, amount);
                Self::send(reply, result);
            }
            Command::DamageCheck {
                player,
                damage,
                reply,
            } => {
                self.ensure_loaded(player);
                let env = self.host.env();
                let now = self.host.clock.now();
                let adjusted = self.engine.on_damage_check(&env, now, player, damage);
                Self::send(reply, adjusted);
            }
            Command::FallDamage { player, reply } => {
                Self::send(reply, self.engine.on_fall_damage(player));
            }
            Command::ExposureTick { players, reply } => {
                for player in &players {
                    self.ensure_loaded(*player);
                }
                let env = self.host.env();
                self.engine.on_exposure_tick(&env, &players);
                Self::send(reply, ());
            }
            Command::Movement {
                player,
                sample,
                reply,
            } => {
                let env = self.host.env();
                Self::send(reply, self.engine.on_movement(&env, player, &sample));
            }
            Command::TogglePassive {
                player,
                ability,
                reply,
            } => {
                let result = self.toggle_passive(player, ability);
                Self::send(reply, result);
            }
            Command::DisablePassive {
                player,
                ability,
                reply,
            } => {
                let disabled = self.disable_passive(player, ability);
                Self::send(reply, disabled);
            }
            Command::SelectActive {
                player,
                ability,
                reply,
            } => {
                self.ensure_loaded(player);
                let result = self.engine.select_active(player, ability).map_err(Into::into);
                Self::send(reply, result);
            }
            Command::CycleActive { player, reply } => {
                self.ensure_loaded(player);
                let result = self.engine.cycle_active(player).map_err(Into::into);
                Self::send(reply, result);
            }
            Command::UseAbility {
                player,
                ability,
                reply,
            } => {
                let result = self.use_ability(player, ability);
                Self::send(reply, result);
            }
            Command::HasImmunity { player, reply } => {
                let now = self.host.clock.now();
                Self::send(reply, self.engine.has_immunity(now, player));
            }
            Command::TraversalEnabled { player, reply } => {
                Self::send(reply, self.engine.is_traversal_enabled(player));
            }
            Command::DrainRate { player, reply } => {
                self.ensure_loaded(player);
                Self::send(reply, self.engine.drain_rate(player));
            }
            Command::Status { player, reply } => {
                self.ensure_loaded(player);
                let status = self.status(player);
                Self::send(reply, status);
            }
            Command::PlacePedestal {
                owner,
                block,
                reply,
            } => {
                let result = self.place_pedestal(owner, block);
                Self::send(reply, result);
            }
            Command::AddPedestalItem {
                owner,
                block,
                item,
                reply,
            } => {
                let result = self.engine.add_pedestal_item(owner, block, item);
                if let Ok(item_count) = result {
                    self.event_bus.publish(PedestalEvent::ItemAdded {
                        block,
                        owner,
                        item_count,
                    });
                }
                Self::send(reply, result.map_err(Into::into));
            }
            Command::RetrievePedestalItems {
                owner,
                block,
                reply,
            } => {
                let result = self.retrieve_pedestal_items(owner, block);
                Self::send(reply, result);
            }
            Command::RemovePedestal { block, reply } => {
                let env = self.host.env();
                let removed = self.engine.remove_pedestal(&env, block);
                if removed {
                    info!(target: "runtime::pedestal", %block, "Pedestal removed");
                    self.event_bus.publish(PedestalEvent::Removed { block });
                }
                Self::send(reply, removed);
            }
            Command::PedestalInfo { block, reply } => {
                let now = self.host.clock.now();
                Self::send(reply, self.engine.pedestal_info(now, &block));
            }
            Command::BlockBreak { block, reply } => {
                let protected = self.engine.is_pedestal_protected(&block);
                if protected {
                    debug!(target: "runtime::pedestal", %block, "Cancelled break of pedestal block");
                }
                Self::send(reply, protected);
            }
            Command::RunDrainTick { reply } => {
                self.drain_tick();
                Self::send(reply, ());
            }
        }
    }

    fn send<T>(reply: oneshot::Sender<T>, value: T) {
        if reply.send(value).is_err() {
            debug!("essence worker reply channel closed (caller dropped)");
        }
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Installs the player's stored record on first reference.
    ///
    /// A failed load is reported and the player continues with a default record.
    fn ensure_loaded(&mut self, player: PlayerId) {
        if self.engine.is_loaded(player) {
            return;
        }
        let record = match self.repository.load(player) {
            Ok(Some(persisted)) => {
                let (record, skipped) = PlayerRecord::from_persisted(player, &persisted);
                for name in skipped {
                    warn!(target: "runtime::repository", %player, passive = %name, "Skipping unknown passive");
                }
                record
            }
            Ok(None) => PlayerRecord::new(player),
            Err(e) => {
                error!(target: "runtime::repository", %player, error = %e, "Failed to load player record");
                self.event_bus.publish(PersistenceEvent::LoadFailed {
                    player,
                    error: e.to_string(),
                });
                PlayerRecord::new(player)
            }
        };
        self.engine.insert_record(record);
    }

    fn persist(&self, player: PlayerId) {
        if let Some(record) = self.engine.persisted(player) {
            self.save(player, &record);
        }
    }

    fn save(&self, player: PlayerId, record: &essence_core::PersistedRecord) {
        match self.repository.save(player, record) {
            Ok(()) => self.event_bus.publish(PersistenceEvent::Saved { player }),
            Err(e) => {
                error!(target: "runtime::repository", %player, error = %e, "Failed to save player record");
                self.event_bus.publish(PersistenceEvent::SaveFailed {
                    player,
                    error: e.to_string(),
                });
            }
        }
    }

    fn flush_all(&mut self) {
        let flushed = self.engine.shutdown();
        for (player, record) in &flushed {
            self.save(*player, record);
        }
        info!(target: "runtime::worker", count = flushed.len(), "Flushed player records");
    }

    fn status(&mut self, player: PlayerId) -> PlayerStatus {
        let env = self.host.env();
        let now = self.host.clock.now();
        self.engine.status(&env, now, player)
    }

    // ========================================================================
    // Economy
    // ========================================================================

    fn award_essence(&mut self, player: PlayerId, amount: f64) -> Result<EssenceAward> {
        self.ensure_loaded(player);
        let env = self.host.env();
        let award = self.engine.award_essence(&env, player, amount)?;
        if award.leveled_up() {
            info!(target: "runtime::economy", %player, level = award.level_after, "Essence level up");
        }
        self.event_bus.publish(EconomyEvent::EssenceAwarded {
            player,
            amount,
            accrued: award.accrued,
            level: award.level_after,
            leveled_up: award.leveled_up(),
        });
        Ok(award)
    }

    fn toggle_passive(&mut self, player: PlayerId, ability: AbilityId) -> Result<PassiveToggle> {
        self.ensure_loaded(player);
        let toggle = self.engine.toggle_passive(player, ability)?;
        debug!(target: "runtime::economy", %player, %ability, enabled = toggle.enabled, "Passive toggled");
        self.event_bus.publish(EconomyEvent::PassiveToggled {
            player,
            ability,
            enabled: toggle.enabled,
            drain_rate: toggle.drain_rate,
        });
        self.persist(player);
        Ok(toggle)
    }

    fn disable_passive(&mut self, player: PlayerId, ability: AbilityId) -> bool {
        self.ensure_loaded(player);
        if !self.engine.disable_passive(player, ability) {
            return false;
        }
        self.event_bus.publish(EconomyEvent::PassiveToggled {
            player,
            ability,
            enabled: false,
            drain_rate: self.engine.drain_rate(player),
        });
        self.persist(player);
        true
    }

    fn drain_tick(&mut self) {
        let env = self.host.env();
        for (player, outcome) in self.engine.drain_tick(&env) {
            match outcome {
                DrainOutcome::Charged { amount } => {
                    self.event_bus
                        .publish(EconomyEvent::Drained { player, amount });
                }
                DrainOutcome::Disabled {
                    disabled,
                    rate,
                    balance,
                } => {
                    info!(
                        target: "runtime::economy",
                        %player,
                        rate,
                        balance,
                        "Insufficient essence, passives disabled"
                    );
                    self.event_bus.publish(EconomyEvent::PassivesDisabled {
                        player,
                        disabled,
                        rate,
                        balance,
                    });
                    self.persist(player);
                }
            }
        }
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    fn use_ability(
        &mut self,
        player: PlayerId,
        ability: Option<AbilityId>,
    ) -> Result<AbilityActivation> {
        self.ensure_loaded(player);
        let env = self.host.env();
        let now = self.host.clock.now();
        let result = match ability {
            Some(ability) => self.engine.use_ability(&env, now, player, ability),
            None => self.engine.use_selected(&env, now, player),
        };

        match &result {
            Ok(activation) => {
                debug!(
                    target: "runtime::ability",
                    %player,
                    ability = %activation.ability,
                    cost = activation.cost,
                    "Ability used"
                );
                self.event_bus.publish(AbilityEvent::Activated {
                    player,
                    activation: activation.clone(),
                });
            }
            Err(error) => {
                if error.severity().is_player_facing() {
                    debug!(target: "runtime::ability", %player, code = error.error_code(), "Ability rejected");
                } else {
                    warn!(target: "runtime::ability", %player, error = %error, "Ability failed");
                }
                self.event_bus.publish(AbilityEvent::Rejected {
                    player,
                    ability,
                    error: error.clone(),
                });
            }
        }
        result.map_err(Into::into)
    }

    // ========================================================================
    // Pedestals
    // ========================================================================

    fn place_pedestal(&mut self, owner: PlayerId, block: BlockPos) -> Result<PedestalInfo> {
        self.ensure_loaded(owner);
        let env = self.host.env();
        let now = self.host.clock.now();
        let info = self.engine.place_pedestal(&env, now, owner, block)?;
        info!(
            target: "runtime::pedestal",
            %block,
            %owner,
            level = info.owner_level,
            "Pedestal placed"
        );
        self.event_bus
            .publish(PedestalEvent::Placed { info: info.clone() });
        Ok(info)
    }

    fn retrieve_pedestal_items(&mut self, owner: PlayerId, block: BlockPos) -> Result<Retrieval> {
        let env = self.host.env();
        let now = self.host.clock.now();
        let retrieval = self
            .engine
            .retrieve_pedestal_items(&env, now, owner, block)?;
        self.event_bus.publish(PedestalEvent::Retrieved {
            block,
            owner,
            tier: retrieval.tier,
            item_count: retrieval.items.len(),
        });
        Ok(retrieval)
    }

    fn refresh_displays(&mut self) {
        let env = self.host.env();
        let now = self.host.clock.now();
        let count = self.engine.refresh_pedestal_displays(&env, now);
        if count > 0 {
            tracing::trace!(target: "runtime::pedestal", count, "Refreshed pedestal displays");
        }
    }
}
